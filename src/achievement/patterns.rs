//! Static tables for local achievement synthesis.

use std::sync::LazyLock;

use regex::Regex;

/// Component categories in tie-break order.
///
/// Each pattern matches keyword prefixes at a word boundary; it is run over
/// lower-cased paths and diff text.
#[allow(clippy::unwrap_used)] // Compile-time constant regex pattern
pub(crate) static COMPONENTS: LazyLock<Vec<(&'static str, Regex)>> = LazyLock::new(|| {
    [
        ("Auth", r"\b(?:auth|login|logout|oauth|jwt|session|credential)"),
        ("API", r"\b(?:api|endpoint|route|graphql|rest|grpc)"),
        ("Database", r"\b(?:database|db|sql|migration|schema|query|queries)"),
        ("UI", r"\b(?:ui|component|widget|layout|view|modal|button)"),
        ("Frontend", r"\b(?:frontend|client|react|vue|angular|svelte|browser)"),
        ("Backend", r"\b(?:backend|server|service|handler|controller|worker)"),
        ("Testing", r"\b(?:test|spec|mock|fixture|assert)"),
        ("Security", r"\b(?:security|crypto|encrypt|permission|sanitiz|vulnerab)"),
        ("Performance", r"\b(?:perf|cache|caching|optimi[sz]|benchmark|latency)"),
        ("Config", r"\b(?:config|settings|env|\.ya?ml|\.toml)"),
        ("Infrastructure", r"\b(?:docker|deploy|kubernetes|k8s|terraform|helm|ansible|infra)"),
    ]
    .into_iter()
    .map(|(label, pattern)| (label, Regex::new(pattern).unwrap()))
    .collect()
});

/// Action keywords and their gerunds, scanned in order.
#[allow(clippy::unwrap_used)] // Compile-time constant regex pattern
pub(crate) static ACTIONS: LazyLock<Vec<(Regex, &'static str)>> = LazyLock::new(|| {
    [
        (r"\boptimi[sz]", "optimizing"),
        (r"\bimplement", "implementing"),
        (r"\bfix", "fixing"),
        (r"\benhanc", "enhancing"),
        (r"\brefactor", "refactoring"),
        (r"\btest", "testing"),
        (r"\bsecur", "securing"),
    ]
    .into_iter()
    .map(|(pattern, gerund)| (Regex::new(pattern).unwrap(), gerund))
    .collect()
});

/// Achievement template families, in match order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TemplateKind {
    Performance,
    Security,
    Feature,
    Bugfix,
    Testing,
}

/// Template keyword sets matched against the lower-cased commit text.
#[allow(clippy::unwrap_used)] // Compile-time constant regex pattern
pub(crate) static TEMPLATES: LazyLock<Vec<(TemplateKind, Regex)>> = LazyLock::new(|| {
    [
        (
            TemplateKind::Performance,
            r"\b(?:perf|performance|optimi[sz]|speed|faster|latency|cach|throughput)",
        ),
        (
            TemplateKind::Security,
            r"\b(?:secur|vulnerab|cve|xss|csrf|injection|encrypt|sanitiz|harden)",
        ),
        (
            TemplateKind::Feature,
            r"\b(?:add|feat|feature|implement|introduc|new|support|creat)",
        ),
        (
            TemplateKind::Bugfix,
            r"\b(?:fix|bug|issue|resolv|patch|error|crash|regression)",
        ),
        (
            TemplateKind::Testing,
            r"\b(?:test|coverage|spec)",
        ),
    ]
    .into_iter()
    .map(|(kind, pattern)| (kind, Regex::new(pattern).unwrap()))
    .collect()
});
