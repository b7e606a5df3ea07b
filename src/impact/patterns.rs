//! Static pattern tables used by the impact classifier.

use std::sync::LazyLock;

use regex::RegexSet;

use super::FileCategory;

/// Paths whose modification makes a commit high impact: dependency
/// manifests, lockfiles, build and container files, migrations and schemas,
/// auth/security code, API surfaces, CI workflows and environment config.
///
/// Matched against the lower-cased path.
#[allow(clippy::unwrap_used)] // Compile-time constant regex pattern
pub(crate) static CRITICAL_PATHS: LazyLock<RegexSet> = LazyLock::new(|| {
    RegexSet::new([
        r"(^|/)package(-lock)?\.json$",
        r"(^|/)(yarn\.lock|pnpm-lock\.yaml|cargo\.(toml|lock)|go\.(mod|sum)|gemfile(\.lock)?|composer\.(json|lock)|poetry\.lock|pyproject\.toml|pipfile(\.lock)?|pom\.xml|build\.gradle(\.kts)?)$",
        r"(^|/)requirements[^/]*\.txt$",
        r"(^|/)dockerfile[^/]*$",
        r"(^|/)docker-compose[^/]*\.ya?ml$",
        r"(^|/)makefile$",
        r"(^|/)migrations?/",
        r"(^|/)schema\.(sql|prisma|rb|graphql)$",
        r"(^|/)(auth|authentication|security)/",
        r"(^|/)api/",
        r"(^|/)\.github/workflows/",
        r"(^|/)\.gitlab-ci\.ya?ml$",
        r"(^|/)\.circleci/",
        r"(^|/)jenkinsfile$",
        r"(^|/)\.env(\.[^/]+)?$",
        r"(^|/)config/",
        r"(^|/)settings\.py$",
    ])
    .unwrap()
});

/// Security, urgency and stability terms. Scanned in order; only the first
/// hit is reported.
pub(crate) const CRITICAL_KEYWORDS: &[&str] = &[
    "security",
    "vulnerability",
    "exploit",
    "cve-",
    "authentication",
    "authorization",
    "password",
    "encryption",
    "injection",
    "xss",
    "csrf",
    "hotfix",
    "urgent",
    "emergency",
    "critical",
    "crash",
    "data loss",
    "memory leak",
    "deadlock",
    "race condition",
];

/// Performance terms. Scanned independently of [`CRITICAL_KEYWORDS`].
pub(crate) const PERFORMANCE_KEYWORDS: &[&str] = &[
    "performance",
    "optimize",
    "optimization",
    "optimise",
    "latency",
    "throughput",
    "cache",
    "caching",
    "memoize",
    "benchmark",
    "speedup",
    "speed up",
    "faster",
    "parallel",
    "lazy load",
];

/// Test directories and file-name conventions, anchored to path segments.
/// Checked before extensions against the lower-cased path.
#[allow(clippy::unwrap_used)] // Compile-time constant regex pattern
pub(crate) static TEST_PATHS: LazyLock<RegexSet> = LazyLock::new(|| {
    RegexSet::new([
        r"(^|/)(tests?|__tests__|spec)/",
        r"(^|/)test_[^/]*$",
        r"[^/]_test\.[^/]+$",
        r"[^/]\.(test|spec)\.[^/]+$",
    ])
    .unwrap()
});

/// File names (lower-cased) that are configuration regardless of extension.
pub(crate) const CONFIG_FILE_NAMES: &[&str] = &[
    "dockerfile",
    "makefile",
    ".env",
    ".gitignore",
    ".editorconfig",
];

/// Extension to category table.
pub(crate) const EXTENSION_CATEGORIES: &[(&str, FileCategory)] = &[
    ("py", FileCategory::Python),
    ("js", FileCategory::JavaScript),
    ("jsx", FileCategory::JavaScript),
    ("mjs", FileCategory::JavaScript),
    ("cjs", FileCategory::JavaScript),
    ("ts", FileCategory::TypeScript),
    ("tsx", FileCategory::TypeScript),
    ("rs", FileCategory::Rust),
    ("go", FileCategory::Go),
    ("java", FileCategory::Jvm),
    ("kt", FileCategory::Jvm),
    ("kts", FileCategory::Jvm),
    ("scala", FileCategory::Jvm),
    ("rb", FileCategory::Ruby),
    ("php", FileCategory::Php),
    ("c", FileCategory::Native),
    ("h", FileCategory::Native),
    ("cc", FileCategory::Native),
    ("cpp", FileCategory::Native),
    ("hpp", FileCategory::Native),
    ("cs", FileCategory::CSharp),
    ("swift", FileCategory::Swift),
    ("json", FileCategory::Config),
    ("yaml", FileCategory::Config),
    ("yml", FileCategory::Config),
    ("toml", FileCategory::Config),
    ("ini", FileCategory::Config),
    ("cfg", FileCategory::Config),
    ("conf", FileCategory::Config),
    ("xml", FileCategory::Config),
    ("lock", FileCategory::Config),
    ("css", FileCategory::Style),
    ("scss", FileCategory::Style),
    ("sass", FileCategory::Style),
    ("less", FileCategory::Style),
    ("html", FileCategory::Markup),
    ("htm", FileCategory::Markup),
    ("vue", FileCategory::Markup),
    ("svelte", FileCategory::Markup),
    ("hbs", FileCategory::Markup),
    ("md", FileCategory::Docs),
    ("rst", FileCategory::Docs),
    ("txt", FileCategory::Docs),
    ("adoc", FileCategory::Docs),
    ("sql", FileCategory::Sql),
    ("sh", FileCategory::Shell),
    ("bash", FileCategory::Shell),
    ("zsh", FileCategory::Shell),
    ("ps1", FileCategory::Shell),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn critical_paths_match_manifests_and_workflows() {
        for path in [
            "package.json",
            "web/package-lock.json",
            "cargo.lock",
            "dockerfile",
            "deploy/docker-compose.prod.yml",
            "db/migrations/001_init.sql",
            "src/auth/session.rs",
            "src/api/users.py",
            ".github/workflows/ci.yml",
            ".env.production",
            "config/database.yml",
        ] {
            assert!(CRITICAL_PATHS.is_match(path), "{path} should be critical");
        }
    }

    #[test]
    fn critical_paths_ignore_ordinary_sources() {
        for path in ["src/main.rs", "readme.md", "src/rapid/mod.rs", "docs/authors.md"] {
            assert!(!CRITICAL_PATHS.is_match(path), "{path} should not be critical");
        }
    }
}
