//! Reference resolution policy and per-commit cache.

use std::collections::HashMap;
use std::time::Duration;

use tracing::{debug, warn};

use super::extract::{extract_reference_number, is_message_helpful};
use super::platform::{GitHubClient, GitLabClient, ReferencePlatform, RepositoryPlatform};
use super::ReferenceInfo;
use crate::git::CommitRecord;

/// Settings controlling reference resolution.
#[derive(Debug, Clone, Default)]
pub struct ResolverConfig {
    /// Turns reference handling off entirely.
    pub disabled: bool,
    /// Forbids network lookups; references stay number-only.
    pub offline: bool,
    /// GitHub API token.
    pub github_token: Option<String>,
    /// GitHub API base URL override (GitHub Enterprise).
    pub github_api_url: Option<String>,
    /// GitLab API token.
    pub gitlab_token: Option<String>,
    /// GitLab instance URL (self-hosted).
    pub gitlab_url: Option<String>,
}

/// Decides when a reference should stand in for the commit message and
/// resolves it through the hosting platform when credentials allow.
pub struct ReferenceResolver {
    enabled: bool,
    platform: Option<Box<dyn ReferencePlatform>>,
    cache: HashMap<String, Option<ReferenceInfo>>,
}

impl ReferenceResolver {
    /// Creates a resolver with an explicit platform client.
    pub fn new(enabled: bool, platform: Option<Box<dyn ReferencePlatform>>) -> Self {
        Self {
            enabled,
            platform,
            cache: HashMap::new(),
        }
    }

    /// Creates a resolver for the repository behind `remote_url`.
    ///
    /// A platform client is only built when the matching token is present
    /// and offline mode is off. Client construction failures leave the
    /// resolver number-only.
    pub fn from_config(config: &ResolverConfig, remote_url: Option<&str>, timeout: Duration) -> Self {
        if config.disabled {
            return Self::new(false, None);
        }
        if config.offline {
            debug!("Offline mode: references will not be fetched");
            return Self::new(true, None);
        }

        let detected = RepositoryPlatform::detect(remote_url, config.gitlab_url.as_deref());
        debug!(platform = ?detected, "Detected repository platform");

        let platform: Option<Box<dyn ReferencePlatform>> = match detected {
            RepositoryPlatform::GitHub { owner, repo } => {
                config.github_token.clone().and_then(|token| {
                    GitHubClient::new(owner, repo, token, config.github_api_url.clone(), timeout)
                        .map_err(|e| warn!("GitHub client unavailable: {e}"))
                        .ok()
                        .map(|c| Box::new(c) as Box<dyn ReferencePlatform>)
                })
            }
            RepositoryPlatform::GitLab {
                base_url,
                project_path,
            } => config.gitlab_token.clone().and_then(|token| {
                GitLabClient::new(base_url, project_path, token, timeout)
                    .map_err(|e| warn!("GitLab client unavailable: {e}"))
                    .ok()
                    .map(|c| Box::new(c) as Box<dyn ReferencePlatform>)
            }),
            RepositoryPlatform::Unknown => None,
        };

        Self::new(true, platform)
    }

    /// Returns true when resolution is enabled.
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Returns true when a reference should replace the commit message:
    /// resolution is enabled, the subject is unhelpful, and the message
    /// carries a reference number.
    pub fn should_use_reference(&self, commit: &CommitRecord) -> bool {
        self.enabled
            && !is_message_helpful(&commit.subject)
            && extract_reference_number(&commit.full_text()).is_some()
    }

    /// Returns the commit's reference, fetching it at most once per commit.
    ///
    /// Never fails: fetch errors degrade to a number-only reference.
    pub async fn get_reference_info(&mut self, commit: &CommitRecord) -> Option<ReferenceInfo> {
        if !self.enabled {
            return None;
        }

        if let Some(cached) = self.cache.get(&commit.hash) {
            debug!(commit = commit.short_hash(), "Reference cache hit");
            return cached.clone();
        }

        let resolved = self.resolve(commit).await;
        self.cache.insert(commit.hash.clone(), resolved.clone());
        resolved
    }

    async fn resolve(&self, commit: &CommitRecord) -> Option<ReferenceInfo> {
        let number = extract_reference_number(&commit.full_text())?;

        let Some(platform) = &self.platform else {
            debug!(number, "No reference platform configured");
            return Some(ReferenceInfo::unresolved(number));
        };

        match platform.fetch_reference(number).await {
            Ok(info) => Some(info),
            Err(e) => {
                warn!(
                    platform = platform.name(),
                    number,
                    "Reference lookup failed, using number only: {e}"
                );
                Some(ReferenceInfo::unresolved(number))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reference::ReferenceError;
    use chrono::DateTime;
    use std::future::Future;
    use std::pin::Pin;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct FakePlatform {
        title: Option<&'static str>,
        calls: Arc<AtomicUsize>,
    }

    impl ReferencePlatform for FakePlatform {
        fn fetch_reference<'a>(
            &'a self,
            number: u64,
        ) -> Pin<Box<dyn Future<Output = Result<ReferenceInfo, ReferenceError>> + Send + 'a>>
        {
            Box::pin(async move {
                self.calls.fetch_add(1, Ordering::SeqCst);
                match self.title {
                    Some(title) => Ok(ReferenceInfo {
                        number,
                        title: Some(title.to_string()),
                        description: Some("details".to_string()),
                        url: Some(format!("https://example.com/pull/{number}")),
                    }),
                    None => Err(ReferenceError::Network("connection refused".to_string())),
                }
            })
        }

        fn name(&self) -> &'static str {
            "Fake"
        }
    }

    fn fake(title: Option<&'static str>) -> (Box<dyn ReferencePlatform>, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        (
            Box::new(FakePlatform {
                title,
                calls: calls.clone(),
            }),
            calls,
        )
    }

    fn commit(subject: &str) -> CommitRecord {
        CommitRecord::new(
            "1111111111111111111111111111111111111111",
            "dev",
            DateTime::parse_from_rfc3339("2024-01-01T00:00:00+00:00").unwrap(),
            subject,
        )
    }

    #[tokio::test]
    async fn disabled_resolver_returns_none() {
        let (platform, calls) = fake(Some("title"));
        let mut resolver = ReferenceResolver::new(false, Some(platform));
        assert!(resolver.get_reference_info(&commit("fix #123")).await.is_none());
        assert!(!resolver.should_use_reference(&commit("fix #123")));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn no_number_returns_none() {
        let (platform, calls) = fake(Some("title"));
        let mut resolver = ReferenceResolver::new(true, Some(platform));
        assert!(resolver.get_reference_info(&commit("wip")).await.is_none());
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn successful_fetch_returns_full_info() {
        let (platform, _) = fake(Some("Optimize database queries reducing response time by 40%"));
        let mut resolver = ReferenceResolver::new(true, Some(platform));
        let info = resolver
            .get_reference_info(&commit("fix #123"))
            .await
            .unwrap();
        assert_eq!(info.number, 123);
        assert_eq!(
            info.usable_title(),
            Some("Optimize database queries reducing response time by 40%")
        );
        assert!(info.url.is_some());
    }

    #[tokio::test]
    async fn failed_fetch_degrades_to_number() {
        let (platform, _) = fake(None);
        let mut resolver = ReferenceResolver::new(true, Some(platform));
        let info = resolver.get_reference_info(&commit("fix #9")).await;
        assert_eq!(info, Some(ReferenceInfo::unresolved(9)));
    }

    #[tokio::test]
    async fn timed_out_fetch_degrades_to_number() {
        use wiremock::matchers::method;
        use wiremock::{Mock, MockServer, ResponseTemplate};

        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"title": "Too late"}))
                    .set_delay(Duration::from_secs(2)),
            )
            .mount(&server)
            .await;

        let client = GitHubClient::new(
            "acme".to_string(),
            "shop".to_string(),
            "gh-token".to_string(),
            Some(server.uri()),
            Duration::from_millis(200),
        )
        .unwrap();
        let mut resolver = ReferenceResolver::new(true, Some(Box::new(client) as Box<dyn ReferencePlatform>));

        let info = resolver.get_reference_info(&commit("fix #42")).await;
        assert_eq!(info, Some(ReferenceInfo::unresolved(42)));
    }

    #[tokio::test]
    async fn missing_platform_returns_number_only() {
        let mut resolver = ReferenceResolver::new(true, None);
        let info = resolver.get_reference_info(&commit("closes #5")).await;
        assert_eq!(info, Some(ReferenceInfo::unresolved(5)));
    }

    #[tokio::test]
    async fn resolution_is_cached_per_commit() {
        let (platform, calls) = fake(Some("Title"));
        let mut resolver = ReferenceResolver::new(true, Some(platform));
        let c = commit("fix #1");
        let first = resolver.get_reference_info(&c).await;
        let second = resolver.get_reference_info(&c).await;
        assert_eq!(first, second);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn reference_used_only_for_unhelpful_messages() {
        let resolver = ReferenceResolver::new(true, None);
        assert!(resolver.should_use_reference(&commit("fix #123")));
        assert!(!resolver.should_use_reference(&commit(
            "Add retry budget to payment client (#123)"
        )));
        assert!(!resolver.should_use_reference(&commit("wip")));
    }

    #[test]
    fn reference_number_in_body_counts() {
        let resolver = ReferenceResolver::new(true, None);
        let c = commit("update").with_body("Closes #44");
        assert!(resolver.should_use_reference(&c));
    }

    #[test]
    fn offline_config_builds_number_only_resolver() {
        let config = ResolverConfig {
            offline: true,
            github_token: Some("token".to_string()),
            ..ResolverConfig::default()
        };
        let resolver = ReferenceResolver::from_config(
            &config,
            Some("https://github.com/a/b.git"),
            Duration::from_secs(1),
        );
        assert!(resolver.is_enabled());
        assert!(resolver.platform.is_none());
    }

    #[test]
    fn github_remote_with_token_builds_client() {
        let config = ResolverConfig {
            github_token: Some("token".to_string()),
            ..ResolverConfig::default()
        };
        let resolver = ReferenceResolver::from_config(
            &config,
            Some("git@github.com:a/b.git"),
            Duration::from_secs(1),
        );
        assert_eq!(resolver.platform.as_ref().map(|p| p.name()), Some("GitHub"));
    }

    #[test]
    fn gitlab_remote_without_token_has_no_client() {
        let config = ResolverConfig {
            github_token: Some("token".to_string()),
            ..ResolverConfig::default()
        };
        let resolver = ReferenceResolver::from_config(
            &config,
            Some("git@gitlab.com:g/p.git"),
            Duration::from_secs(1),
        );
        assert!(resolver.platform.is_none());
    }

    #[test]
    fn disabled_config_builds_disabled_resolver() {
        let config = ResolverConfig {
            disabled: true,
            ..ResolverConfig::default()
        };
        let resolver = ReferenceResolver::from_config(&config, None, Duration::from_secs(1));
        assert!(!resolver.is_enabled());
    }
}
