//! Repository hosting platforms and their pull/merge-request APIs.

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info};
use url::Url;

use super::ReferenceInfo;

/// Default GitHub REST API base URL.
pub const DEFAULT_GITHUB_API_URL: &str = "https://api.github.com";

const USER_AGENT: &str = concat!("git-brag/", env!("CARGO_PKG_VERSION"));

/// Errors raised while fetching a reference. The resolver downgrades all of
/// them to an unresolved reference.
#[derive(Error, Debug)]
pub enum ReferenceError {
    /// Transport-level failure, including timeouts.
    #[error("Network error: {0}")]
    Network(String),

    /// Non-success HTTP status.
    #[error("Reference request failed: HTTP {status}")]
    Status {
        /// Returned status code.
        status: u16,
    },

    /// The body could not be decoded.
    #[error("Invalid reference response: {0}")]
    InvalidResponse(String),

    /// The client could not be constructed.
    #[error("Failed to build HTTP client: {0}")]
    Client(String),
}

/// Hosting platform detected from a remote URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RepositoryPlatform {
    /// github.com repository.
    GitHub {
        /// Repository owner or organisation.
        owner: String,
        /// Repository name.
        repo: String,
    },
    /// gitlab.com or self-hosted GitLab project.
    GitLab {
        /// Instance base URL, e.g. `https://gitlab.example.com`.
        base_url: String,
        /// Full project path including groups, e.g. `group/sub/project`.
        project_path: String,
    },
    /// Anything else, or no remote.
    Unknown,
}

impl RepositoryPlatform {
    /// Classifies a remote URL.
    ///
    /// `gitlab_url` names a self-hosted GitLab instance whose host does not
    /// contain "gitlab". Unparseable URLs are [`Unknown`](Self::Unknown).
    pub fn detect(remote_url: Option<&str>, gitlab_url: Option<&str>) -> Self {
        let Some((scheme, host, path)) = remote_url.and_then(split_remote_url) else {
            return Self::Unknown;
        };

        let path = path
            .trim_matches('/')
            .trim_end_matches(".git")
            .trim_end_matches('/')
            .to_string();
        if path.is_empty() {
            return Self::Unknown;
        }

        let host_lower = host
            .split(':')
            .next()
            .unwrap_or_default()
            .to_lowercase();
        if host_lower == "github.com" || host_lower == "www.github.com" {
            let mut segments = path.split('/');
            return match (segments.next(), segments.next(), segments.next()) {
                (Some(owner), Some(repo), None) => Self::GitHub {
                    owner: owner.to_string(),
                    repo: repo.to_string(),
                },
                _ => Self::Unknown,
            };
        }

        let configured_host = gitlab_url
            .and_then(|u| Url::parse(u).ok())
            .and_then(|u| u.host_str().map(str::to_lowercase));

        if host_lower.contains("gitlab") || configured_host.as_deref() == Some(host_lower.as_str()) {
            let base_url = match gitlab_url {
                Some(url) if configured_host.as_deref() == Some(host_lower.as_str()) => {
                    url.trim_end_matches('/').to_string()
                }
                _ => format!("{scheme}://{host}"),
            };
            return Self::GitLab {
                base_url,
                project_path: path,
            };
        }

        Self::Unknown
    }
}

/// Splits a remote URL into (web scheme, host[:port], path).
///
/// SSH remotes map to `https`.
fn split_remote_url(remote: &str) -> Option<(String, String, String)> {
    let remote = remote.trim();

    if !remote.contains("://") {
        // scp-like syntax: user@host:path
        let (user_host, path) = remote.split_once(':')?;
        let host = user_host.rsplit('@').next()?;
        if host.is_empty() {
            return None;
        }
        return Some(("https".to_string(), host.to_string(), path.to_string()));
    }

    let url = Url::parse(remote).ok()?;
    let host = url.host_str()?.to_string();
    let (scheme, port) = match url.scheme() {
        "http" => ("http", url.port()),
        "https" => ("https", url.port()),
        // SSH ports say nothing about the web port.
        _ => ("https", None),
    };
    let authority = match port {
        Some(port) => format!("{host}:{port}"),
        None => host,
    };
    Some((scheme.to_string(), authority, url.path().to_string()))
}

/// A platform that can look up a pull/merge request by number.
pub trait ReferencePlatform: Send + Sync {
    /// Fetches title, description and URL for the reference.
    fn fetch_reference<'a>(
        &'a self,
        number: u64,
    ) -> Pin<Box<dyn Future<Output = Result<ReferenceInfo, ReferenceError>> + Send + 'a>>;

    /// Platform name for logging.
    fn name(&self) -> &'static str;
}

/// Builds an HTTP client with the given request timeout.
fn build_http_client(timeout: Duration) -> Result<Client, ReferenceError> {
    Client::builder()
        .timeout(timeout)
        .user_agent(USER_AGENT)
        .build()
        .map_err(|e| ReferenceError::Client(e.to_string()))
}

/// Sends a prepared request and decodes a JSON body, mapping every failure
/// to a [`ReferenceError`].
async fn send_json<T: DeserializeOwned>(
    request: reqwest::RequestBuilder,
) -> Result<T, ReferenceError> {
    let response = request
        .send()
        .await
        .map_err(|e| ReferenceError::Network(e.to_string()))?;

    let status = response.status();
    if !status.is_success() {
        return Err(ReferenceError::Status {
            status: status.as_u16(),
        });
    }

    response
        .json()
        .await
        .map_err(|e| ReferenceError::InvalidResponse(e.to_string()))
}

#[derive(Deserialize, Debug)]
struct GitHubPull {
    title: String,
    body: Option<String>,
    html_url: Option<String>,
}

/// GitHub pull-request client.
pub struct GitHubClient {
    client: Client,
    base_url: String,
    owner: String,
    repo: String,
    token: String,
}

impl GitHubClient {
    /// Creates a client for `owner/repo`.
    ///
    /// `base_url` defaults to [`DEFAULT_GITHUB_API_URL`]; GitHub Enterprise
    /// installations pass their `/api/v3` URL.
    pub fn new(
        owner: String,
        repo: String,
        token: String,
        base_url: Option<String>,
        timeout: Duration,
    ) -> Result<Self, ReferenceError> {
        Ok(Self {
            client: build_http_client(timeout)?,
            base_url: base_url
                .unwrap_or_else(|| DEFAULT_GITHUB_API_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
            owner,
            repo,
            token,
        })
    }

    fn pull_url(&self, number: u64) -> String {
        format!(
            "{}/repos/{}/{}/pulls/{number}",
            self.base_url, self.owner, self.repo
        )
    }
}

impl ReferencePlatform for GitHubClient {
    fn fetch_reference<'a>(
        &'a self,
        number: u64,
    ) -> Pin<Box<dyn Future<Output = Result<ReferenceInfo, ReferenceError>> + Send + 'a>> {
        Box::pin(async move {
            let url = self.pull_url(number);
            info!(url = %url, "Fetching GitHub pull request");

            let pull: GitHubPull = send_json(
                self.client
                    .get(&url)
                    .header("Accept", "application/vnd.github+json")
                    .header("Authorization", format!("Bearer {}", self.token)),
            )
            .await?;

            debug!(number, title = %pull.title, "Resolved GitHub pull request");

            Ok(ReferenceInfo {
                number,
                title: Some(pull.title),
                description: pull.body,
                url: pull.html_url,
            })
        })
    }

    fn name(&self) -> &'static str {
        "GitHub"
    }
}

#[derive(Deserialize, Debug)]
struct GitLabMergeRequest {
    title: String,
    description: Option<String>,
    web_url: Option<String>,
}

/// GitLab merge-request client.
pub struct GitLabClient {
    client: Client,
    base_url: String,
    project_path: String,
    token: String,
}

impl GitLabClient {
    /// Creates a client for the project at `base_url`.
    pub fn new(
        base_url: String,
        project_path: String,
        token: String,
        timeout: Duration,
    ) -> Result<Self, ReferenceError> {
        Ok(Self {
            client: build_http_client(timeout)?,
            base_url: base_url.trim_end_matches('/').to_string(),
            project_path,
            token,
        })
    }

    fn merge_request_url(&self, number: u64) -> String {
        let encoded: String =
            url::form_urlencoded::byte_serialize(self.project_path.as_bytes()).collect();
        format!(
            "{}/api/v4/projects/{encoded}/merge_requests/{number}",
            self.base_url
        )
    }
}

impl ReferencePlatform for GitLabClient {
    fn fetch_reference<'a>(
        &'a self,
        number: u64,
    ) -> Pin<Box<dyn Future<Output = Result<ReferenceInfo, ReferenceError>> + Send + 'a>> {
        Box::pin(async move {
            let url = self.merge_request_url(number);
            info!(url = %url, "Fetching GitLab merge request");

            let mr: GitLabMergeRequest = send_json(
                self.client
                    .get(&url)
                    .header("PRIVATE-TOKEN", &self.token),
            )
            .await?;

            debug!(number, title = %mr.title, "Resolved GitLab merge request");

            Ok(ReferenceInfo {
                number,
                title: Some(mr.title),
                description: mr.description,
                url: mr.web_url,
            })
        })
    }

    fn name(&self) -> &'static str {
        "GitLab"
    }
}
