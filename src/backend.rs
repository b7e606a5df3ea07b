//! Generative-text backends used to phrase achievements.

pub mod error;
pub mod openai;
pub mod prompts;
#[cfg(test)]
pub(crate) mod test_utils;

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use anyhow::Result;
use reqwest::Client;

pub use error::BackendError;
pub use openai::OpenAiBackend;

/// Default per-request timeout for backend and platform calls.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Where a backend runs, which decides confidence and data locality.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BackendKind {
    /// Hosted service; commit data leaves the machine.
    Remote,
    /// Service on the local machine or network (e.g. Ollama).
    Local,
}

/// Metadata about a backend implementation.
#[derive(Clone, Debug)]
pub struct BackendMetadata {
    /// Service provider name.
    pub provider: String,
    /// Model identifier.
    pub model: String,
    /// Where the model runs.
    pub kind: BackendKind,
}

/// Trait for generative-text services.
pub trait GenerativeBackend: Send + Sync {
    /// Sends a request to the service and returns the raw response text.
    fn send_request<'a>(
        &'a self,
        system_prompt: &'a str,
        user_prompt: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<String>> + Send + 'a>>;

    /// Returns metadata about the backend.
    fn get_metadata(&self) -> BackendMetadata;
}

/// Builds an HTTP client with the given request timeout.
pub(crate) fn build_http_client(timeout: Duration) -> Result<Client, BackendError> {
    Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| BackendError::NetworkError(e.to_string()))
}

/// Checks an HTTP response for error status.
///
/// On success, returns the response unchanged for further processing.
/// On failure, reads the error body and returns
/// [`BackendError::ApiRequestFailed`].
pub(crate) async fn check_error_response(
    response: reqwest::Response,
) -> Result<reqwest::Response, BackendError> {
    if response.status().is_success() {
        return Ok(response);
    }
    let status = response.status();
    let error_text = response.text().await.unwrap_or_else(|e| {
        tracing::debug!("Failed to read error response body: {e}");
        String::new()
    });
    Err(BackendError::ApiRequestFailed(format!(
        "HTTP {status}: {error_text}"
    )))
}
