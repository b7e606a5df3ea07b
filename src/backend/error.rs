//! Backend-specific error handling.

use thiserror::Error;

/// Generative backend errors.
#[derive(Error, Debug)]
pub enum BackendError {
    /// API request failed with error message.
    #[error("Backend API request failed: {0}")]
    ApiRequestFailed(String),

    /// Invalid response format from the backend.
    #[error("Invalid response format from backend: {0}")]
    InvalidResponseFormat(String),

    /// The backend answered with no usable text.
    #[error("Backend returned an empty response")]
    EmptyResponse,

    /// Network connectivity error, including timeouts.
    #[error("Network error: {0}")]
    NetworkError(String),
}
