//! OpenAI-compatible chat-completions backend (works with OpenAI, Ollama, etc.)

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use anyhow::Result;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::{
    build_http_client, check_error_response, BackendError, BackendKind, BackendMetadata,
    GenerativeBackend,
};

/// Default OpenAI API base URL.
pub const OPENAI_BASE_URL: &str = "https://api.openai.com";

/// Default Ollama base URL.
pub const OLLAMA_BASE_URL: &str = "http://localhost:11434";

/// Default OpenAI model.
pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4o-mini";

/// Default Ollama model.
pub const DEFAULT_OLLAMA_MODEL: &str = "llama3.2";

/// Achievements are one sentence; keep completions short.
const MAX_TOKENS: i32 = 120;

/// Chat message.
#[derive(Serialize, Debug)]
struct Message {
    role: String,
    content: String,
}

/// Chat-completions request body.
#[derive(Serialize, Debug)]
struct ChatRequest {
    model: String,
    messages: Vec<Message>,
    max_tokens: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    stream: bool,
}

/// Response choice.
#[derive(Deserialize, Debug)]
struct Choice {
    message: ResponseMessage,
}

/// Response message.
#[derive(Deserialize, Debug)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Chat-completions response.
#[derive(Deserialize, Debug)]
struct ChatResponse {
    choices: Vec<Choice>,
    model: Option<String>,
}

/// OpenAI-compatible backend client.
pub struct OpenAiBackend {
    /// HTTP client for API requests.
    client: Client,
    /// API key for authentication (not needed for Ollama).
    api_key: Option<String>,
    /// Model identifier.
    model: String,
    /// Base URL for the API (e.g., "https://api.openai.com" or "http://localhost:11434").
    base_url: String,
    /// Temperature for response generation.
    temperature: Option<f32>,
    /// Remote service or local model.
    kind: BackendKind,
}

impl OpenAiBackend {
    /// Creates a new OpenAI-compatible client.
    pub fn new(
        model: String,
        api_key: Option<String>,
        base_url: String,
        kind: BackendKind,
        timeout: Duration,
    ) -> Result<Self, BackendError> {
        Ok(Self {
            client: build_http_client(timeout)?,
            api_key,
            model,
            base_url,
            temperature: Some(0.3),
            kind,
        })
    }

    /// Creates a remote client for OpenAI.
    pub fn new_openai(
        model: Option<String>,
        api_key: String,
        timeout: Duration,
    ) -> Result<Self, BackendError> {
        Self::new(
            model.unwrap_or_else(|| DEFAULT_OPENAI_MODEL.to_string()),
            Some(api_key),
            OPENAI_BASE_URL.to_string(),
            BackendKind::Remote,
            timeout,
        )
    }

    /// Creates a local client for Ollama with sensible defaults.
    pub fn new_ollama(
        model: Option<String>,
        base_url: Option<String>,
        timeout: Duration,
    ) -> Result<Self, BackendError> {
        Self::new(
            model.unwrap_or_else(|| DEFAULT_OLLAMA_MODEL.to_string()),
            None, // No API key needed for Ollama
            base_url.unwrap_or_else(|| OLLAMA_BASE_URL.to_string()),
            BackendKind::Local,
            timeout,
        )
    }

    /// Overrides the base URL, e.g. for an OpenAI-compatible proxy.
    #[must_use]
    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url;
        self
    }

    /// Builds the full API URL.
    fn get_api_url(&self) -> String {
        let base = self.base_url.trim_end_matches('/');
        let url = format!("{base}/v1/chat/completions");

        debug!(base_url = %self.base_url, full_url = %url, "Constructed chat completions URL");

        url
    }

    fn provider(&self) -> &'static str {
        match self.kind {
            BackendKind::Remote => "OpenAI",
            BackendKind::Local => "Ollama",
        }
    }
}

impl GenerativeBackend for OpenAiBackend {
    fn send_request<'a>(
        &'a self,
        system_prompt: &'a str,
        user_prompt: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<String>> + Send + 'a>> {
        Box::pin(async move {
            debug!(
                system_prompt_len = system_prompt.len(),
                user_prompt_len = user_prompt.len(),
                model = %self.model,
                provider = self.provider(),
                "Preparing chat completions request"
            );

            let mut messages = Vec::new();
            if !system_prompt.is_empty() {
                messages.push(Message {
                    role: "system".to_string(),
                    content: system_prompt.to_string(),
                });
            }
            messages.push(Message {
                role: "user".to_string(),
                content: user_prompt.to_string(),
            });

            let request = ChatRequest {
                model: self.model.clone(),
                messages,
                max_tokens: MAX_TOKENS,
                temperature: self.temperature,
                stream: false,
            };

            let api_url = self.get_api_url();
            info!(url = %api_url, model = %self.model, "Sending request to {}", self.provider());

            let mut req_builder = self
                .client
                .post(&api_url)
                .header("Content-Type", "application/json")
                .json(&request);

            if let Some(ref api_key) = self.api_key {
                req_builder = req_builder.header("Authorization", format!("Bearer {api_key}"));
            }

            let response = req_builder
                .send()
                .await
                .map_err(|e| BackendError::NetworkError(e.to_string()))?;

            let response = check_error_response(response).await?;

            let chat_response: ChatResponse = response
                .json()
                .await
                .map_err(|e| BackendError::InvalidResponseFormat(e.to_string()))?;

            debug!(
                choice_count = chat_response.choices.len(),
                model = ?chat_response.model,
                "Received chat completions response"
            );

            let text = chat_response
                .choices
                .into_iter()
                .next()
                .and_then(|choice| choice.message.content)
                .filter(|text| !text.trim().is_empty())
                .ok_or(BackendError::EmptyResponse)?;

            debug!(response_len = text.len(), "Extracted backend response text");

            Ok(text)
        })
    }

    fn get_metadata(&self) -> BackendMetadata {
        BackendMetadata {
            provider: self.provider().to_string(),
            model: self.model.clone(),
            kind: self.kind,
        }
    }
}
