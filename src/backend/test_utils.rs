//! Shared test utilities for the `backend` module.

use std::collections::VecDeque;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};

use anyhow::Result;

use super::{BackendKind, BackendMetadata, GenerativeBackend};

/// Mock backend with a pre-programmed queue of responses.
///
/// Responses are returned in FIFO order. When the queue is exhausted,
/// subsequent calls return `Err("no more mock responses")`.
///
/// Every call records the `(system_prompt, user_prompt)` pair; use
/// [`prompt_handle`](Self::prompt_handle) to inspect them after the mock has
/// been moved into a synthesizer.
pub(crate) struct MockBackend {
    responses: Arc<Mutex<VecDeque<Result<String>>>>,
    kind: BackendKind,
    recorded_prompts: Arc<Mutex<Vec<(String, String)>>>,
}

impl MockBackend {
    /// Creates a mock that returns the given responses in order.
    pub(crate) fn new(kind: BackendKind, responses: Vec<Result<String>>) -> Self {
        Self {
            responses: Arc::new(Mutex::new(VecDeque::from(responses))),
            kind,
            recorded_prompts: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Returns a handle for inspecting which prompts were sent.
    pub(crate) fn prompt_handle(&self) -> PromptRecordHandle {
        PromptRecordHandle {
            recorded_prompts: self.recorded_prompts.clone(),
        }
    }
}

/// Shared handle to a mock backend's recorded prompts.
#[derive(Clone)]
pub(crate) struct PromptRecordHandle {
    recorded_prompts: Arc<Mutex<Vec<(String, String)>>>,
}

impl PromptRecordHandle {
    /// Returns all recorded `(system_prompt, user_prompt)` pairs.
    pub(crate) fn prompts(&self) -> Vec<(String, String)> {
        self.recorded_prompts.lock().unwrap().clone()
    }

    /// Returns the number of backend requests that were made.
    pub(crate) fn request_count(&self) -> usize {
        self.recorded_prompts.lock().unwrap().len()
    }
}

impl GenerativeBackend for MockBackend {
    fn send_request<'a>(
        &'a self,
        system_prompt: &'a str,
        user_prompt: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<String>> + Send + 'a>> {
        let responses = self.responses.clone();
        let recorded = self.recorded_prompts.clone();
        let sys = system_prompt.to_string();
        let usr = user_prompt.to_string();
        Box::pin(async move {
            recorded.lock().unwrap().push((sys, usr));
            responses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(anyhow::anyhow!("no more mock responses")))
        })
    }

    fn get_metadata(&self) -> BackendMetadata {
        BackendMetadata {
            provider: "Mock".to_string(),
            model: "mock-model".to_string(),
            kind: self.kind,
        }
    }
}
