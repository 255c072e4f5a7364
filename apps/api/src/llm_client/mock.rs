//! In-memory `GenerativeBackend`s for tests. No network.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::Notify;

use crate::llm_client::{GenerationRequest, GenerativeBackend, LlmError};

/// Replays queued replies in order; `None` in the queue is a 503 failure.
/// Records every request it receives.
#[derive(Default)]
pub struct ScriptedBackend {
    replies: Mutex<VecDeque<Option<String>>>,
    requests: Mutex<Vec<GenerationRequest>>,
}

impl ScriptedBackend {
    pub fn new<I, S>(replies: I) -> Self
    where
        I: IntoIterator<Item = Option<S>>,
        S: Into<String>,
    {
        Self {
            replies: Mutex::new(replies.into_iter().map(|r| r.map(Into::into)).collect()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn replying(reply: &str) -> Self {
        Self::new([Some(reply)])
    }

    pub fn failing() -> Self {
        Self::new([None::<String>])
    }

    pub fn requests(&self) -> Vec<GenerationRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl GenerativeBackend for ScriptedBackend {
    async fn generate(&self, request: &GenerationRequest) -> Result<String, LlmError> {
        self.requests.lock().unwrap().push(request.clone());
        match self.replies.lock().unwrap().pop_front() {
            Some(Some(reply)) => Ok(reply),
            Some(None) | None => Err(LlmError::Api {
                status: 503,
                message: "scripted failure".to_string(),
            }),
        }
    }
}

/// Never answers.
pub struct StalledBackend;

#[async_trait]
impl GenerativeBackend for StalledBackend {
    async fn generate(&self, _request: &GenerationRequest) -> Result<String, LlmError> {
        std::future::pending().await
    }
}

/// Signals `entered` when a call arrives, then waits for `release` before
/// answering with `reply`.
pub struct GatedBackend {
    pub entered: Arc<Notify>,
    pub release: Arc<Notify>,
    reply: String,
}

impl GatedBackend {
    pub fn new(reply: &str) -> Self {
        Self {
            entered: Arc::new(Notify::new()),
            release: Arc::new(Notify::new()),
            reply: reply.to_string(),
        }
    }
}

#[async_trait]
impl GenerativeBackend for GatedBackend {
    async fn generate(&self, _request: &GenerationRequest) -> Result<String, LlmError> {
        self.entered.notify_one();
        self.release.notified().await;
        Ok(self.reply.clone())
    }
}
