use std::sync::Arc;

use crate::chat::store::SessionStore;
use crate::config::Config;
use crate::llm_client::GenerativeBackend;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub sessions: SessionStore,
    /// Generative backend. `LlmClient` in production, scripted in tests.
    pub llm: Arc<dyn GenerativeBackend>,
    pub config: Config,
}
