//! One builder session: an owned resume document plus its transcript.
//!
//! A turn is an explicit request/response round trip bounded by a timeout.
//! `send` takes `&mut self`, so a session never has two turns in flight and a
//! turn is the only writer of its document while it runs.

use std::time::Duration;

use anyhow::Context;
use tracing::{info, warn};
use uuid::Uuid;

use crate::errors::AppError;
use crate::extraction::{display_text, extract_patch, strip_emphasis};
use crate::llm_client::prompts::{chat_turn_text, CHAT_SYSTEM_INSTRUCTION, CHAT_TEMPERATURE};
use crate::llm_client::{GenerationRequest, GenerativeBackend, Turn};
use crate::models::chat::{ChatHistory, ChatMessage, ChatRole};
use crate::models::edit::DocumentEdit;
use crate::models::patch::ResumePatch;
use crate::models::resume::ResumeDocument;

/// Assistant reply appended when the backend fails or times out.
pub const FALLBACK_REPLY: &str =
    "I'm sorry, I'm having trouble connecting to my creative brain right now. Can we try again?";

#[derive(Debug, Clone)]
pub struct TurnOutcome {
    pub reply: ChatMessage,
    pub display: String,
    pub applied_fields: Vec<&'static str>,
    pub backend_failed: bool,
}

#[derive(Debug, Clone)]
pub struct ChatSession {
    id: Uuid,
    document: ResumeDocument,
    history: ChatHistory,
}

impl ChatSession {
    pub fn new(mut document: ResumeDocument) -> Self {
        document.assign_missing_ids();
        Self {
            id: Uuid::new_v4(),
            document,
            history: ChatHistory::new(),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn document(&self) -> &ResumeDocument {
        &self.document
    }

    pub fn history(&self) -> &ChatHistory {
        &self.history
    }

    pub fn apply_edit(&mut self, edit: DocumentEdit) -> Result<(), AppError> {
        self.document.apply_edit(edit)
    }

    /// Runs one chat turn.
    ///
    /// A blank message is rejected before anything is recorded. Otherwise the
    /// user message is appended, the backend is asked for a reply within
    /// `timeout`, any data block in the reply is merged into the document, and
    /// the reply is appended. Backend failure or timeout is not an error: the
    /// fallback reply is appended and the document is left as it was.
    pub async fn send(
        &mut self,
        backend: &dyn GenerativeBackend,
        message: &str,
        timeout: Duration,
    ) -> Result<TurnOutcome, AppError> {
        if message.trim().is_empty() {
            return Err(AppError::Validation("message cannot be empty".to_string()));
        }

        let request = self.build_request(message)?;
        self.history.push(ChatRole::User, message);

        let raw_reply = match tokio::time::timeout(timeout, backend.generate(&request)).await {
            Ok(Ok(text)) => Some(text),
            Ok(Err(e)) => {
                warn!("Chat backend failed for session {}: {e}", self.id);
                None
            }
            Err(_) => {
                warn!(
                    "Chat backend timed out after {}s for session {}",
                    timeout.as_secs_f32(),
                    self.id
                );
                None
            }
        };

        let Some(raw_reply) = raw_reply else {
            let reply = self.history.push(ChatRole::Assistant, FALLBACK_REPLY).clone();
            return Ok(TurnOutcome {
                display: reply.display(),
                reply,
                applied_fields: Vec::new(),
                backend_failed: true,
            });
        };

        let applied_fields = match extract_patch(&raw_reply) {
            Some(raw_patch) => {
                let patch = ResumePatch::from_extracted(raw_patch);
                if patch.is_empty() {
                    warn!("Session {} received a data block with no usable fields", self.id);
                }
                let applied = self.document.apply_patch(patch);
                info!(
                    "Session {} merged resume patch fields: {:?}",
                    self.id, applied
                );
                applied
            }
            None => Vec::new(),
        };

        let reply = self
            .history
            .push(ChatRole::Assistant, strip_emphasis(&raw_reply))
            .clone();

        Ok(TurnOutcome {
            display: display_text(&reply.content),
            reply,
            applied_fields,
            backend_failed: false,
        })
    }

    /// System instruction, prior transcript, then the new message with the
    /// current document snapshot.
    fn build_request(&self, message: &str) -> Result<GenerationRequest, AppError> {
        let document_json =
            serde_json::to_string(&self.document).context("serializing resume snapshot")?;

        let mut turns: Vec<Turn> = self
            .history
            .messages()
            .iter()
            .map(|m| match m.role {
                ChatRole::User => Turn::user(m.content.clone()),
                ChatRole::Assistant => Turn::model(m.content.clone()),
            })
            .collect();
        turns.push(Turn::user(chat_turn_text(message, &document_json)));

        Ok(GenerationRequest {
            system: Some(CHAT_SYSTEM_INSTRUCTION.to_string()),
            turns,
            temperature: Some(CHAT_TEMPERATURE),
        })
    }
}
