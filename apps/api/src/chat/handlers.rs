use anyhow::Context;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::chat::session::ChatSession;
use crate::errors::AppError;
use crate::extraction::{display_text, extract_patch};
use crate::models::chat::ChatMessage;
use crate::models::edit::DocumentEdit;
use crate::models::resume::ResumeDocument;
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
pub struct CreateSessionRequest {
    /// Snapshot to continue editing; a blank resume when absent.
    #[serde(default)]
    pub resume: Option<ResumeDocument>,
}

#[derive(Debug, Serialize)]
pub struct MessageView {
    #[serde(flatten)]
    pub message: ChatMessage,
    pub display: String,
}

impl From<&ChatMessage> for MessageView {
    fn from(message: &ChatMessage) -> Self {
        Self {
            display: message.display(),
            message: message.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub session_id: Uuid,
    pub document: ResumeDocument,
    pub history: Vec<MessageView>,
}

impl From<&ChatSession> for SessionResponse {
    fn from(session: &ChatSession) -> Self {
        Self {
            session_id: session.id(),
            document: session.document().clone(),
            history: session.history().messages().iter().map(MessageView::from).collect(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct SendMessageRequest {
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct SendMessageResponse {
    pub reply: MessageView,
    pub applied_fields: Vec<&'static str>,
    pub backend_failed: bool,
    pub document: ResumeDocument,
}

#[derive(Debug, Deserialize)]
pub struct ExtractRequest {
    pub text: String,
}

#[derive(Debug, Serialize)]
pub struct ExtractResponse {
    pub patch: Option<Map<String, Value>>,
    pub display: String,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/sessions
pub async fn handle_create_session(
    State(state): State<AppState>,
    Json(req): Json<CreateSessionRequest>,
) -> Result<(StatusCode, Json<SessionResponse>), AppError> {
    let id = state
        .sessions
        .create(req.resume.unwrap_or_default())
        .await;
    let session = state.sessions.get(id).await?;
    let session = session.lock().await;
    Ok((StatusCode::CREATED, Json(SessionResponse::from(&*session))))
}

/// GET /api/v1/sessions/:id
pub async fn handle_get_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionResponse>, AppError> {
    let session = state.sessions.get(id).await?;
    let session = session.lock().await;
    Ok(Json(SessionResponse::from(&*session)))
}

/// DELETE /api/v1/sessions/:id
pub async fn handle_delete_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    state.sessions.remove(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// PATCH /api/v1/sessions/:id/document
pub async fn handle_edit_document(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(edit): Json<DocumentEdit>,
) -> Result<Json<ResumeDocument>, AppError> {
    let mut session = state.sessions.acquire(id).await?;
    session.apply_edit(edit)?;
    Ok(Json(session.document().clone()))
}

/// GET /api/v1/sessions/:id/messages
pub async fn handle_list_messages(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<MessageView>>, AppError> {
    let session = state.sessions.get(id).await?;
    let session = session.lock().await;
    Ok(Json(
        session.history().messages().iter().map(MessageView::from).collect(),
    ))
}

/// POST /api/v1/sessions/:id/messages
///
/// Runs one chat turn. Answers 409 while another turn on the same session is
/// in flight. The turn runs on its own task, so a client that disconnects
/// mid-turn still leaves a reply (or the fallback) in the transcript.
pub async fn handle_send_message(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<SendMessageRequest>,
) -> Result<Json<SendMessageResponse>, AppError> {
    let mut session = state.sessions.acquire(id).await?;
    let llm = state.llm.clone();
    let timeout = state.config.chat_timeout();

    let turn = tokio::spawn(async move {
        let outcome = session.send(llm.as_ref(), &req.message, timeout).await?;
        Ok::<_, AppError>((outcome, session.document().clone()))
    });
    let (outcome, document) = turn.await.context("chat turn task failed")??;

    Ok(Json(SendMessageResponse {
        reply: MessageView {
            message: outcome.reply,
            display: outcome.display,
        },
        applied_fields: outcome.applied_fields,
        backend_failed: outcome.backend_failed,
        document,
    }))
}

/// POST /api/v1/extract
///
/// Runs both protocol functions over a text without touching any session.
pub async fn handle_extract(Json(req): Json<ExtractRequest>) -> Json<ExtractResponse> {
    Json(ExtractResponse {
        patch: extract_patch(&req.text),
        display: display_text(&req.text),
    })
}
