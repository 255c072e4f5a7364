use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::enhance::{enhance_text, EnhanceKind};
use crate::errors::AppError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct EnhanceRequest {
    pub kind: EnhanceKind,
    pub content: String,
    #[serde(default)]
    pub profession: String,
}

#[derive(Debug, Serialize)]
pub struct EnhanceResponse {
    pub text: String,
}

/// POST /api/v1/enhance
pub async fn handle_enhance(
    State(state): State<AppState>,
    Json(req): Json<EnhanceRequest>,
) -> Result<Json<EnhanceResponse>, AppError> {
    if req.content.trim().is_empty() {
        return Err(AppError::Validation("content cannot be empty".to_string()));
    }

    let profession = if req.profession.trim().is_empty() {
        "professional"
    } else {
        req.profession.trim()
    };

    let text = enhance_text(state.llm.as_ref(), req.kind, &req.content, profession).await;
    Ok(Json(EnhanceResponse { text }))
}
