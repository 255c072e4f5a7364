pub mod health;

use axum::{
    routing::{get, patch, post},
    Router,
};

use crate::chat::handlers;
use crate::enhance::handlers::handle_enhance;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Builder sessions
        .route("/api/v1/sessions", post(handlers::handle_create_session))
        .route(
            "/api/v1/sessions/:id",
            get(handlers::handle_get_session).delete(handlers::handle_delete_session),
        )
        .route(
            "/api/v1/sessions/:id/document",
            patch(handlers::handle_edit_document),
        )
        .route(
            "/api/v1/sessions/:id/messages",
            get(handlers::handle_list_messages).post(handlers::handle_send_message),
        )
        // Stateless helpers
        .route("/api/v1/extract", post(handlers::handle_extract))
        .route("/api/v1/enhance", post(handle_enhance))
        .with_state(state)
}
