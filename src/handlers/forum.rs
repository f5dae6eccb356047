// src/handlers/forum.rs

use axum::{Json, extract::State, response::IntoResponse};
use serde_json::json;

use crate::state::AppState;

/// Public forum metadata for the cover, participant and rules pages.
pub async fn forum_info(State(state): State<AppState>) -> impl IntoResponse {
    let forum = &state.forum;
    Json(json!({
        "branding": forum.branding,
        "participant_fields": forum.participant_fields,
        "rules": forum.rules_text,
        "templates": forum.enabled_templates(),
    }))
}

/// Keeps the client's session warm.
pub async fn heartbeat() -> impl IntoResponse {
    Json(json!({
        "timestamp": chrono::Utc::now().timestamp(),
    }))
}
