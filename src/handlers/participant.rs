// src/handlers/participant.rs

use std::collections::BTreeMap;

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use serde_json::json;
use uuid::Uuid;

use crate::{
    error::AppError,
    models::{
        forum::ParticipantField,
        session::{Participant, SessionState},
    },
    state::AppState,
    utils::{html::strip_html, jwt::sign_jwt},
};

/// Longest accepted participant answer, in characters.
const MAX_FIELD_LEN: usize = 500;

/// Collects the configured participant fields from a submission.
///
/// Values are trimmed and stripped of markup; unknown keys are dropped. Every
/// missing required field is reported in a single error.
pub fn collect_participant(
    fields: &[ParticipantField],
    submitted: &BTreeMap<String, String>,
) -> Result<Participant, AppError> {
    let mut participant = Participant::new();
    let mut missing = Vec::new();

    for field in fields {
        if field.key.is_empty() {
            continue;
        }

        let value = submitted
            .get(&field.key)
            .map(|v| strip_html(v.trim()))
            .unwrap_or_default();

        if value.chars().count() > MAX_FIELD_LEN {
            return Err(AppError::BadRequest(format!(
                "Field '{}' is too long",
                field.display_name()
            )));
        }

        if field.required && value.is_empty() {
            missing.push(format!("Field '{}' is required", field.display_name()));
            continue;
        }

        participant.insert(field.key.clone(), value);
    }

    if !missing.is_empty() {
        return Err(AppError::BadRequest(missing.join("; ")));
    }

    Ok(participant)
}

/// Registers a participant and opens a new session.
///
/// Returns 201 Created with a bearer token bound to the session.
pub async fn register_participant(
    State(state): State<AppState>,
    Json(payload): Json<BTreeMap<String, String>>,
) -> Result<impl IntoResponse, AppError> {
    let participant = collect_participant(&state.forum.participant_fields, &payload)?;

    let session_id = Uuid::new_v4();
    state
        .sessions
        .save(session_id, &SessionState::with_participant(participant))
        .await?;

    let token = sign_jwt(
        session_id,
        &state.config.jwt_secret,
        state.config.jwt_expiration,
    )?;

    tracing::info!("New participant session {}", session_id);

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "token": token,
            "type": "Bearer",
            "session_id": session_id,
        })),
    ))
}
