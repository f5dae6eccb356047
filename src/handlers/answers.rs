// src/handlers/answers.rs

use axum::{Extension, Json, extract::State, response::IntoResponse};
use serde_json::json;
use validator::Validate;

use crate::{
    error::AppError,
    models::answer::SaveAnswerRequest,
    state::AppState,
    survey::{answers::record_answer, finalizer::finalize_session},
    utils::jwt::Claims,
};

/// Saves the ratings for one presented question into the session.
///
/// * Requires an established participant session.
/// * 409 unless the test has begun and is not finished.
/// * `questionIndex` may be 0; an absent index is rejected.
/// * Re-submitting an index replaces the earlier answer.
pub async fn save_answer(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<SaveAnswerRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = req.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    let (session_id, mut session) = state.participant_session(&claims).await?;

    record_answer(
        &mut session,
        req.question_index,
        req.original_question_id,
        req.answers,
        req.time_spent,
    )?;

    state.sessions.save(session_id, &session).await?;

    Ok(Json(json!({ "success": true })))
}

/// Finishes the test: writes the result record and clears the session.
///
/// If the record cannot be written the session is kept so the participant
/// can retry. Once it is written, store failures are logged but do not fail
/// the request.
pub async fn finish(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, AppError> {
    let (session_id, mut session) = state.participant_session(&claims).await?;

    let result_file = finalize_session(&mut session, state.results.clone()).await?;

    // Finalized must be stored before clearing: a retry after a failed clear
    // has to see it.
    if let Err(e) = state.sessions.save(session_id, &session).await {
        tracing::warn!("Failed to mark session {} finalized: {}", session_id, e);
    }
    match state.sessions.clear(session_id).await {
        Ok(()) => tracing::info!("Session {} finished and cleared", session_id),
        Err(e) => tracing::warn!("Session {} finished but not cleared: {}", session_id, e),
    }

    Ok(Json(json!({
        "success": true,
        "resultFile": result_file,
    })))
}
