// src/handlers/session.rs

use std::collections::BTreeMap;

use axum::{
    Extension, Json,
    extract::{Path, State},
    response::IntoResponse,
};
use serde::Serialize;
use serde_json::json;

use crate::{
    error::AppError,
    models::{
        session::SessionAnswer,
        template::{PROMPT_TAG, SessionQuestionInstance},
    },
    state::AppState,
    survey::assembler::ensure_assembled,
    utils::jwt::Claims,
};

/// DTO for presenting one question instance.
#[derive(Debug, Serialize)]
pub struct QuestionView<'a> {
    pub index: usize,
    pub total_questions: usize,
    pub is_last: bool,
    pub question: &'a SessionQuestionInstance,
    /// Tag to audio URL, including the `prompt` reference.
    pub audio: BTreeMap<&'a str, String>,
    /// Answer already recorded at this index, for revisits.
    pub answer: Option<&'a SessionAnswer>,
}

/// `/audio/<subfolder>/<prompt>_<tag>.<ext>`
fn audio_url(instance: &SessionQuestionInstance, tag: &str, extension: &str) -> String {
    format!(
        "/audio/{}/{}_{}.{}",
        instance.audio_subfolder, instance.prompt_id, tag, extension
    )
}

/// Starts the test for this session.
///
/// Builds the randomized question sequence on the first call and returns the
/// stored one afterwards. Fails with 503 if no template yields a question.
pub async fn begin(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, AppError> {
    let (session_id, mut session) = state.participant_session(&claims).await?;
    let was_assembled = session.questions().is_some();

    let total = {
        let mut rng = rand::rng();
        ensure_assembled(&mut session, &state.forum.questions, &state.inventory, &mut rng)?.len()
    };

    if !was_assembled {
        state.sessions.save(session_id, &session).await?;
    }

    Ok(Json(json!({
        "total_questions": total,
        "first_question": 0,
    })))
}

/// Reports where the participant stands.
pub async fn status(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, AppError> {
    let (_, session) = state.participant_session(&claims).await?;
    let answered: Vec<usize> = session.answers.keys().copied().collect();

    Ok(Json(json!({
        "phase": session.phase.name(),
        "total_questions": session.questions().map_or(0, |q| q.len()),
        "answered": answered,
        "participant": session.participant,
    })))
}

/// Returns the question at a presentation index.
pub async fn show_question(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(index): Path<usize>,
) -> Result<impl IntoResponse, AppError> {
    let (_, session) = state.participant_session(&claims).await?;

    let questions = session
        .questions()
        .ok_or_else(|| AppError::Conflict("The test has not been started".to_string()))?;

    let question = questions
        .get(index)
        .ok_or_else(|| AppError::NotFound(format!("Question {} not found", index)))?;

    let extension = state.forum.audio_extension.as_str();
    let audio = std::iter::once(PROMPT_TAG)
        .chain(question.models.iter().map(String::as_str))
        .map(|tag| (tag, audio_url(question, tag, extension)))
        .collect();

    let view = QuestionView {
        index,
        total_questions: questions.len(),
        is_last: index + 1 == questions.len(),
        question,
        audio,
        answer: session.answers.get(&index),
    };

    Ok(Json(serde_json::to_value(&view)?))
}
