// src/survey/answers.rs

use std::collections::BTreeMap;

use crate::{
    error::AppError,
    models::session::{SessionAnswer, SessionPhase, SessionState},
};

/// Records the ratings for one presentation index, replacing any earlier
/// answer at that index.
///
/// Only an assembled session accepts answers: an index means nothing before
/// the sequence exists, and a finished session is closed.
///
/// Ratings are stored as given; they are not checked against the template's
/// metric list.
pub fn record_answer(
    state: &mut SessionState,
    index: Option<usize>,
    template_id: Option<String>,
    metrics: Option<BTreeMap<String, f64>>,
    time_spent: Option<f64>,
) -> Result<(), AppError> {
    if state.participant.is_none() {
        return Err(AppError::AuthError("No participant session found".to_string()));
    }

    match state.phase {
        SessionPhase::Assembled { .. } => {}
        SessionPhase::Uninitialized => {
            return Err(AppError::Conflict("The test has not been started".to_string()));
        }
        SessionPhase::Finalized { .. } => {
            return Err(AppError::Conflict("The test has already been finished".to_string()));
        }
    }

    let index = index.ok_or(AppError::MissingField("questionIndex"))?;
    let template_id = template_id
        .filter(|id| !id.is_empty())
        .ok_or(AppError::MissingField("originalQuestionId"))?;
    let metrics = metrics.ok_or(AppError::MissingField("answers"))?;

    if state.answers.contains_key(&index) {
        tracing::debug!("Overwriting answer at index {}", index);
    }

    state.answers.insert(
        index,
        SessionAnswer {
            original_template_id: template_id,
            metrics_rated: metrics,
            time_spent_seconds: time_spent,
        },
    );

    Ok(())
}
