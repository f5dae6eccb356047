// src/survey/finalizer.rs

use std::{collections::BTreeMap, sync::Arc};

use uuid::Uuid;

use crate::{
    error::AppError,
    models::{
        result::{AnswerEntry, ResultRecord},
        session::{Participant, SessionAnswer, SessionPhase, SessionState},
        template::SessionQuestionInstance,
    },
    storage::results::{ResultSink, persist_record},
};

/// Joins the presented sequence with the recorded answers.
///
/// Every presented index appears in the record; unanswered ones carry `null`
/// ratings so drop-off stays visible. Answers at indices outside the sequence
/// are ignored.
pub fn finalize(
    participant: &Participant,
    sequence: &[SessionQuestionInstance],
    answers: &BTreeMap<usize, SessionAnswer>,
) -> ResultRecord {
    let entries = sequence
        .iter()
        .enumerate()
        .map(|(index, instance)| {
            let answer = answers.get(&index);
            if answer.is_none() {
                tracing::warn!(
                    "No answer recorded for question index {} when finalizing results",
                    index
                );
            }
            let entry = AnswerEntry {
                original_template_id: instance.original_template_id.clone(),
                audio_subfolder: instance.audio_subfolder.clone(),
                prompt_id_selected: instance.prompt_id.clone(),
                models_shuffled_order: instance.models.clone(),
                metrics_rated: answer.map(|a| a.metrics_rated.clone()),
                time_spent_on_question: answer.and_then(|a| a.time_spent_seconds),
            };
            (index, entry)
        })
        .collect();

    ResultRecord {
        participant: participant.clone(),
        answers: entries,
        timestamp: chrono::Utc::now().timestamp(),
        uuid: Uuid::new_v4().simple().to_string(),
    }
}

/// Builds the record for an assembled session and hands it to the sink.
///
/// On success the session moves to `Finalized` and the result file name is
/// returned; the caller is expected to clear the session next. On failure the
/// state is left untouched so the participant can retry.
pub async fn finalize_session(
    state: &mut SessionState,
    sink: Arc<dyn ResultSink>,
) -> Result<String, AppError> {
    let participant = state
        .participant
        .as_ref()
        .ok_or_else(|| AppError::AuthError("No participant session found".to_string()))?;

    let record = match &state.phase {
        SessionPhase::Assembled { questions } => finalize(participant, questions, &state.answers),
        SessionPhase::Uninitialized => {
            return Err(AppError::Conflict("The test has not been started".to_string()));
        }
        SessionPhase::Finalized { .. } => {
            return Err(AppError::Conflict("The test has already been finished".to_string()));
        }
    };

    let path = persist_record(sink, record).await?;
    let result_file = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    if let SessionPhase::Assembled { questions } = std::mem::take(&mut state.phase) {
        state.phase = SessionPhase::Finalized {
            questions,
            result_file: result_file.clone(),
        };
    }

    tracing::info!("Results saved to {}", path.display());
    Ok(result_file)
}
