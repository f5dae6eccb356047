// src/survey/assembler.rs

use std::collections::BTreeSet;

use rand::{Rng, seq::SliceRandom};

use crate::{
    error::AppError,
    models::{
        session::{SessionPhase, SessionState},
        template::{PROMPT_TAG, QuestionTemplate, SessionQuestionInstance},
    },
    survey::inventory::AudioInventory,
};

/// Builds a fresh, shuffled question sequence for one participant.
///
/// For each enabled template, prompts holding every required tag are sampled
/// without replacement (up to `nToPresent`), each instance gets its own model
/// order, and the combined list is shuffled once more so templates interleave.
/// An empty result is an `AssemblyFailure`.
pub fn assemble<R: Rng + ?Sized>(
    templates: &[QuestionTemplate],
    inventory: &AudioInventory,
    rng: &mut R,
) -> Result<Vec<SessionQuestionInstance>, AppError> {
    let mut sequence = Vec::new();

    for template in templates {
        sequence.extend(instances_for_template(template, inventory, rng));
    }

    if sequence.is_empty() {
        return Err(AppError::AssemblyFailure(
            "no template produced a valid question instance".to_string(),
        ));
    }

    sequence.shuffle(rng);
    Ok(sequence)
}

fn instances_for_template<R: Rng + ?Sized>(
    template: &QuestionTemplate,
    inventory: &AudioInventory,
    rng: &mut R,
) -> Vec<SessionQuestionInstance> {
    let n = template.sample_size();
    if n == 0 {
        return Vec::new();
    }

    let Some(subfolder) = template.subfolder() else {
        tracing::warn!("Template {} has no audio subfolder, skipping", template.id);
        return Vec::new();
    };
    let Some(prompts) = inventory.subfolder(subfolder) else {
        tracing::warn!(
            "Template {}: subfolder '{}' not in inventory, skipping",
            template.id,
            subfolder
        );
        return Vec::new();
    };

    let required: BTreeSet<&str> = template
        .models
        .iter()
        .map(String::as_str)
        .chain(std::iter::once(PROMPT_TAG))
        .collect();

    let mut valid_prompts: Vec<&String> = prompts
        .iter()
        .filter(|(_, tags)| required.iter().all(|tag| tags.contains(*tag)))
        .map(|(prompt_id, _)| prompt_id)
        .collect();

    if valid_prompts.is_empty() {
        tracing::warn!(
            "Template {}: no prompt in '{}' has all of {:?}, skipping",
            template.id,
            subfolder,
            required
        );
        return Vec::new();
    }

    if valid_prompts.len() < n {
        tracing::info!(
            "Template {}: {} requested, only {} valid prompt(s) available",
            template.id,
            n,
            valid_prompts.len()
        );
    }

    valid_prompts.shuffle(rng);
    valid_prompts.truncate(n);

    valid_prompts
        .into_iter()
        .map(|prompt_id| {
            let mut models = template.models.clone();
            models.shuffle(rng);
            SessionQuestionInstance {
                original_template_id: template.id.clone(),
                title: template.title.clone(),
                audio_subfolder: subfolder.to_string(),
                prompt_id: prompt_id.clone(),
                models,
                metrics: template.metrics.clone(),
            }
        })
        .collect()
}

/// Assembles the session's sequence once; later calls return the stored one.
///
/// On failure the state stays `Uninitialized` so a retry after the
/// configuration is fixed can still succeed.
pub fn ensure_assembled<'a, R: Rng + ?Sized>(
    state: &'a mut SessionState,
    templates: &[QuestionTemplate],
    inventory: &AudioInventory,
    rng: &mut R,
) -> Result<&'a [SessionQuestionInstance], AppError> {
    if matches!(state.phase, SessionPhase::Uninitialized) {
        let questions = assemble(templates, inventory, rng)?;
        tracing::info!("Assembled {} question(s) for session", questions.len());
        state.phase = SessionPhase::Assembled { questions };
    }

    state
        .questions()
        .ok_or_else(|| AppError::InternalServerError("session has no questions".to_string()))
}
