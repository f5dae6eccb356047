// src/survey/validation.rs

use std::collections::HashSet;

use crate::{
    models::template::{PROMPT_TAG, QuestionTemplate},
    survey::inventory::AudioInventory,
};

/// Cross-checks every template against the scanned inventory.
///
/// Returns one message per unsatisfiable requirement; an empty list means the
/// configuration is usable. Checks cover every prompt present in the subfolder,
/// not only the ones a session may sample.
pub fn validate_templates(templates: &[QuestionTemplate], inventory: &AudioInventory) -> Vec<String> {
    let mut errors = Vec::new();
    let mut seen_ids = HashSet::new();

    for template in templates {
        if !seen_ids.insert(template.id.as_str()) {
            errors.push(format!("Question id '{}' is used more than once.", template.id));
        }

        let Some(subfolder) = template.subfolder() else {
            errors.push(format!(
                "Question {} is missing 'audioSubfolder'.",
                template.id
            ));
            continue;
        };

        let Some(prompts) = inventory.subfolder(subfolder) else {
            errors.push(format!(
                "Audio subfolder '{}' specified in question {} not found or empty in scanned audio data.",
                subfolder, template.id
            ));
            continue;
        };

        for (prompt_id, tags) in prompts {
            if !tags.contains(PROMPT_TAG) {
                errors.push(format!(
                    "Missing prompt audio for prompt ID '{}' in subfolder '{}' (Question {}).",
                    prompt_id, subfolder, template.id
                ));
            }

            let mut checked = HashSet::new();
            for model in &template.models {
                if !checked.insert(model.as_str()) || model == PROMPT_TAG {
                    continue;
                }
                if !tags.contains(model) {
                    errors.push(format!(
                        "Missing audio for model '{}' for prompt ID '{}' in subfolder '{}' (Question {}).",
                        model, prompt_id, subfolder, template.id
                    ));
                }
            }
        }
    }

    errors
}
