// src/models/template.rs

use serde::{Deserialize, Serialize};

/// Tag of the reference recording every prompt group must provide.
pub const PROMPT_TAG: &str = "prompt";

/// One rating dimension shown for every compared model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metric {
    pub name: String,
    #[serde(default)]
    pub description: String,
}

/// Authored question definition from the forum file.
///
/// A template does not name a prompt: each session samples prompts from the
/// template's audio subfolder.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionTemplate {
    pub id: String,

    #[serde(default)]
    pub title: String,

    /// Key into the scanned audio inventory.
    /// Optional here so a missing value is reported by validation instead of
    /// failing the whole forum file.
    #[serde(default)]
    pub audio_subfolder: Option<String>,

    /// Model tags to compare, excluding the implicit `prompt` reference.
    #[serde(default)]
    pub models: Vec<String>,

    #[serde(default)]
    pub metrics: Vec<Metric>,

    /// Number of prompts sampled per session. Zero or less disables the
    /// template without rejecting the forum file.
    #[serde(default = "default_n_to_present")]
    pub n_to_present: i64,
}

fn default_n_to_present() -> i64 {
    1
}

impl QuestionTemplate {
    /// Prompts to sample per session; zero when disabled.
    pub fn sample_size(&self) -> usize {
        usize::try_from(self.n_to_present).unwrap_or(0)
    }

    /// Configured audio subfolder. An empty string counts as missing.
    pub fn subfolder(&self) -> Option<&str> {
        self.audio_subfolder.as_deref().filter(|s| !s.is_empty())
    }
}

/// A template bound to one sampled prompt and one shuffled model order.
/// Created once per session by the assembler and never re-checked.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionQuestionInstance {
    pub original_template_id: String,
    pub title: String,
    pub audio_subfolder: String,
    pub prompt_id: String,
    /// Permutation of the template's model list.
    pub models: Vec<String>,
    pub metrics: Vec<Metric>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_template_defaults() {
        let template: QuestionTemplate = serde_json::from_value(serde_json::json!({
            "id": "q1",
            "audioSubfolder": "set1",
            "models": ["gt", "methodA"]
        }))
        .unwrap();

        assert_eq!(template.n_to_present, 1);
        assert!(template.metrics.is_empty());
        assert_eq!(template.title, "");
        assert_eq!(template.audio_subfolder.as_deref(), Some("set1"));
    }

    #[test]
    fn test_template_without_subfolder_still_parses() {
        let template: QuestionTemplate = serde_json::from_value(serde_json::json!({
            "id": "q2",
            "models": ["gt"],
            "nToPresent": 0
        }))
        .unwrap();

        assert!(template.audio_subfolder.is_none());
        assert_eq!(template.n_to_present, 0);
        assert_eq!(template.sample_size(), 0);
    }

    #[test]
    fn test_negative_count_and_empty_subfolder() {
        let template: QuestionTemplate = serde_json::from_value(serde_json::json!({
            "id": "q3",
            "audioSubfolder": "",
            "models": ["gt"],
            "nToPresent": -2
        }))
        .unwrap();

        assert_eq!(template.n_to_present, -2);
        assert_eq!(template.sample_size(), 0);
        assert!(template.subfolder().is_none());
    }
}
