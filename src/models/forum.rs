// src/models/forum.rs

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::{error::AppError, models::template::QuestionTemplate};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Branding {
    #[serde(default = "default_title")]
    pub title: String,
    #[serde(default = "default_accent_color")]
    pub accent_color: String,
    #[serde(default)]
    pub cover_animation: Option<String>,
}

impl Default for Branding {
    fn default() -> Self {
        Self {
            title: default_title(),
            accent_color: default_accent_color(),
            cover_animation: None,
        }
    }
}

fn default_title() -> String {
    "Listening Survey".to_string()
}

fn default_accent_color() -> String {
    "#888888".to_string()
}

/// One demographic field collected before the test begins.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParticipantField {
    pub key: String,
    #[serde(default)]
    pub label: String,
    /// Input widget hint for the front end ("text", "select", ...).
    #[serde(rename = "type", default = "default_field_type")]
    pub field_type: String,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub options: Vec<String>,
}

fn default_field_type() -> String {
    "text".to_string()
}

impl ParticipantField {
    pub fn display_name(&self) -> &str {
        if self.label.is_empty() { &self.key } else { &self.label }
    }
}

/// The forum definition file.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForumConfig {
    #[serde(default)]
    pub branding: Branding,

    #[serde(default)]
    pub participant_fields: Vec<ParticipantField>,

    /// Rules markdown file, relative to the forum file's directory.
    #[serde(default)]
    pub rules_markdown: Option<String>,

    /// Raw rules text, filled by `load`.
    #[serde(skip)]
    pub rules_text: Option<String>,

    #[serde(default = "default_audio_root")]
    pub audio_root: PathBuf,

    /// Extension used when building audio URLs.
    #[serde(default = "default_audio_extension")]
    pub audio_extension: String,

    #[serde(default)]
    pub questions: Vec<QuestionTemplate>,
}

fn default_audio_root() -> PathBuf {
    PathBuf::from("static/audio")
}

fn default_audio_extension() -> String {
    "mp3".to_string()
}

impl Default for ForumConfig {
    fn default() -> Self {
        Self {
            branding: Branding::default(),
            participant_fields: Vec::new(),
            rules_markdown: None,
            rules_text: None,
            audio_root: default_audio_root(),
            audio_extension: default_audio_extension(),
            questions: Vec::new(),
        }
    }
}

impl ForumConfig {
    /// Reads and parses the forum file, then loads the rules text next to it.
    /// A missing rules file is logged and left empty.
    pub fn load(path: &Path) -> Result<Self, AppError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            AppError::InternalServerError(format!(
                "Failed to read forum config {}: {}",
                path.display(),
                e
            ))
        })?;

        let mut forum: ForumConfig = serde_json::from_str(&content).map_err(|e| {
            AppError::InternalServerError(format!(
                "Failed to parse forum config {}: {}",
                path.display(),
                e
            ))
        })?;

        if let Some(rules) = &forum.rules_markdown {
            let rules_path = path.parent().unwrap_or(Path::new(".")).join(rules);
            match std::fs::read_to_string(&rules_path) {
                Ok(text) => forum.rules_text = Some(text),
                Err(e) => tracing::warn!(
                    "Rules file {} could not be read: {}",
                    rules_path.display(),
                    e
                ),
            }
        }

        Ok(forum)
    }

    /// Templates that will be sampled from (non-zero `nToPresent`).
    pub fn enabled_templates(&self) -> usize {
        self.questions.iter().filter(|q| q.n_to_present > 0).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_load_forum_with_rules() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("rules.md"), "# Rules\nListen carefully.").unwrap();
        fs::write(
            dir.path().join("forum.json"),
            serde_json::json!({
                "branding": { "title": "Vocoder Test" },
                "participantFields": [
                    { "key": "age", "label": "Age", "required": true }
                ],
                "rulesMarkdown": "rules.md",
                "audioRoot": "audio",
                "questions": [
                    { "id": "q1", "audioSubfolder": "set1", "models": ["gt"], "nToPresent": 2 },
                    { "id": "q2", "audioSubfolder": "set2", "models": ["gt"], "nToPresent": 0 }
                ]
            })
            .to_string(),
        )
        .unwrap();

        let forum = ForumConfig::load(&dir.path().join("forum.json")).unwrap();
        assert_eq!(forum.branding.title, "Vocoder Test");
        assert_eq!(forum.branding.accent_color, "#888888");
        assert_eq!(forum.audio_extension, "mp3");
        assert_eq!(forum.participant_fields[0].field_type, "text");
        assert!(forum.rules_text.as_ref().unwrap().contains("Listen carefully"));
        assert_eq!(forum.enabled_templates(), 1);
    }

    #[test]
    fn test_load_forum_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = ForumConfig::load(&dir.path().join("nope.json"));
        assert!(matches!(result, Err(AppError::InternalServerError(_))));
    }
}
