// src/models/result.rs

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::models::session::Participant;

/// One presented question joined with whatever the participant recorded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnswerEntry {
    pub original_template_id: String,
    pub audio_subfolder: String,
    pub prompt_id_selected: String,
    pub models_shuffled_order: Vec<String>,
    /// `None` when the index was presented but never answered.
    pub metrics_rated: Option<BTreeMap<String, f64>>,
    pub time_spent_on_question: Option<f64>,
}

/// The immutable record written once per finished session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultRecord {
    pub participant: Participant,
    /// Keyed by presentation index; serialized as string keys.
    pub answers: BTreeMap<usize, AnswerEntry>,
    /// Unix seconds.
    pub timestamp: i64,
    pub uuid: String,
}

impl ResultRecord {
    /// `<timestamp>_<uuid>.json`, sorting chronologically.
    pub fn file_name(&self) -> String {
        format!("{}_{}.json", self.timestamp, self.uuid)
    }
}
