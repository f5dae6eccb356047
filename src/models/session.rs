// src/models/session.rs

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::models::template::SessionQuestionInstance;

/// Free-form demographic answers, keyed by participant field key.
pub type Participant = BTreeMap<String, String>;

/// Ratings recorded for one presentation index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionAnswer {
    pub original_template_id: String,
    pub metrics_rated: BTreeMap<String, f64>,
    pub time_spent_seconds: Option<f64>,
}

/// Lifecycle of a session's question sequence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(tag = "phase", rename_all = "snake_case")]
pub enum SessionPhase {
    #[default]
    Uninitialized,
    Assembled {
        questions: Vec<SessionQuestionInstance>,
    },
    Finalized {
        questions: Vec<SessionQuestionInstance>,
        result_file: String,
    },
}

impl SessionPhase {
    pub fn name(&self) -> &'static str {
        match self {
            SessionPhase::Uninitialized => "uninitialized",
            SessionPhase::Assembled { .. } => "assembled",
            SessionPhase::Finalized { .. } => "finalized",
        }
    }
}

/// Server-held state of one participant's session.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionState {
    pub participant: Option<Participant>,
    pub phase: SessionPhase,
    /// Keyed by zero-based presentation index.
    #[serde(default)]
    pub answers: BTreeMap<usize, SessionAnswer>,
}

impl SessionState {
    pub fn with_participant(participant: Participant) -> Self {
        Self {
            participant: Some(participant),
            ..Self::default()
        }
    }

    /// The assembled sequence, if assembly already happened.
    pub fn questions(&self) -> Option<&[SessionQuestionInstance]> {
        match &self.phase {
            SessionPhase::Uninitialized => None,
            SessionPhase::Assembled { questions } => Some(questions),
            SessionPhase::Finalized { questions, .. } => Some(questions),
        }
    }
}
