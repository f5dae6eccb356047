// src/models/answer.rs

use std::collections::BTreeMap;

use serde::Deserialize;
use validator::Validate;

/// DTO for saving the ratings of one presented question.
///
/// Every field is optional at the wire level so that an absent field can be
/// told apart from a zero value and reported as missing.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SaveAnswerRequest {
    #[validate(length(min = 1, max = 128))]
    pub original_question_id: Option<String>,

    /// Zero-based presentation index.
    pub question_index: Option<usize>,

    /// Metric key to rating.
    pub answers: Option<BTreeMap<String, f64>>,

    /// Seconds spent on the question page.
    #[validate(range(min = 0.0))]
    pub time_spent: Option<f64>,
}
