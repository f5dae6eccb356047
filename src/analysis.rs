// src/analysis.rs

//! Descriptive statistics over saved result files.

use std::{collections::BTreeMap, path::Path};

use serde::Serialize;

use crate::{
    error::AppError,
    models::result::ResultRecord,
    storage::results::{list_result_files, load_result},
};

/// Model bucket for rating keys that carry no model prefix.
pub const ANY_MODEL: &str = "*";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RatingStats {
    pub count: usize,
    pub mean: f64,
    pub median: f64,
    /// Population standard deviation.
    pub std_dev: f64,
    pub min: f64,
    pub max: f64,
}

impl RatingStats {
    /// `None` for an empty sample.
    pub fn from_values(values: &[f64]) -> Option<Self> {
        if values.is_empty() {
            return None;
        }

        let mut sorted = values.to_vec();
        sorted.sort_by(f64::total_cmp);

        let count = sorted.len();
        let mean = sorted.iter().sum::<f64>() / count as f64;
        let median = if count % 2 == 0 {
            (sorted[count / 2 - 1] + sorted[count / 2]) / 2.0
        } else {
            sorted[count / 2]
        };
        let variance = sorted.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / count as f64;

        Some(Self {
            count,
            mean,
            median,
            std_dev: variance.sqrt(),
            min: sorted[0],
            max: sorted[count - 1],
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricSummary {
    pub template_id: String,
    pub model: String,
    pub metric: String,
    pub stats: RatingStats,
}

/// How many instances of a template were shown and how many got ratings.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TemplateSummary {
    pub presented: usize,
    pub answered: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Analysis {
    pub participants: usize,
    pub templates: BTreeMap<String, TemplateSummary>,
    pub metrics: Vec<MetricSummary>,
}

/// Splits a rating key `<model>_<metric>` at the first underscore.
/// Keys without one are attributed to [`ANY_MODEL`].
pub fn split_rating_key(key: &str) -> (&str, &str) {
    match key.split_once('_') {
        Some((model, metric)) if !model.is_empty() && !metric.is_empty() => (model, metric),
        _ => (ANY_MODEL, key),
    }
}

pub fn aggregate(records: &[ResultRecord]) -> Analysis {
    let mut templates: BTreeMap<String, TemplateSummary> = BTreeMap::new();
    let mut samples: BTreeMap<(String, String, String), Vec<f64>> = BTreeMap::new();

    for record in records {
        for entry in record.answers.values() {
            let summary = templates
                .entry(entry.original_template_id.clone())
                .or_default();
            summary.presented += 1;

            let Some(ratings) = &entry.metrics_rated else {
                continue;
            };
            summary.answered += 1;

            for (key, value) in ratings {
                let (model, metric) = split_rating_key(key);
                samples
                    .entry((
                        entry.original_template_id.clone(),
                        model.to_string(),
                        metric.to_string(),
                    ))
                    .or_default()
                    .push(*value);
            }
        }
    }

    let metrics = samples
        .into_iter()
        .filter_map(|((template_id, model, metric), values)| {
            RatingStats::from_values(&values).map(|stats| MetricSummary {
                template_id,
                model,
                metric,
                stats,
            })
        })
        .collect();

    Analysis {
        participants: records.len(),
        templates,
        metrics,
    }
}

/// Loads every visible `*.json` result in `dir`.
/// Unreadable files are returned as messages instead of failing the load.
pub fn load_results(dir: &Path) -> Result<(Vec<ResultRecord>, Vec<String>), AppError> {
    let files = list_result_files(dir).map_err(|e| {
        AppError::NotFound(format!("Results directory {}: {}", dir.display(), e))
    })?;

    let mut records = Vec::new();
    let mut problems = Vec::new();
    for file in files {
        match load_result(&file) {
            Ok(record) => records.push(record),
            Err(e) => problems.push(format!("Error loading {}: {}", file.display(), e)),
        }
    }

    Ok((records, problems))
}
