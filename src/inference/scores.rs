use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::errors::InferenceError;
use super::labels::LabelTable;
use crate::text::NormalizedText;

/// Probability for one class.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ClassScore {
    #[schema(example = "fake_news")]
    pub label: String,
    #[schema(example = 0.87)]
    pub score: f32,
}

/// Scores in label table order, plus the text the model actually saw.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Classification {
    pub results: Vec<ClassScore>,
    pub text: NormalizedText,
}

/// Numerically stable softmax. Empty input gives empty output.
pub fn softmax(logits: &[f32]) -> Vec<f32> {
    let max = logits.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let exps: Vec<f32> = logits.iter().map(|&x| (x - max).exp()).collect();
    let sum: f32 = exps.iter().sum();
    exps.into_iter().map(|e| e / sum).collect()
}

/// Turns raw logits into labelled probabilities. Position `i` gets label `i`.
pub fn label_scores(labels: &LabelTable, logits: &[f32]) -> Result<Vec<ClassScore>, InferenceError> {
    if logits.len() != labels.len() {
        return Err(InferenceError::OutputMismatch {
            outputs: logits.len(),
            labels: labels.len(),
        });
    }
    if logits.iter().any(|x| !x.is_finite()) {
        return Err(InferenceError::NonFinite);
    }

    Ok(labels
        .iter()
        .zip(softmax(logits))
        .map(|(label, score)| ClassScore {
            label: label.to_string(),
            score,
        })
        .collect())
}
