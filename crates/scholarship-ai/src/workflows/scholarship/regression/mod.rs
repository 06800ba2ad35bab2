//! L2-regularized binomial logistic regression over the fixed feature schema.
//!
//! Training runs plain batch gradient descent; inference is a clipped sigmoid over the
//! weighted feature sum, with a per-feature contribution breakdown for explanations.

mod config;
mod metrics;
mod training;

pub use config::{TrainingConfig, DEFAULT_MIN_SAMPLES};
pub use metrics::{ConfusionMatrix, ModelMetrics};
pub use training::{train, FeatureImportance, TrainingOutcome, TrainingStats};
pub(crate) use training::rank_features;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::features::{FeatureName, FeatureVector};

/// Logit bound applied before exponentiation.
pub const LOGIT_CLIP: f64 = 500.0;

/// Feature weights keyed by the shared schema. A feature without a weight contributes nothing.
pub type ModelWeights = BTreeMap<FeatureName, f64>;

/// Labeled training example derived from a decided historical application.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LabeledSample {
    pub features: FeatureVector,
    pub approved: bool,
}

impl LabeledSample {
    pub fn new(features: FeatureVector, approved: bool) -> Self {
        Self { features, approved }
    }

    pub fn target(&self) -> f64 {
        if self.approved {
            1.0
        } else {
            0.0
        }
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RegressionError {
    #[error("insufficient training data: {available} labeled samples, {required} required")]
    InsufficientData { required: usize, available: usize },
    #[error("training diverged at epoch {epoch}: non-finite loss or weight")]
    NumericInstability { epoch: usize },
    #[error("invalid training configuration: {0}")]
    InvalidConfig(String),
}

/// Logistic function, strictly inside `(0, 1)` for any finite input.
pub fn sigmoid(z: f64) -> f64 {
    let z = z.clamp(-LOGIT_CLIP, LOGIT_CLIP);
    let p = if z >= 0.0 {
        1.0 / (1.0 + (-z).exp())
    } else {
        let e = z.exp();
        e / (1.0 + e)
    };
    // Rounding collapses large logits onto exactly 1.0.
    p.min(1.0 - f64::EPSILON / 2.0)
}

pub fn linear_score(weights: &ModelWeights, bias: f64, features: &FeatureVector) -> f64 {
    features
        .iter()
        .filter_map(|(feature, value)| weights.get(&feature).map(|weight| weight * value))
        .sum::<f64>()
        + bias
}

/// Approval probability for a feature vector under the given weights.
pub fn predict(weights: &ModelWeights, bias: f64, features: &FeatureVector) -> f64 {
    sigmoid(linear_score(weights, bias, features))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContributionDirection {
    Positive,
    Negative,
}

/// Signed share a single feature adds to the logit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureContribution {
    pub feature: FeatureName,
    pub value: f64,
    pub weight: f64,
    pub contribution: f64,
    pub direction: ContributionDirection,
}

/// Weight × value per weighted feature, largest absolute contribution first.
pub fn explain(weights: &ModelWeights, features: &FeatureVector) -> Vec<FeatureContribution> {
    let mut contributions: Vec<FeatureContribution> = features
        .iter()
        .filter_map(|(feature, value)| {
            let weight = *weights.get(&feature)?;
            let contribution = weight * value;
            Some(FeatureContribution {
                feature,
                value,
                weight,
                contribution,
                direction: if contribution >= 0.0 {
                    ContributionDirection::Positive
                } else {
                    ContributionDirection::Negative
                },
            })
        })
        .collect();

    // Stable sort keeps schema order among equal magnitudes.
    contributions.sort_by(|left, right| {
        right
            .contribution
            .abs()
            .total_cmp(&left.contribution.abs())
    });
    contributions
}
