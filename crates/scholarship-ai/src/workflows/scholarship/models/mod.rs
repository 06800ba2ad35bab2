//! Versioned weight sets and the store enforcing one active model per scope.

mod cache;
mod memory;
mod repository;
mod store;

pub use cache::WeightCache;
pub use memory::InMemoryModelRepository;
pub use repository::ModelRepository;
pub use store::ModelStore;

use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::domain::ScholarshipId;
use super::features::FeatureName;
use super::regression::{
    FeatureImportance, ModelMetrics, ModelWeights, TrainingConfig, TrainingOutcome, TrainingStats,
};

/// Author recorded on weight sets restored by a reset.
pub const RESET_AUTHOR: &str = "system:reset";
/// Author recorded on the weight set seeded at startup.
pub const SEED_AUTHOR: &str = "system:seed";

pub const DEFAULT_BIAS: f64 = -2.0;

/// Hand-tuned weights served before any model has been trained for a scope.
pub fn default_weights() -> ModelWeights {
    [
        (FeatureName::GwaScore, 2.0),
        (FeatureName::IncomeMatch, 1.5),
        (FeatureName::EligibilityScore, 2.5),
        (FeatureName::DocumentCompleteness, 1.0),
        (FeatureName::YearLevelMatch, 0.5),
        (FeatureName::CollegeMatch, 0.5),
        (FeatureName::CourseMatch, 0.5),
        (FeatureName::CitizenshipMatch, 0.5),
        (FeatureName::StBracketMatch, 0.5),
        (FeatureName::ApplicationTiming, 0.25),
    ]
    .into_iter()
    .collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ModelId(pub String);

impl fmt::Display for ModelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

static MODEL_SEQUENCE: AtomicU64 = AtomicU64::new(1);

pub(crate) fn next_model_id() -> ModelId {
    let id = MODEL_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    ModelId(format!("model-{id:06}"))
}

/// Unit at which a trained model applies: everything, or one scholarship.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum ModelScope {
    Global,
    Scholarship(ScholarshipId),
}

impl ModelScope {
    pub fn model_type(&self) -> ModelType {
        match self {
            ModelScope::Global => ModelType::Global,
            ModelScope::Scholarship(_) => ModelType::ScholarshipSpecific,
        }
    }
}

impl fmt::Display for ModelScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelScope::Global => f.write_str("global"),
            ModelScope::Scholarship(id) => write!(f, "scholarship:{id}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid model scope '{0}': expected 'global' or 'scholarship:<id>'")]
pub struct InvalidScope(pub String);

impl FromStr for ModelScope {
    type Err = InvalidScope;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        if trimmed.eq_ignore_ascii_case("global") {
            return Ok(ModelScope::Global);
        }
        match trimmed.split_once(':') {
            Some((prefix, id))
                if prefix.trim().eq_ignore_ascii_case("scholarship") && !id.trim().is_empty() =>
            {
                Ok(ModelScope::Scholarship(ScholarshipId(id.trim().to_string())))
            }
            _ => Err(InvalidScope(value.to_string())),
        }
    }
}

impl TryFrom<String> for ModelScope {
    type Error = InvalidScope;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ModelScope> for String {
    fn from(scope: ModelScope) -> Self {
        scope.to_string()
    }
}

/// Which kind of model served a prediction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelType {
    Global,
    ScholarshipSpecific,
}

/// Append-only record of one weight set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainedModel {
    pub id: ModelId,
    pub scope: ModelScope,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scholarship_type: Option<String>,
    pub weights: ModelWeights,
    pub bias: f64,
    pub is_active: bool,
    pub training_config: TrainingConfig,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub training_stats: Option<TrainingStats>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metrics: Option<ModelMetrics>,
    pub feature_importance: Vec<FeatureImportance>,
    pub trained_at: DateTime<Utc>,
    pub trained_by: String,
}

impl TrainedModel {
    pub fn from_training(
        scope: ModelScope,
        scholarship_type: Option<String>,
        outcome: TrainingOutcome,
        training_config: TrainingConfig,
        trained_by: impl Into<String>,
    ) -> Self {
        Self {
            id: next_model_id(),
            scope,
            scholarship_type,
            weights: outcome.weights,
            bias: outcome.bias,
            is_active: false,
            training_config,
            training_stats: Some(outcome.training_stats),
            metrics: Some(outcome.metrics),
            feature_importance: outcome.feature_importance,
            trained_at: Utc::now(),
            trained_by: trained_by.into(),
        }
    }

    /// Record carrying the fixed default weight set for a scope.
    pub fn with_default_weights(scope: ModelScope, trained_by: impl Into<String>) -> Self {
        let weights = default_weights();
        let feature_importance = super::regression::rank_features(&weights);
        Self {
            id: next_model_id(),
            scope,
            scholarship_type: None,
            weights,
            bias: DEFAULT_BIAS,
            is_active: false,
            training_config: TrainingConfig::default(),
            training_stats: None,
            metrics: None,
            feature_importance,
            trained_at: Utc::now(),
            trained_by: trained_by.into(),
        }
    }

    pub fn is_default(&self) -> bool {
        self.metrics.is_none()
    }
}
