use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::domain::{ApplicationStatus, Scholarship, ScholarshipId};
use super::eligibility::EligibilityEngine;
use super::features;
use super::models::{
    ModelId, ModelRepository, ModelScope, ModelStore, TrainedModel, RESET_AUTHOR, SEED_AUTHOR,
};
use super::regression::{
    self, FeatureImportance, LabeledSample, ModelMetrics, ModelWeights, RegressionError,
    TrainingConfig, TrainingStats,
};
use super::repository::{ApplicationHistory, RepositoryError, ScholarshipCatalog};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrainingStatus {
    Success,
    InsufficientData,
    Failed,
}

/// Structured result of a training request; failures are reported here rather than raised.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingReport {
    pub scope: ModelScope,
    pub status: TrainingStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_id: Option<ModelId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metrics: Option<ModelMetrics>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub training_stats: Option<TrainingStats>,
    pub samples: usize,
    pub message: String,
}

impl TrainingReport {
    fn failed(scope: ModelScope, samples: usize, message: String) -> Self {
        Self {
            scope,
            status: TrainingStatus::Failed,
            model_id: None,
            metrics: None,
            training_stats: None,
            samples,
            message,
        }
    }
}

/// Read-only summary of the model serving a scope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActiveModelSummary {
    pub id: ModelId,
    pub weights: ModelWeights,
    pub bias: f64,
    pub is_default: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metrics: Option<ModelMetrics>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub training_stats: Option<TrainingStats>,
    pub feature_importance: Vec<FeatureImportance>,
    pub trained_at: DateTime<Utc>,
    pub trained_by: String,
}

impl From<&TrainedModel> for ActiveModelSummary {
    fn from(model: &TrainedModel) -> Self {
        Self {
            id: model.id.clone(),
            weights: model.weights.clone(),
            bias: model.bias,
            is_default: model.is_default(),
            metrics: model.metrics.clone(),
            training_stats: model.training_stats.clone(),
            feature_importance: model.feature_importance.clone(),
            trained_at: model.trained_at,
            trained_by: model.trained_by.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelStateView {
    pub scope: ModelScope,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active_model: Option<ActiveModelSummary>,
    pub versions: usize,
    pub decided_samples: usize,
    pub min_samples: usize,
    pub ready_for_training: bool,
}

#[derive(Debug, thiserror::Error)]
pub enum TrainingServiceError {
    #[error("scholarship {0} not found")]
    ScholarshipNotFound(ScholarshipId),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// Orchestrates sample gathering, training, persistence and activation per scope.
pub struct TrainingService<C, H, R> {
    catalog: Arc<C>,
    history: Arc<H>,
    store: Arc<ModelStore<R>>,
    config: TrainingConfig,
    engine: EligibilityEngine,
}

impl<C, H, R> TrainingService<C, H, R>
where
    C: ScholarshipCatalog + 'static,
    H: ApplicationHistory + 'static,
    R: ModelRepository + 'static,
{
    pub fn new(
        catalog: Arc<C>,
        history: Arc<H>,
        store: Arc<ModelStore<R>>,
        config: TrainingConfig,
    ) -> Self {
        Self {
            catalog,
            history,
            store,
            config,
            engine: EligibilityEngine::new(),
        }
    }

    pub fn config(&self) -> &TrainingConfig {
        &self.config
    }

    /// Train a scope and, on success, supersede its active model.
    pub fn train_scope(&self, scope: &ModelScope, trained_by: &str) -> TrainingReport {
        let scholarship_type = match scope {
            ModelScope::Global => None,
            ModelScope::Scholarship(id) => match self.catalog.scholarship(id) {
                Ok(Some(scholarship)) => scholarship.scholarship_type,
                Ok(None) => {
                    return TrainingReport::failed(
                        scope.clone(),
                        0,
                        format!("scholarship {id} not found"),
                    )
                }
                Err(err) => return TrainingReport::failed(scope.clone(), 0, err.to_string()),
            },
        };

        let samples = match self.labeled_samples(scope) {
            Ok(samples) => samples,
            Err(err) => {
                warn!(%scope, error = %err, "unable to gather training samples");
                return TrainingReport::failed(scope.clone(), 0, err.to_string());
            }
        };
        let available = samples.len();

        let outcome = match regression::train(&samples, &self.config) {
            Ok(outcome) => outcome,
            Err(RegressionError::InsufficientData {
                required,
                available,
            }) => {
                warn!(%scope, required, available, "not enough decided applications to train");
                return TrainingReport {
                    scope: scope.clone(),
                    status: TrainingStatus::InsufficientData,
                    model_id: None,
                    metrics: None,
                    training_stats: None,
                    samples: available,
                    message: format!(
                        "{available} decided applications available, {required} required"
                    ),
                };
            }
            Err(err) => {
                warn!(%scope, error = %err, "training aborted; active model left untouched");
                return TrainingReport::failed(scope.clone(), available, err.to_string());
            }
        };

        let model = TrainedModel::from_training(
            scope.clone(),
            scholarship_type,
            outcome,
            self.config.clone(),
            trained_by,
        );
        let published = match self.store.publish(model) {
            Ok(published) => published,
            Err(err) => {
                warn!(%scope, error = %err, "unable to persist trained model");
                return TrainingReport::failed(scope.clone(), available, err.to_string());
            }
        };

        info!(%scope, model_id = %published.id, samples = available, "trained model activated");

        TrainingReport {
            scope: scope.clone(),
            status: TrainingStatus::Success,
            model_id: Some(published.id.clone()),
            metrics: published.metrics.clone(),
            training_stats: published.training_stats.clone(),
            samples: available,
            message: "model trained and activated".to_string(),
        }
    }

    pub fn model_state(&self, scope: &ModelScope) -> Result<ModelStateView, TrainingServiceError> {
        let active = self.store.active(scope)?;
        let versions = self.store.history(scope)?.len();
        let decided_samples = match scope {
            ModelScope::Global => self.history.decided_applications(scope)?.len(),
            ModelScope::Scholarship(id) => self.history.decided_count(id)?,
        };

        Ok(ModelStateView {
            scope: scope.clone(),
            active_model: active.as_deref().map(ActiveModelSummary::from),
            versions,
            decided_samples,
            min_samples: self.config.min_samples,
            ready_for_training: decided_samples >= self.config.min_samples,
        })
    }

    /// Replace the active model with a record carrying the default weight set.
    pub fn reset(&self, scope: &ModelScope) -> Result<ModelStateView, TrainingServiceError> {
        if let ModelScope::Scholarship(id) = scope {
            if self.catalog.scholarship(id)?.is_none() {
                return Err(TrainingServiceError::ScholarshipNotFound(id.clone()));
            }
        }
        let model = TrainedModel::with_default_weights(scope.clone(), RESET_AUTHOR);
        let published = self.store.publish(model)?;
        info!(%scope, model_id = %published.id, "model reset to default weights");
        self.model_state(scope)
    }

    /// Seed the default global model when none is active yet.
    pub fn ensure_global_model(&self) -> Result<Option<TrainedModel>, TrainingServiceError> {
        if self.store.active(&ModelScope::Global)?.is_some() {
            return Ok(None);
        }
        let model = TrainedModel::with_default_weights(ModelScope::Global, SEED_AUTHOR);
        let published = self.store.publish(model)?;
        info!(model_id = %published.id, "seeded default global model");
        Ok(Some(published))
    }

    /// Labeled samples built from the snapshot captured at submission time.
    pub fn labeled_samples(&self, scope: &ModelScope) -> Result<Vec<LabeledSample>, RepositoryError> {
        let applications = self.history.decided_applications(scope)?;
        let mut scholarships: HashMap<ScholarshipId, Option<Scholarship>> = HashMap::new();
        let mut samples = Vec::with_capacity(applications.len());

        for application in applications {
            if !application.status.is_decided() {
                continue;
            }
            if !scholarships.contains_key(&application.scholarship_id) {
                let scholarship = self.catalog.scholarship(&application.scholarship_id)?;
                scholarships.insert(application.scholarship_id.clone(), scholarship);
            }
            let Some(Some(scholarship)) = scholarships.get(&application.scholarship_id) else {
                warn!(
                    scholarship = %application.scholarship_id,
                    "skipping historical application for unknown scholarship"
                );
                continue;
            };

            let snapshot = &application.applicant_snapshot;
            let eligibility = self.engine.evaluate(snapshot, &scholarship.criteria);
            let vector =
                features::extract(snapshot, scholarship, &eligibility, application.submitted_on);
            samples.push(LabeledSample::new(
                vector,
                application.status == ApplicationStatus::Approved,
            ));
        }

        Ok(samples)
    }
}
