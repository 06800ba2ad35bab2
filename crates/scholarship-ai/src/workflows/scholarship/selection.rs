use std::sync::Arc;

use tracing::debug;

use super::domain::ScholarshipId;
use super::models::{ModelRepository, ModelScope, ModelStore, ModelType, TrainedModel};
use super::regression::DEFAULT_MIN_SAMPLES;
use super::repository::{ApplicationHistory, RepositoryError};

/// Model chosen to serve a prediction.
#[derive(Debug, Clone)]
pub struct SelectedModel {
    pub model: Arc<TrainedModel>,
    pub model_type: ModelType,
    pub historical_samples: usize,
}

#[derive(Debug, thiserror::Error)]
pub enum SelectionError {
    #[error("no active model for scholarship {scholarship_id} and no active global model")]
    ModelUnavailable { scholarship_id: ScholarshipId },
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// Chooses between a scholarship-specific model and the global fallback.
pub struct ModelSelector<R, H> {
    store: Arc<ModelStore<R>>,
    history: Arc<H>,
    min_samples_per_scholarship: usize,
}

impl<R, H> ModelSelector<R, H>
where
    R: ModelRepository + 'static,
    H: ApplicationHistory + 'static,
{
    pub fn new(store: Arc<ModelStore<R>>, history: Arc<H>) -> Self {
        Self::with_threshold(store, history, DEFAULT_MIN_SAMPLES)
    }

    pub fn with_threshold(
        store: Arc<ModelStore<R>>,
        history: Arc<H>,
        min_samples_per_scholarship: usize,
    ) -> Self {
        Self {
            store,
            history,
            min_samples_per_scholarship,
        }
    }

    pub fn min_samples_per_scholarship(&self) -> usize {
        self.min_samples_per_scholarship
    }

    /// A scholarship's own model is used only once it has enough decided applications.
    pub fn select_model(&self, scholarship: &ScholarshipId) -> Result<SelectedModel, SelectionError> {
        let historical_samples = self.history.decided_count(scholarship)?;

        if historical_samples >= self.min_samples_per_scholarship {
            let scope = ModelScope::Scholarship(scholarship.clone());
            if let Some(model) = self.store.active(&scope)? {
                debug!(%scholarship, historical_samples, model_id = %model.id, "selected scholarship model");
                return Ok(SelectedModel {
                    model,
                    model_type: ModelType::ScholarshipSpecific,
                    historical_samples,
                });
            }
        }

        match self.store.active(&ModelScope::Global)? {
            Some(model) => {
                debug!(%scholarship, historical_samples, model_id = %model.id, "selected global model");
                Ok(SelectedModel {
                    model,
                    model_type: ModelType::Global,
                    historical_samples,
                })
            }
            None => Err(SelectionError::ModelUnavailable {
                scholarship_id: scholarship.clone(),
            }),
        }
    }
}
