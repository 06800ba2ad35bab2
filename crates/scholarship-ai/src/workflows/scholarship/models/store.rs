use std::sync::Arc;

use tracing::info;

use super::super::repository::RepositoryError;
use super::cache::WeightCache;
use super::repository::ModelRepository;
use super::{ModelId, ModelScope, TrainedModel};

/// Model lifecycle facade: repository access plus cache invalidation on activation.
pub struct ModelStore<R> {
    repository: Arc<R>,
    cache: Arc<WeightCache>,
}

impl<R> ModelStore<R>
where
    R: ModelRepository + 'static,
{
    pub fn new(repository: Arc<R>, cache: Arc<WeightCache>) -> Self {
        Self { repository, cache }
    }

    pub fn cache(&self) -> &Arc<WeightCache> {
        &self.cache
    }

    /// Active model for a scope, served from the cache when possible.
    pub fn active(&self, scope: &ModelScope) -> Result<Option<Arc<TrainedModel>>, RepositoryError> {
        if let Some(model) = self.cache.get(scope) {
            return Ok(Some(model));
        }

        let generation = self.cache.generation(scope);
        let Some(model) = self.repository.active(scope)? else {
            return Ok(None);
        };
        let model = Arc::new(model);
        self.cache.insert_if_current(model.clone(), generation);
        Ok(Some(model))
    }

    pub fn create(&self, model: TrainedModel) -> Result<TrainedModel, RepositoryError> {
        self.repository.create(model)
    }

    pub fn activate(&self, id: &ModelId) -> Result<TrainedModel, RepositoryError> {
        let activated = self.repository.activate(id)?;
        self.cache.invalidate(&activated.scope);
        info!(model_id = %activated.id, scope = %activated.scope, "model activated");
        Ok(activated)
    }

    /// Append a record and make it the scope's active model.
    pub fn publish(&self, model: TrainedModel) -> Result<TrainedModel, RepositoryError> {
        let created = self.create(model)?;
        self.activate(&created.id)
    }

    pub fn fetch(&self, id: &ModelId) -> Result<Option<TrainedModel>, RepositoryError> {
        self.repository.fetch(id)
    }

    pub fn history(&self, scope: &ModelScope) -> Result<Vec<TrainedModel>, RepositoryError> {
        self.repository.history(scope)
    }
}
