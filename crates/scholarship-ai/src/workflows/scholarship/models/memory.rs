use std::sync::{Mutex, MutexGuard};

use super::super::repository::RepositoryError;
use super::repository::ModelRepository;
use super::{ModelId, ModelScope, TrainedModel};

/// Process-local model store; one lock covers every activation transition.
#[derive(Debug, Default)]
pub struct InMemoryModelRepository {
    records: Mutex<Vec<TrainedModel>>,
}

impl InMemoryModelRepository {
    fn records(&self) -> Result<MutexGuard<'_, Vec<TrainedModel>>, RepositoryError> {
        self.records
            .lock()
            .map_err(|_| RepositoryError::Unavailable("model store lock poisoned".to_string()))
    }
}

impl ModelRepository for InMemoryModelRepository {
    fn create(&self, mut model: TrainedModel) -> Result<TrainedModel, RepositoryError> {
        let mut records = self.records()?;
        if records.iter().any(|record| record.id == model.id) {
            return Err(RepositoryError::Conflict);
        }
        model.is_active = false;
        records.push(model.clone());
        Ok(model)
    }

    fn activate(&self, id: &ModelId) -> Result<TrainedModel, RepositoryError> {
        let mut records = self.records()?;
        let position = records
            .iter()
            .position(|record| &record.id == id)
            .ok_or(RepositoryError::NotFound)?;
        let scope = records[position].scope.clone();

        for record in records.iter_mut().filter(|record| record.scope == scope) {
            record.is_active = false;
        }
        records[position].is_active = true;

        Ok(records[position].clone())
    }

    fn active(&self, scope: &ModelScope) -> Result<Option<TrainedModel>, RepositoryError> {
        let records = self.records()?;
        Ok(records
            .iter()
            .find(|record| record.is_active && &record.scope == scope)
            .cloned())
    }

    fn fetch(&self, id: &ModelId) -> Result<Option<TrainedModel>, RepositoryError> {
        let records = self.records()?;
        Ok(records.iter().find(|record| &record.id == id).cloned())
    }

    fn history(&self, scope: &ModelScope) -> Result<Vec<TrainedModel>, RepositoryError> {
        let records = self.records()?;
        Ok(records
            .iter()
            .filter(|record| &record.scope == scope)
            .cloned()
            .collect())
    }
}
