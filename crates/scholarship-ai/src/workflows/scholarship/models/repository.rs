use super::super::repository::RepositoryError;
use super::{ModelId, ModelScope, TrainedModel};

/// Persistence seam for trained models.
///
/// Implementations must back `(scope, is_active = true)` with a uniqueness guarantee and
/// perform `activate` as a single atomic transition.
pub trait ModelRepository: Send + Sync {
    /// Append a record. It is stored inactive regardless of the flag it arrives with.
    fn create(&self, model: TrainedModel) -> Result<TrainedModel, RepositoryError>;

    /// Deactivate every model sharing the target's scope, then activate the target.
    fn activate(&self, id: &ModelId) -> Result<TrainedModel, RepositoryError>;

    fn active(&self, scope: &ModelScope) -> Result<Option<TrainedModel>, RepositoryError>;

    fn fetch(&self, id: &ModelId) -> Result<Option<TrainedModel>, RepositoryError>;

    /// All versions for a scope, oldest first.
    fn history(&self, scope: &ModelScope) -> Result<Vec<TrainedModel>, RepositoryError>;
}
