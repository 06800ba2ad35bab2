use super::domain::{ApplicantId, ApplicantProfile, HistoricalApplication, Scholarship, ScholarshipId};
use super::models::ModelScope;

/// Error enumeration for storage failures shared by every repository seam.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

/// Read access to scholarship definitions and live applicant profiles.
pub trait ScholarshipCatalog: Send + Sync {
    fn scholarship(&self, id: &ScholarshipId) -> Result<Option<Scholarship>, RepositoryError>;
    fn applicant(&self, id: &ApplicantId) -> Result<Option<ApplicantProfile>, RepositoryError>;
}

/// Historical applications used for labels and for the model selection threshold.
pub trait ApplicationHistory: Send + Sync {
    /// Number of approved or rejected applications for one scholarship.
    fn decided_count(&self, scholarship: &ScholarshipId) -> Result<usize, RepositoryError>;

    /// Decided applications within a scope; the global scope spans every scholarship.
    fn decided_applications(
        &self,
        scope: &ModelScope,
    ) -> Result<Vec<HistoricalApplication>, RepositoryError>;
}
