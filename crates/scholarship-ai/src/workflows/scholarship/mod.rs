//! Scholarship eligibility screening and approval-probability modelling.
//!
//! Screening rules and feature extraction are pure functions over an applicant profile and a
//! scholarship definition. Trained logistic-regression weight sets live in a versioned store
//! with one active model per scope; the selector picks a scholarship's own model once enough
//! decided applications exist and falls back to the global model otherwise.

pub mod domain;
pub mod eligibility;
pub mod features;
pub mod import;
pub mod models;
pub mod prediction;
pub mod regression;
pub mod repository;
pub mod router;
pub mod selection;
pub mod training;

#[cfg(test)]
mod tests;

pub use domain::{
    ApplicantId, ApplicantProfile, ApplicationId, ApplicationStatus, DocumentStatus,
    HistoricalApplication, Scholarship, ScholarshipCriteria, ScholarshipId, SubmittedDocument,
    ValidationError, YearLevel,
};
pub use eligibility::{EligibilityCheck, EligibilityEngine, EligibilityResult};
pub use features::{FeatureName, FeatureVector};
pub use import::{parse_history, HistoryImportError};
pub use models::{
    InMemoryModelRepository, ModelId, ModelRepository, ModelScope, ModelStore, ModelType,
    TrainedModel, WeightCache,
};
pub use prediction::{
    ConfidenceBucket, DegradedReason, PredictedOutcome, PredictionResult, PredictionService,
    PredictionServiceError,
};
pub use regression::{LabeledSample, ModelMetrics, RegressionError, TrainingConfig};
pub use repository::{ApplicationHistory, RepositoryError, ScholarshipCatalog};
pub use router::{scholarship_router, ScholarshipServices};
pub use selection::{ModelSelector, SelectedModel, SelectionError};
pub use training::{
    ModelStateView, TrainingReport, TrainingService, TrainingServiceError, TrainingStatus,
};
