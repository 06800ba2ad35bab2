use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

use super::domain::{ApplicantId, ApplicantProfile, ScholarshipId, ValidationError};
use super::eligibility::{EligibilityEngine, EligibilityResult};
use super::features;
use super::models::{ModelId, ModelRepository, ModelType};
use super::regression::{self, FeatureContribution};
use super::repository::{ApplicationHistory, RepositoryError, ScholarshipCatalog};
use super::selection::{ModelSelector, SelectionError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PredictedOutcome {
    Approved,
    Rejected,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfidenceBucket {
    High,
    Medium,
    Low,
}

impl ConfidenceBucket {
    /// Bucket by distance from the decision boundary.
    pub fn from_probability(probability: f64) -> Self {
        let margin = (probability - 0.5).abs();
        if margin >= 0.3 {
            ConfidenceBucket::High
        } else if margin >= 0.15 {
            ConfidenceBucket::Medium
        } else {
            ConfidenceBucket::Low
        }
    }
}

/// Why a prediction fell back to the degraded shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "reason", content = "detail", rename_all = "snake_case")]
pub enum DegradedReason {
    ScholarshipNotFound,
    ApplicantNotFound,
    ModelUnavailable,
    StoreUnavailable(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EligibilitySummary {
    pub passed_all: bool,
    pub percentage: u8,
    pub failed_criteria: Vec<String>,
}

impl From<&EligibilityResult> for EligibilitySummary {
    fn from(result: &EligibilityResult) -> Self {
        Self {
            passed_all: result.passed_all,
            percentage: result.percentage,
            failed_criteria: result.failed_criteria(),
        }
    }
}

/// Shaped answer returned for every probability request, degraded or not.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    pub scholarship_id: ScholarshipId,
    pub applicant_id: ApplicantId,
    pub probability: f64,
    pub predicted_outcome: PredictedOutcome,
    pub confidence: ConfidenceBucket,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_type: Option<ModelType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_id: Option<ModelId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub eligibility: Option<EligibilitySummary>,
    pub feature_contributions: Vec<FeatureContribution>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub degraded: Option<DegradedReason>,
    pub generated_at: DateTime<Utc>,
}

impl PredictionResult {
    pub fn degraded(
        scholarship_id: ScholarshipId,
        applicant_id: ApplicantId,
        reason: DegradedReason,
        generated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            scholarship_id,
            applicant_id,
            probability: 0.0,
            predicted_outcome: PredictedOutcome::Rejected,
            confidence: ConfidenceBucket::Low,
            model_type: None,
            model_id: None,
            eligibility: None,
            feature_contributions: Vec::new(),
            degraded: Some(reason),
            generated_at,
        }
    }

    pub fn is_degraded(&self) -> bool {
        self.degraded.is_some()
    }
}

/// Error raised by the prediction service. Everything else degrades instead.
#[derive(Debug, thiserror::Error)]
pub enum PredictionServiceError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("scholarship {0} not found")]
    ScholarshipNotFound(ScholarshipId),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// Orchestrates eligibility, feature extraction, model selection and scoring.
pub struct PredictionService<C, H, R> {
    catalog: Arc<C>,
    selector: Arc<ModelSelector<R, H>>,
    engine: EligibilityEngine,
}

impl<C, H, R> PredictionService<C, H, R>
where
    C: ScholarshipCatalog + 'static,
    H: ApplicationHistory + 'static,
    R: ModelRepository + 'static,
{
    pub fn new(catalog: Arc<C>, selector: Arc<ModelSelector<R, H>>) -> Self {
        Self {
            catalog,
            selector,
            engine: EligibilityEngine::new(),
        }
    }

    /// Hard-rule checklist for an applicant against one scholarship.
    pub fn eligibility_check(
        &self,
        applicant: &ApplicantProfile,
        scholarship_id: &ScholarshipId,
    ) -> Result<EligibilityResult, PredictionServiceError> {
        applicant.validate()?;
        let scholarship = self
            .catalog
            .scholarship(scholarship_id)?
            .ok_or_else(|| PredictionServiceError::ScholarshipNotFound(scholarship_id.clone()))?;
        scholarship.criteria.validate()?;

        Ok(self.engine.evaluate(applicant, &scholarship.criteria))
    }

    pub fn predict(
        &self,
        applicant: &ApplicantProfile,
        scholarship_id: &ScholarshipId,
    ) -> Result<PredictionResult, PredictionServiceError> {
        self.predict_at(applicant, scholarship_id, Utc::now())
    }

    /// Approval probability as of `now`. Only malformed input is returned as an error.
    pub fn predict_at(
        &self,
        applicant: &ApplicantProfile,
        scholarship_id: &ScholarshipId,
        now: DateTime<Utc>,
    ) -> Result<PredictionResult, PredictionServiceError> {
        applicant.validate()?;

        let degrade = |reason: DegradedReason| {
            warn!(scholarship = %scholarship_id, ?reason, "returning degraded prediction");
            PredictionResult::degraded(
                scholarship_id.clone(),
                applicant.applicant_id.clone(),
                reason,
                now,
            )
        };

        let scholarship = match self.catalog.scholarship(scholarship_id) {
            Ok(Some(scholarship)) => scholarship,
            Ok(None) => return Ok(degrade(DegradedReason::ScholarshipNotFound)),
            Err(err) => return Ok(degrade(DegradedReason::StoreUnavailable(err.to_string()))),
        };
        scholarship.criteria.validate()?;

        let eligibility = self.engine.evaluate(applicant, &scholarship.criteria);
        let vector = features::extract(applicant, &scholarship, &eligibility, now.date_naive());

        let selected = match self.selector.select_model(scholarship_id) {
            Ok(selected) => selected,
            Err(SelectionError::ModelUnavailable { .. }) => {
                return Ok(degrade(DegradedReason::ModelUnavailable))
            }
            Err(SelectionError::Repository(err)) => {
                return Ok(degrade(DegradedReason::StoreUnavailable(err.to_string())))
            }
        };

        let model = &selected.model;
        let probability = regression::predict(&model.weights, model.bias, &vector);

        Ok(PredictionResult {
            scholarship_id: scholarship_id.clone(),
            applicant_id: applicant.applicant_id.clone(),
            probability,
            predicted_outcome: if probability >= 0.5 {
                PredictedOutcome::Approved
            } else {
                PredictedOutcome::Rejected
            },
            confidence: ConfidenceBucket::from_probability(probability),
            model_type: Some(selected.model_type),
            model_id: Some(model.id.clone()),
            eligibility: Some(EligibilitySummary::from(&eligibility)),
            feature_contributions: regression::explain(&model.weights, &vector),
            degraded: None,
            generated_at: now,
        })
    }

    /// Resolve a stored applicant profile first; a missing reference degrades.
    pub fn predict_for_applicant(
        &self,
        applicant_id: &ApplicantId,
        scholarship_id: &ScholarshipId,
    ) -> Result<PredictionResult, PredictionServiceError> {
        let now = Utc::now();
        match self.catalog.applicant(applicant_id) {
            Ok(Some(applicant)) => self.predict_at(&applicant, scholarship_id, now),
            Ok(None) => {
                warn!(scholarship = %scholarship_id, "applicant reference missing");
                Ok(PredictionResult::degraded(
                    scholarship_id.clone(),
                    applicant_id.clone(),
                    DegradedReason::ApplicantNotFound,
                    now,
                ))
            }
            Err(err) => Ok(PredictionResult::degraded(
                scholarship_id.clone(),
                applicant_id.clone(),
                DegradedReason::StoreUnavailable(err.to_string()),
                now,
            )),
        }
    }
}
