use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::response::Response;
use chrono::NaiveDate;
use serde_json::Value;

use crate::workflows::scholarship::domain::{
    ApplicantId, ApplicantProfile, ApplicationId, ApplicationStatus, DocumentStatus,
    HistoricalApplication, Scholarship, ScholarshipCriteria, ScholarshipId, SubmittedDocument,
    YearLevel,
};
use crate::workflows::scholarship::features::FeatureName;
use crate::workflows::scholarship::models::{
    InMemoryModelRepository, ModelId, ModelRepository, ModelScope, ModelStore, TrainedModel,
    WeightCache,
};
use crate::workflows::scholarship::regression::{ModelWeights, TrainingConfig};
use crate::workflows::scholarship::repository::{
    ApplicationHistory, RepositoryError, ScholarshipCatalog,
};
use crate::workflows::scholarship::{
    scholarship_router, ModelSelector, PredictionService, ScholarshipServices, TrainingService,
};

pub(super) const MERIT: &str = "merit-2025";

pub(super) fn merit_id() -> ScholarshipId {
    ScholarshipId(MERIT.to_string())
}

pub(super) fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
}

pub(super) fn merit_criteria() -> ScholarshipCriteria {
    ScholarshipCriteria {
        max_gwa: Some(1.75),
        max_annual_family_income: Some(300_000.0),
        eligible_colleges: vec!["College of Engineering".to_string()],
        ..ScholarshipCriteria::default()
    }
}

/// Merit grant with a GWA ceiling, an income ceiling and one eligible college.
pub(super) fn merit_scholarship() -> Scholarship {
    Scholarship {
        id: merit_id(),
        name: "Engineering Merit Grant".to_string(),
        scholarship_type: Some("merit".to_string()),
        criteria: merit_criteria(),
        required_documents: Vec::new(),
        opens_on: None,
        deadline: None,
    }
}

/// Applicant used by the closed-form probability check.
pub(super) fn strong_applicant() -> ApplicantProfile {
    ApplicantProfile {
        applicant_id: ApplicantId("stu-0001".to_string()),
        gwa: Some(1.25),
        classification: Some(YearLevel::Junior),
        college: Some("College of Engineering".to_string()),
        course: Some("BS Civil Engineering".to_string()),
        citizenship: Some("Filipino".to_string()),
        annual_family_income: Some(150_000.0),
        has_failing_grade: Some(false),
        has_disciplinary_action: Some(false),
        has_other_scholarship: Some(false),
        documents: vec![SubmittedDocument {
            document_type: "transcript".to_string(),
            status: DocumentStatus::Verified,
        }],
        ..ApplicantProfile::default()
    }
}

pub(super) fn weak_applicant() -> ApplicantProfile {
    ApplicantProfile {
        applicant_id: ApplicantId("stu-0002".to_string()),
        gwa: Some(2.75),
        classification: Some(YearLevel::Freshman),
        college: Some("College of Arts".to_string()),
        annual_family_income: Some(450_000.0),
        ..ApplicantProfile::default()
    }
}

/// Decided application whose snapshot clearly matches its label.
pub(super) fn historical(
    scholarship: &ScholarshipId,
    index: usize,
    approved: bool,
) -> HistoricalApplication {
    let spread = (index % 5) as f64;
    let snapshot = if approved {
        ApplicantProfile {
            gwa: Some(1.1 + spread * 0.05),
            annual_family_income: Some(80_000.0 + spread * 10_000.0),
            ..strong_applicant()
        }
    } else {
        ApplicantProfile {
            gwa: Some(2.5 + spread * 0.1),
            annual_family_income: Some(400_000.0 + spread * 20_000.0),
            ..weak_applicant()
        }
    };

    HistoricalApplication {
        application_id: ApplicationId(format!("{scholarship}-app-{index:04}")),
        scholarship_id: scholarship.clone(),
        status: if approved {
            ApplicationStatus::Approved
        } else {
            ApplicationStatus::Rejected
        },
        applicant_snapshot: snapshot,
        submitted_on: date(2024, 6, 1),
    }
}

/// `count` decided applications alternating approve/reject.
pub(super) fn decided_history(scholarship: &ScholarshipId, count: usize) -> Vec<HistoricalApplication> {
    (0..count)
        .map(|index| historical(scholarship, index, index % 2 == 0))
        .collect()
}

#[derive(Default)]
pub(super) struct MemoryCatalog {
    scholarships: Mutex<HashMap<ScholarshipId, Scholarship>>,
    applicants: Mutex<HashMap<ApplicantId, ApplicantProfile>>,
}

impl MemoryCatalog {
    pub(super) fn with(scholarships: Vec<Scholarship>) -> Self {
        let catalog = Self::default();
        for scholarship in scholarships {
            catalog.add_scholarship(scholarship);
        }
        catalog
    }

    pub(super) fn add_scholarship(&self, scholarship: Scholarship) {
        self.scholarships
            .lock()
            .expect("catalog mutex poisoned")
            .insert(scholarship.id.clone(), scholarship);
    }

    pub(super) fn add_applicant(&self, applicant: ApplicantProfile) {
        self.applicants
            .lock()
            .expect("catalog mutex poisoned")
            .insert(applicant.applicant_id.clone(), applicant);
    }
}

impl ScholarshipCatalog for MemoryCatalog {
    fn scholarship(&self, id: &ScholarshipId) -> Result<Option<Scholarship>, RepositoryError> {
        Ok(self
            .scholarships
            .lock()
            .expect("catalog mutex poisoned")
            .get(id)
            .cloned())
    }

    fn applicant(&self, id: &ApplicantId) -> Result<Option<ApplicantProfile>, RepositoryError> {
        Ok(self
            .applicants
            .lock()
            .expect("catalog mutex poisoned")
            .get(id)
            .cloned())
    }
}

#[derive(Default)]
pub(super) struct MemoryHistory {
    applications: Mutex<Vec<HistoricalApplication>>,
}

impl MemoryHistory {
    pub(super) fn with(applications: Vec<HistoricalApplication>) -> Self {
        Self {
            applications: Mutex::new(applications),
        }
    }

    pub(super) fn extend(&self, applications: Vec<HistoricalApplication>) {
        self.applications
            .lock()
            .expect("history mutex poisoned")
            .extend(applications);
    }
}

impl ApplicationHistory for MemoryHistory {
    fn decided_count(&self, scholarship: &ScholarshipId) -> Result<usize, RepositoryError> {
        Ok(self
            .applications
            .lock()
            .expect("history mutex poisoned")
            .iter()
            .filter(|app| &app.scholarship_id == scholarship && app.status.is_decided())
            .count())
    }

    fn decided_applications(
        &self,
        scope: &ModelScope,
    ) -> Result<Vec<HistoricalApplication>, RepositoryError> {
        Ok(self
            .applications
            .lock()
            .expect("history mutex poisoned")
            .iter()
            .filter(|app| app.status.is_decided())
            .filter(|app| match scope {
                ModelScope::Global => true,
                ModelScope::Scholarship(id) => &app.scholarship_id == id,
            })
            .cloned()
            .collect())
    }
}

pub(super) struct UnavailableCatalog;

impl ScholarshipCatalog for UnavailableCatalog {
    fn scholarship(&self, _id: &ScholarshipId) -> Result<Option<Scholarship>, RepositoryError> {
        Err(RepositoryError::Unavailable("catalog offline".to_string()))
    }

    fn applicant(&self, _id: &ApplicantId) -> Result<Option<ApplicantProfile>, RepositoryError> {
        Err(RepositoryError::Unavailable("catalog offline".to_string()))
    }
}

pub(super) struct UnavailableModels;

impl ModelRepository for UnavailableModels {
    fn create(&self, _model: TrainedModel) -> Result<TrainedModel, RepositoryError> {
        Err(RepositoryError::Unavailable("model store offline".to_string()))
    }

    fn activate(&self, _id: &ModelId) -> Result<TrainedModel, RepositoryError> {
        Err(RepositoryError::Unavailable("model store offline".to_string()))
    }

    fn active(&self, _scope: &ModelScope) -> Result<Option<TrainedModel>, RepositoryError> {
        Err(RepositoryError::Unavailable("model store offline".to_string()))
    }

    fn fetch(&self, _id: &ModelId) -> Result<Option<TrainedModel>, RepositoryError> {
        Err(RepositoryError::Unavailable("model store offline".to_string()))
    }

    fn history(&self, _scope: &ModelScope) -> Result<Vec<TrainedModel>, RepositoryError> {
        Err(RepositoryError::Unavailable("model store offline".to_string()))
    }
}

pub(super) fn weights(entries: &[(FeatureName, f64)]) -> ModelWeights {
    entries.iter().copied().collect()
}

/// Inactive record with the given weights, ready to publish.
pub(super) fn model_with(scope: ModelScope, weights: ModelWeights, bias: f64) -> TrainedModel {
    let mut model = TrainedModel::with_default_weights(scope, "test");
    model.weights = weights;
    model.bias = bias;
    model
}

pub(super) fn memory_store() -> Arc<ModelStore<InMemoryModelRepository>> {
    Arc::new(ModelStore::new(
        Arc::new(InMemoryModelRepository::default()),
        Arc::new(WeightCache::new()),
    ))
}

/// Seeded configuration so split and shuffle are reproducible.
pub(super) fn seeded_config() -> TrainingConfig {
    TrainingConfig {
        seed: Some(17),
        ..TrainingConfig::default()
    }
}

pub(super) type MemoryServices =
    ScholarshipServices<MemoryCatalog, MemoryHistory, InMemoryModelRepository>;

pub(super) struct Harness {
    pub(super) services: Arc<MemoryServices>,
    pub(super) catalog: Arc<MemoryCatalog>,
    pub(super) history: Arc<MemoryHistory>,
    pub(super) store: Arc<ModelStore<InMemoryModelRepository>>,
}

pub(super) fn harness(history: Vec<HistoricalApplication>) -> Harness {
    harness_with_config(history, seeded_config())
}

pub(super) fn harness_with_config(
    history: Vec<HistoricalApplication>,
    config: TrainingConfig,
) -> Harness {
    let catalog = Arc::new(MemoryCatalog::with(vec![merit_scholarship()]));
    let history = Arc::new(MemoryHistory::with(history));
    let store = memory_store();

    let selector = Arc::new(ModelSelector::with_threshold(
        store.clone(),
        history.clone(),
        config.min_samples,
    ));
    let services = Arc::new(ScholarshipServices {
        prediction: PredictionService::new(catalog.clone(), selector),
        training: TrainingService::new(catalog.clone(), history.clone(), store.clone(), config),
    });

    Harness {
        services,
        catalog,
        history,
        store,
    }
}

pub(super) fn router_for(harness: &Harness) -> axum::Router {
    scholarship_router(harness.services.clone())
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
