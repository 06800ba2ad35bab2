use chrono::NaiveDate;
use metrics_exporter_prometheus::PrometheusHandle;
use scholarship_ai::error::AppError;
use scholarship_ai::workflows::scholarship::{
    parse_history, ApplicantId, ApplicantProfile, ApplicationHistory, HistoricalApplication,
    ModelScope, RepositoryError, Scholarship, ScholarshipCatalog, ScholarshipCriteria,
    ScholarshipId, YearLevel,
};
use std::collections::HashMap;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, RwLock};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

fn poisoned() -> RepositoryError {
    RepositoryError::Unavailable("in-memory lock poisoned".to_string())
}

#[derive(Default)]
pub(crate) struct InMemoryScholarshipCatalog {
    scholarships: RwLock<HashMap<ScholarshipId, Scholarship>>,
    applicants: RwLock<HashMap<ApplicantId, ApplicantProfile>>,
}

impl InMemoryScholarshipCatalog {
    pub(crate) fn from_scholarships(scholarships: Vec<Scholarship>) -> Self {
        let catalog = Self::default();
        if let Ok(mut guard) = catalog.scholarships.write() {
            guard.extend(
                scholarships
                    .into_iter()
                    .map(|scholarship| (scholarship.id.clone(), scholarship)),
            );
        }
        catalog
    }

    pub(crate) fn insert_applicant(&self, applicant: ApplicantProfile) -> Result<(), RepositoryError> {
        let mut guard = self.applicants.write().map_err(|_| poisoned())?;
        guard.insert(applicant.applicant_id.clone(), applicant);
        Ok(())
    }

    pub(crate) fn scholarship_ids(&self) -> Result<Vec<ScholarshipId>, RepositoryError> {
        let guard = self.scholarships.read().map_err(|_| poisoned())?;
        let mut ids: Vec<ScholarshipId> = guard.keys().cloned().collect();
        ids.sort();
        Ok(ids)
    }
}

impl ScholarshipCatalog for InMemoryScholarshipCatalog {
    fn scholarship(&self, id: &ScholarshipId) -> Result<Option<Scholarship>, RepositoryError> {
        let guard = self.scholarships.read().map_err(|_| poisoned())?;
        Ok(guard.get(id).cloned())
    }

    fn applicant(&self, id: &ApplicantId) -> Result<Option<ApplicantProfile>, RepositoryError> {
        let guard = self.applicants.read().map_err(|_| poisoned())?;
        Ok(guard.get(id).cloned())
    }
}

#[derive(Default)]
pub(crate) struct InMemoryApplicationHistory {
    applications: RwLock<Vec<HistoricalApplication>>,
}

impl InMemoryApplicationHistory {
    pub(crate) fn from_applications(applications: Vec<HistoricalApplication>) -> Self {
        Self {
            applications: RwLock::new(applications),
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.applications
            .read()
            .map(|guard| guard.len())
            .unwrap_or_default()
    }
}

impl ApplicationHistory for InMemoryApplicationHistory {
    fn decided_count(&self, scholarship: &ScholarshipId) -> Result<usize, RepositoryError> {
        let guard = self.applications.read().map_err(|_| poisoned())?;
        Ok(guard
            .iter()
            .filter(|app| &app.scholarship_id == scholarship && app.status.is_decided())
            .count())
    }

    fn decided_applications(
        &self,
        scope: &ModelScope,
    ) -> Result<Vec<HistoricalApplication>, RepositoryError> {
        let guard = self.applications.read().map_err(|_| poisoned())?;
        Ok(guard
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

/// Programs bundled for local runs when no catalog file is supplied.
pub(crate) fn sample_scholarships() -> Vec<Scholarship> {
    vec![
        Scholarship {
            id: ScholarshipId("merit-2025".to_string()),
            name: "Engineering Merit Grant".to_string(),
            scholarship_type: Some("merit".to_string()),
            criteria: ScholarshipCriteria {
                max_gwa: Some(1.75),
                max_annual_family_income: Some(300_000.0),
                eligible_colleges: vec!["College of Engineering".to_string()],
                must_not_have_failing_grade: true,
                ..ScholarshipCriteria::default()
            },
            required_documents: vec!["transcript".to_string(), "income_certificate".to_string()],
            opens_on: None,
            deadline: None,
        },
        Scholarship {
            id: ScholarshipId("need-2025".to_string()),
            name: "Need-Based Tuition Grant".to_string(),
            scholarship_type: Some("need_based".to_string()),
            criteria: ScholarshipCriteria {
                max_gwa: Some(2.5),
                max_annual_family_income: Some(250_000.0),
                eligible_classifications: vec![
                    YearLevel::Sophomore,
                    YearLevel::Junior,
                    YearLevel::Senior,
                ],
                must_not_have_disciplinary_action: true,
                must_not_have_other_scholarship: true,
                ..ScholarshipCriteria::default()
            },
            required_documents: vec!["transcript".to_string(), "itr".to_string()],
            opens_on: None,
            deadline: None,
        },
    ]
}

pub(crate) fn load_scholarships(path: Option<&Path>) -> Result<Vec<Scholarship>, AppError> {
    let Some(path) = path else {
        return Ok(sample_scholarships());
    };
    let reader = BufReader::new(File::open(path)?);
    let scholarships: Vec<Scholarship> =
        serde_json::from_reader(reader).map_err(std::io::Error::from)?;
    Ok(scholarships)
}

pub(crate) fn load_history(path: Option<&Path>) -> Result<Vec<HistoricalApplication>, AppError> {
    match path {
        Some(path) => Ok(parse_history(BufReader::new(File::open(path)?))?),
        None => Ok(Vec::new()),
    }
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}
