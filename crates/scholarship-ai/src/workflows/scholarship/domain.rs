use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Best achievable grade on the weighted-average scale (1.0 best, 5.0 failing).
pub const BEST_GWA: f64 = 1.0;
/// Worst grade on the weighted-average scale.
pub const WORST_GWA: f64 = 5.0;

/// Identifier wrapper for scholarship programs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ScholarshipId(pub String);

impl fmt::Display for ScholarshipId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier wrapper for applicants.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ApplicantId(pub String);

/// Identifier wrapper for submitted applications.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ApplicationId(pub String);

/// Student classification by year level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum YearLevel {
    Freshman,
    Sophomore,
    Junior,
    Senior,
    FifthYear,
    Graduate,
}

impl YearLevel {
    pub const fn label(self) -> &'static str {
        match self {
            YearLevel::Freshman => "freshman",
            YearLevel::Sophomore => "sophomore",
            YearLevel::Junior => "junior",
            YearLevel::Senior => "senior",
            YearLevel::FifthYear => "fifth_year",
            YearLevel::Graduate => "graduate",
        }
    }
}

impl FromStr for YearLevel {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().replace([' ', '-'], "_").as_str() {
            "freshman" | "1st_year" | "first_year" => Ok(YearLevel::Freshman),
            "sophomore" | "2nd_year" | "second_year" => Ok(YearLevel::Sophomore),
            "junior" | "3rd_year" | "third_year" => Ok(YearLevel::Junior),
            "senior" | "4th_year" | "fourth_year" => Ok(YearLevel::Senior),
            "fifth_year" | "5th_year" => Ok(YearLevel::FifthYear),
            "graduate" => Ok(YearLevel::Graduate),
            other => Err(format!("unknown classification '{other}'")),
        }
    }
}

/// Verification state of an uploaded requirement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentStatus {
    Pending,
    Verified,
    Rejected,
}

/// Document the applicant attached to their profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmittedDocument {
    pub document_type: String,
    pub status: DocumentStatus,
}

/// Applicant attributes consumed by eligibility screening and feature extraction.
///
/// Every attribute is optional. Screening treats a missing value as the least favorable
/// answer instead of rejecting the request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApplicantProfile {
    pub applicant_id: ApplicantId,
    pub gwa: Option<f64>,
    pub classification: Option<YearLevel>,
    pub college: Option<String>,
    pub course: Option<String>,
    pub citizenship: Option<String>,
    pub st_bracket: Option<String>,
    pub annual_family_income: Option<f64>,
    pub units_enrolled: Option<u16>,
    pub units_passed: Option<u16>,
    pub has_failing_grade: Option<bool>,
    pub has_disciplinary_action: Option<bool>,
    pub has_other_scholarship: Option<bool>,
    pub has_approved_thesis_outline: Option<bool>,
    pub documents: Vec<SubmittedDocument>,
}

impl ApplicantProfile {
    /// Reject malformed values before any scoring happens.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if let Some(gwa) = self.gwa {
            if !gwa.is_finite() || !(BEST_GWA..=WORST_GWA).contains(&gwa) {
                return Err(ValidationError::GwaOutOfRange(gwa));
            }
        }

        if let Some(income) = self.annual_family_income {
            if !income.is_finite() || income < 0.0 {
                return Err(ValidationError::InvalidIncome(income));
            }
        }

        Ok(())
    }

    pub fn document_status(&self, document_type: &str) -> Option<DocumentStatus> {
        self.documents
            .iter()
            .filter(|document| same_label(&document.document_type, document_type))
            .map(|document| document.status)
            .max_by_key(|status| match status {
                DocumentStatus::Verified => 2,
                DocumentStatus::Pending => 1,
                DocumentStatus::Rejected => 0,
            })
    }
}

/// Hard eligibility constraints attached to a scholarship.
///
/// Absent options and empty sets mean the criterion does not apply.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScholarshipCriteria {
    pub min_gwa: Option<f64>,
    pub max_gwa: Option<f64>,
    pub max_annual_family_income: Option<f64>,
    pub eligible_classifications: Vec<YearLevel>,
    pub eligible_colleges: Vec<String>,
    pub eligible_courses: Vec<String>,
    pub eligible_citizenship: Vec<String>,
    pub eligible_st_brackets: Vec<String>,
    pub must_not_have_failing_grade: bool,
    pub must_not_have_disciplinary_action: bool,
    pub must_not_have_other_scholarship: bool,
    pub requires_approved_thesis_outline: bool,
    pub min_units_enrolled: Option<u16>,
    pub min_units_passed: Option<u16>,
}

impl ScholarshipCriteria {
    pub fn validate(&self) -> Result<(), ValidationError> {
        for bound in [self.min_gwa, self.max_gwa].into_iter().flatten() {
            if !bound.is_finite() || !(BEST_GWA..=WORST_GWA).contains(&bound) {
                return Err(ValidationError::InvalidCriteria(format!(
                    "GWA bound {bound} outside {BEST_GWA}..={WORST_GWA}"
                )));
            }
        }

        if let (Some(min), Some(max)) = (self.min_gwa, self.max_gwa) {
            if min > max {
                return Err(ValidationError::InvalidCriteria(format!(
                    "minimum GWA {min} exceeds maximum {max}"
                )));
            }
        }

        if let Some(ceiling) = self.max_annual_family_income {
            if !ceiling.is_finite() || ceiling <= 0.0 {
                return Err(ValidationError::InvalidCriteria(format!(
                    "income ceiling {ceiling} must be positive"
                )));
            }
        }

        Ok(())
    }
}

/// Scholarship definition supplied by the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scholarship {
    pub id: ScholarshipId,
    pub name: String,
    #[serde(default)]
    pub scholarship_type: Option<String>,
    #[serde(default)]
    pub criteria: ScholarshipCriteria,
    #[serde(default)]
    pub required_documents: Vec<String>,
    #[serde(default)]
    pub opens_on: Option<NaiveDate>,
    #[serde(default)]
    pub deadline: Option<NaiveDate>,
}

/// Lifecycle status of a scholarship application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationStatus {
    Draft,
    Submitted,
    UnderReview,
    Approved,
    Rejected,
    Withdrawn,
}

impl ApplicationStatus {
    pub const fn label(self) -> &'static str {
        match self {
            ApplicationStatus::Draft => "draft",
            ApplicationStatus::Submitted => "submitted",
            ApplicationStatus::UnderReview => "under_review",
            ApplicationStatus::Approved => "approved",
            ApplicationStatus::Rejected => "rejected",
            ApplicationStatus::Withdrawn => "withdrawn",
        }
    }

    /// Only final approve/reject decisions can serve as training labels.
    pub const fn is_decided(self) -> bool {
        matches!(self, ApplicationStatus::Approved | ApplicationStatus::Rejected)
    }
}

impl FromStr for ApplicationStatus {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().replace([' ', '-'], "_").as_str() {
            "draft" => Ok(ApplicationStatus::Draft),
            "submitted" | "pending" => Ok(ApplicationStatus::Submitted),
            "under_review" => Ok(ApplicationStatus::UnderReview),
            "approved" => Ok(ApplicationStatus::Approved),
            "rejected" | "denied" => Ok(ApplicationStatus::Rejected),
            "withdrawn" => Ok(ApplicationStatus::Withdrawn),
            other => Err(format!("unknown application status '{other}'")),
        }
    }
}

/// Past application with the applicant snapshot captured at submission time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoricalApplication {
    pub application_id: ApplicationId,
    pub scholarship_id: ScholarshipId,
    pub status: ApplicationStatus,
    pub applicant_snapshot: ApplicantProfile,
    pub submitted_on: NaiveDate,
}

/// Input rejected before any computation.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("GWA {0} is outside the 1.0-5.0 grading scale")]
    GwaOutOfRange(f64),
    #[error("annual family income {0} must be a non-negative amount")]
    InvalidIncome(f64),
    #[error("invalid scholarship criteria: {0}")]
    InvalidCriteria(String),
}

pub(crate) fn same_label(left: &str, right: &str) -> bool {
    left.trim().eq_ignore_ascii_case(right.trim())
}

pub(crate) fn contains_label(set: &[String], value: &str) -> bool {
    set.iter().any(|candidate| same_label(candidate, value))
}
