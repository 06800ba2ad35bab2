use std::io::Read;

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer};

use super::domain::{
    ApplicantId, ApplicantProfile, ApplicationId, ApplicationStatus, DocumentStatus,
    HistoricalApplication, ScholarshipId, SubmittedDocument, YearLevel,
};

/// Error raised while reading a historical application export.
#[derive(Debug, thiserror::Error)]
pub enum HistoryImportError {
    #[error("failed to read history export: {0}")]
    Csv(#[from] csv::Error),
    #[error("row {row}: {message}")]
    InvalidRow { row: usize, message: String },
}

/// Parse a CSV export of historical applications into applicant snapshots.
///
/// List columns (`verified_documents`, `pending_documents`) are `;`-separated.
pub fn parse_history<R: Read>(reader: R) -> Result<Vec<HistoricalApplication>, HistoryImportError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let mut applications = Vec::new();

    for (index, record) in csv_reader.deserialize::<HistoryRow>().enumerate() {
        let row = record?;
        // Header is line 1.
        let line = index + 2;
        applications.push(row.into_application(line)?);
    }

    Ok(applications)
}

#[derive(Debug, Deserialize)]
struct HistoryRow {
    application_id: String,
    scholarship_id: String,
    status: String,
    submitted_on: String,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    applicant_id: Option<String>,
    #[serde(default)]
    gwa: Option<f64>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    classification: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    college: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    course: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    citizenship: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    st_bracket: Option<String>,
    #[serde(default)]
    annual_family_income: Option<f64>,
    #[serde(default)]
    units_enrolled: Option<u16>,
    #[serde(default)]
    units_passed: Option<u16>,
    #[serde(default)]
    has_failing_grade: Option<bool>,
    #[serde(default)]
    has_disciplinary_action: Option<bool>,
    #[serde(default)]
    has_other_scholarship: Option<bool>,
    #[serde(default)]
    has_approved_thesis_outline: Option<bool>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    verified_documents: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pending_documents: Option<String>,
}

impl HistoryRow {
    fn into_application(self, row: usize) -> Result<HistoricalApplication, HistoryImportError> {
        let invalid = |message: String| HistoryImportError::InvalidRow { row, message };

        let status: ApplicationStatus = self.status.parse().map_err(invalid)?;
        let submitted_on = NaiveDate::parse_from_str(&self.submitted_on, "%Y-%m-%d")
            .map_err(|err| {
                invalid(format!(
                    "failed to parse '{}' as YYYY-MM-DD ({err})",
                    self.submitted_on
                ))
            })?;
        let classification = self
            .classification
            .as_deref()
            .map(str::parse::<YearLevel>)
            .transpose()
            .map_err(invalid)?;

        let mut documents = split_list(self.verified_documents.as_deref(), DocumentStatus::Verified);
        documents.extend(split_list(
            self.pending_documents.as_deref(),
            DocumentStatus::Pending,
        ));

        let applicant_snapshot = ApplicantProfile {
            applicant_id: ApplicantId(self.applicant_id.unwrap_or_default()),
            gwa: self.gwa,
            classification,
            college: self.college,
            course: self.course,
            citizenship: self.citizenship,
            st_bracket: self.st_bracket,
            annual_family_income: self.annual_family_income,
            units_enrolled: self.units_enrolled,
            units_passed: self.units_passed,
            has_failing_grade: self.has_failing_grade,
            has_disciplinary_action: self.has_disciplinary_action,
            has_other_scholarship: self.has_other_scholarship,
            has_approved_thesis_outline: self.has_approved_thesis_outline,
            documents,
        };
        applicant_snapshot
            .validate()
            .map_err(|err| invalid(err.to_string()))?;

        Ok(HistoricalApplication {
            application_id: ApplicationId(self.application_id),
            scholarship_id: ScholarshipId(self.scholarship_id),
            status,
            applicant_snapshot,
            submitted_on,
        })
    }
}

fn split_list(raw: Option<&str>, status: DocumentStatus) -> Vec<SubmittedDocument> {
    raw.map(|raw| {
        raw.split(';')
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(|name| SubmittedDocument {
                document_type: name.to_string(),
                status,
            })
            .collect()
    })
    .unwrap_or_default()
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}
