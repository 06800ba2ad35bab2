use chrono::NaiveDate;

use super::super::domain::{
    contains_label, ApplicantProfile, DocumentStatus, Scholarship, BEST_GWA, WORST_GWA,
};
use super::super::eligibility::EligibilityResult;
use super::schema::{FeatureName, FeatureVector};

/// Window assumed before a deadline when the scholarship has no opening date.
pub const DEFAULT_APPLICATION_WINDOW_DAYS: i64 = 30;

const NO_DEADLINE_TIMING: f64 = 0.5;

/// Convert an (applicant, scholarship) pair into the fixed feature vector.
///
/// Every value lands in `[0, 1]`; missing applicant attributes map to the least favorable value.
pub fn extract(
    applicant: &ApplicantProfile,
    scholarship: &Scholarship,
    eligibility: &EligibilityResult,
    as_of: NaiveDate,
) -> FeatureVector {
    let criteria = &scholarship.criteria;
    let mut vector = FeatureVector::default();

    vector.set(
        FeatureName::GwaScore,
        gwa_score(applicant.gwa, criteria.max_gwa),
    );
    vector.set(
        FeatureName::YearLevelMatch,
        membership(
            criteria.eligible_classifications.is_empty(),
            applicant
                .classification
                .map(|level| criteria.eligible_classifications.contains(&level)),
        ),
    );
    vector.set(
        FeatureName::IncomeMatch,
        income_match(
            applicant.annual_family_income,
            criteria.max_annual_family_income,
        ),
    );
    vector.set(
        FeatureName::StBracketMatch,
        label_match(&criteria.eligible_st_brackets, applicant.st_bracket.as_deref()),
    );
    vector.set(
        FeatureName::CollegeMatch,
        label_match(&criteria.eligible_colleges, applicant.college.as_deref()),
    );
    vector.set(
        FeatureName::CourseMatch,
        label_match(&criteria.eligible_courses, applicant.course.as_deref()),
    );
    vector.set(
        FeatureName::CitizenshipMatch,
        label_match(
            &criteria.eligible_citizenship,
            applicant.citizenship.as_deref(),
        ),
    );
    vector.set(
        FeatureName::DocumentCompleteness,
        document_completeness(applicant, &scholarship.required_documents),
    );
    vector.set(
        FeatureName::ApplicationTiming,
        application_timing(scholarship.opens_on, scholarship.deadline, as_of),
    );
    vector.set(FeatureName::EligibilityScore, eligibility.score());

    apply_interactions(&mut vector);
    vector
}

fn gwa_score(gwa: Option<f64>, ceiling: Option<f64>) -> f64 {
    let Some(gwa) = gwa else {
        return 0.0;
    };
    let ceiling = ceiling.unwrap_or(WORST_GWA);
    let span = ceiling - BEST_GWA;

    if span <= 0.0 {
        return if gwa <= ceiling { 1.0 } else { 0.0 };
    }

    ((ceiling - gwa) / span).clamp(0.0, 1.0)
}

fn income_match(income: Option<f64>, ceiling: Option<f64>) -> f64 {
    match (income, ceiling) {
        (Some(income), Some(ceiling)) if ceiling > 0.0 && income <= ceiling => {
            ((ceiling - income) / ceiling).clamp(0.0, 1.0)
        }
        _ => 0.0,
    }
}

fn membership(universal: bool, member: Option<bool>) -> f64 {
    if universal || member == Some(true) {
        1.0
    } else {
        0.0
    }
}

fn label_match(eligible: &[String], value: Option<&str>) -> f64 {
    membership(
        eligible.is_empty(),
        value.map(|value| contains_label(eligible, value)),
    )
}

fn document_completeness(applicant: &ApplicantProfile, required: &[String]) -> f64 {
    if required.is_empty() {
        return 1.0;
    }

    let credit: f64 = required
        .iter()
        .map(|document| match applicant.document_status(document) {
            Some(DocumentStatus::Verified) => 1.0,
            Some(DocumentStatus::Pending) => 0.5,
            Some(DocumentStatus::Rejected) | None => 0.0,
        })
        .sum();

    credit / required.len() as f64
}

fn application_timing(
    opens_on: Option<NaiveDate>,
    deadline: Option<NaiveDate>,
    as_of: NaiveDate,
) -> f64 {
    let Some(deadline) = deadline else {
        return NO_DEADLINE_TIMING;
    };
    if as_of > deadline {
        return 0.0;
    }

    let window = opens_on
        .map(|opens| (deadline - opens).num_days())
        .filter(|days| *days > 0)
        .unwrap_or(DEFAULT_APPLICATION_WINDOW_DAYS);
    let remaining = (deadline - as_of).num_days();

    (remaining as f64 / window as f64).clamp(0.0, 1.0)
}

fn apply_interactions(vector: &mut FeatureVector) {
    let academic_strength =
        vector.get(FeatureName::GwaScore) * vector.get(FeatureName::YearLevelMatch);
    let financial_need =
        vector.get(FeatureName::IncomeMatch) * vector.get(FeatureName::StBracketMatch);
    let program_fit =
        (vector.get(FeatureName::CollegeMatch) + vector.get(FeatureName::CourseMatch)) / 2.0;
    let application_quality = (vector.get(FeatureName::DocumentCompleteness)
        + vector.get(FeatureName::ApplicationTiming))
        / 2.0;
    let overall_fit = vector.get(FeatureName::EligibilityScore)
        * (academic_strength + financial_need + program_fit + application_quality)
        / 4.0;

    vector.set(FeatureName::AcademicStrength, academic_strength);
    vector.set(FeatureName::FinancialNeed, financial_need);
    vector.set(FeatureName::ProgramFit, program_fit);
    vector.set(FeatureName::ApplicationQuality, application_quality);
    vector.set(FeatureName::OverallFit, overall_fit);
}
