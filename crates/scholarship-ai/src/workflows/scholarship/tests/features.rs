use approx::assert_relative_eq;

use super::common::*;

use crate::workflows::scholarship::domain::{
    ApplicantProfile, DocumentStatus, Scholarship, ScholarshipCriteria, SubmittedDocument,
};
use crate::workflows::scholarship::eligibility::EligibilityEngine;
use crate::workflows::scholarship::features::{extract, FeatureName, FeatureVector};

fn features_for(applicant: &ApplicantProfile, scholarship: &Scholarship) -> FeatureVector {
    let eligibility = EligibilityEngine::new().evaluate(applicant, &scholarship.criteria);
    extract(applicant, scholarship, &eligibility, date(2025, 3, 1))
}

#[test]
fn extracts_scaled_headroom_features() {
    let vector = features_for(&strong_applicant(), &merit_scholarship());

    assert_relative_eq!(vector.get(FeatureName::GwaScore), 0.5 / 0.75, epsilon = 1e-12);
    assert_relative_eq!(vector.get(FeatureName::IncomeMatch), 0.5, epsilon = 1e-12);
    assert_eq!(vector.get(FeatureName::CollegeMatch), 1.0);
    // Empty eligible sets match everyone.
    assert_eq!(vector.get(FeatureName::CourseMatch), 1.0);
    assert_eq!(vector.get(FeatureName::YearLevelMatch), 1.0);
    assert_eq!(vector.get(FeatureName::DocumentCompleteness), 1.0);
    assert_eq!(vector.get(FeatureName::ApplicationTiming), 0.5);
    assert_eq!(vector.get(FeatureName::EligibilityScore), 1.0);
}

#[test]
fn every_feature_stays_on_the_unit_interval() {
    let scholarship = merit_scholarship();
    for applicant in [strong_applicant(), weak_applicant(), ApplicantProfile::default()] {
        let vector = features_for(&applicant, &scholarship);
        for (feature, value) in vector.iter() {
            assert!(
                (0.0..=1.0).contains(&value),
                "{feature} out of range: {value}"
            );
        }
    }
}

#[test]
fn over_ceiling_and_missing_values_score_zero() {
    let vector = features_for(&weak_applicant(), &merit_scholarship());
    assert_eq!(vector.get(FeatureName::GwaScore), 0.0);
    assert_eq!(vector.get(FeatureName::IncomeMatch), 0.0);
    assert_eq!(vector.get(FeatureName::CollegeMatch), 0.0);

    let no_ceiling = Scholarship {
        criteria: ScholarshipCriteria::default(),
        ..merit_scholarship()
    };
    let vector = features_for(&strong_applicant(), &no_ceiling);
    assert_eq!(vector.get(FeatureName::IncomeMatch), 0.0);
    // Without a ceiling the whole grading scale is the span.
    assert_relative_eq!(vector.get(FeatureName::GwaScore), 3.75 / 4.0, epsilon = 1e-12);
}

#[test]
fn documents_credit_verified_fully_and_pending_half() {
    let scholarship = Scholarship {
        required_documents: vec![
            "transcript".to_string(),
            "income_certificate".to_string(),
            "recommendation".to_string(),
            "birth_certificate".to_string(),
        ],
        ..merit_scholarship()
    };
    let applicant = ApplicantProfile {
        documents: vec![
            SubmittedDocument {
                document_type: "Transcript".to_string(),
                status: DocumentStatus::Verified,
            },
            SubmittedDocument {
                document_type: "income_certificate".to_string(),
                status: DocumentStatus::Pending,
            },
            SubmittedDocument {
                document_type: "recommendation".to_string(),
                status: DocumentStatus::Rejected,
            },
        ],
        ..strong_applicant()
    };

    let vector = features_for(&applicant, &scholarship);
    assert_relative_eq!(vector.get(FeatureName::DocumentCompleteness), 1.5 / 4.0);
}

#[test]
fn timing_decays_toward_the_deadline() {
    let scholarship = Scholarship {
        opens_on: Some(date(2025, 2, 1)),
        deadline: Some(date(2025, 3, 31)),
        ..merit_scholarship()
    };
    let applicant = strong_applicant();
    let eligibility = EligibilityEngine::new().evaluate(&applicant, &scholarship.criteria);

    let early = extract(&applicant, &scholarship, &eligibility, date(2025, 2, 1));
    let late = extract(&applicant, &scholarship, &eligibility, date(2025, 3, 25));
    let closed = extract(&applicant, &scholarship, &eligibility, date(2025, 4, 1));

    assert_eq!(early.get(FeatureName::ApplicationTiming), 1.0);
    assert_relative_eq!(late.get(FeatureName::ApplicationTiming), 6.0 / 58.0);
    assert_eq!(closed.get(FeatureName::ApplicationTiming), 0.0);
}

#[test]
fn interactions_are_fixed_combinations() {
    let vector = features_for(&strong_applicant(), &merit_scholarship());
    let gwa = vector.get(FeatureName::GwaScore);

    assert_relative_eq!(vector.get(FeatureName::AcademicStrength), gwa);
    assert_relative_eq!(vector.get(FeatureName::FinancialNeed), 0.5);
    assert_relative_eq!(vector.get(FeatureName::ProgramFit), 1.0);
    assert_relative_eq!(vector.get(FeatureName::ApplicationQuality), 0.75);
    assert_relative_eq!(
        vector.get(FeatureName::OverallFit),
        (gwa + 0.5 + 1.0 + 0.75) / 4.0,
        epsilon = 1e-12
    );
}

#[test]
fn feature_names_round_trip_through_labels() {
    for feature in FeatureName::ALL {
        let parsed: FeatureName = feature.label().parse().expect("label parses");
        assert_eq!(parsed, feature);
    }
    assert!("gpaScore".parse::<FeatureName>().is_err());
    assert!(FeatureName::OverallFit.is_interaction());
    assert!(!FeatureName::GwaScore.is_interaction());
}
