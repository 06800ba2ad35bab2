use super::super::domain::{contains_label, ApplicantProfile, ScholarshipCriteria};
use super::{CriterionType, EligibilityCheck};

const NOT_PROVIDED: &str = "not provided";

pub(crate) fn collect_checks(
    applicant: &ApplicantProfile,
    criteria: &ScholarshipCriteria,
) -> Vec<EligibilityCheck> {
    let mut checks = Vec::new();

    if let Some(min_gwa) = criteria.min_gwa {
        checks.push(EligibilityCheck {
            criterion: "minimum_gwa".to_string(),
            criterion_type: CriterionType::Range,
            passed: applicant.gwa.map(|gwa| gwa >= min_gwa).unwrap_or(false),
            applicant_value: describe_number(applicant.gwa, 2),
            required_value: format!(">= {min_gwa:.2}"),
            weight: 1.0,
        });
    }

    if let Some(max_gwa) = criteria.max_gwa {
        checks.push(EligibilityCheck {
            criterion: "maximum_gwa".to_string(),
            criterion_type: CriterionType::Range,
            passed: applicant.gwa.map(|gwa| gwa <= max_gwa).unwrap_or(false),
            applicant_value: describe_number(applicant.gwa, 2),
            required_value: format!("<= {max_gwa:.2}"),
            weight: 1.0,
        });
    }

    if let Some(ceiling) = criteria.max_annual_family_income {
        checks.push(EligibilityCheck {
            criterion: "maximum_annual_family_income".to_string(),
            criterion_type: CriterionType::Threshold,
            passed: applicant
                .annual_family_income
                .map(|income| income <= ceiling)
                .unwrap_or(false),
            applicant_value: describe_number(applicant.annual_family_income, 0),
            required_value: format!("<= {ceiling:.0}"),
            weight: 1.0,
        });
    }

    if !criteria.eligible_classifications.is_empty() {
        let passed = applicant
            .classification
            .map(|level| criteria.eligible_classifications.contains(&level))
            .unwrap_or(false);
        let required = criteria
            .eligible_classifications
            .iter()
            .map(|level| level.label())
            .collect::<Vec<_>>()
            .join(", ");
        checks.push(EligibilityCheck {
            criterion: "classification".to_string(),
            criterion_type: CriterionType::Membership,
            passed,
            applicant_value: applicant
                .classification
                .map(|level| level.label().to_string())
                .unwrap_or_else(|| NOT_PROVIDED.to_string()),
            required_value: format!("one of: {required}"),
            weight: 0.8,
        });
    }

    let memberships = [
        ("college", &criteria.eligible_colleges, &applicant.college, 0.6),
        ("course", &criteria.eligible_courses, &applicant.course, 0.6),
        (
            "citizenship",
            &criteria.eligible_citizenship,
            &applicant.citizenship,
            0.8,
        ),
        (
            "st_bracket",
            &criteria.eligible_st_brackets,
            &applicant.st_bracket,
            0.6,
        ),
    ];
    for (criterion, eligible, value, weight) in memberships {
        if eligible.is_empty() {
            continue;
        }
        checks.push(EligibilityCheck {
            criterion: criterion.to_string(),
            criterion_type: CriterionType::Membership,
            passed: value
                .as_deref()
                .map(|value| contains_label(eligible, value))
                .unwrap_or(false),
            applicant_value: value.clone().unwrap_or_else(|| NOT_PROVIDED.to_string()),
            required_value: format!("one of: {}", eligible.join(", ")),
            weight,
        });
    }

    let declarations = [
        (
            criteria.must_not_have_failing_grade,
            "no_failing_grade",
            applicant.has_failing_grade,
            0.7,
        ),
        (
            criteria.must_not_have_disciplinary_action,
            "no_disciplinary_action",
            applicant.has_disciplinary_action,
            0.9,
        ),
        (
            criteria.must_not_have_other_scholarship,
            "no_other_scholarship",
            applicant.has_other_scholarship,
            0.5,
        ),
    ];
    for (applies, criterion, flag, weight) in declarations {
        if !applies {
            continue;
        }
        // An undeclared flag cannot be assumed clean.
        checks.push(EligibilityCheck {
            criterion: criterion.to_string(),
            criterion_type: CriterionType::Declaration,
            passed: flag == Some(false),
            applicant_value: describe_flag(flag),
            required_value: "no".to_string(),
            weight,
        });
    }

    if criteria.requires_approved_thesis_outline {
        checks.push(EligibilityCheck {
            criterion: "approved_thesis_outline".to_string(),
            criterion_type: CriterionType::Requirement,
            passed: applicant.has_approved_thesis_outline == Some(true),
            applicant_value: describe_flag(applicant.has_approved_thesis_outline),
            required_value: "yes".to_string(),
            weight: 0.7,
        });
    }

    let unit_minimums = [
        (
            "minimum_units_enrolled",
            criteria.min_units_enrolled,
            applicant.units_enrolled,
        ),
        (
            "minimum_units_passed",
            criteria.min_units_passed,
            applicant.units_passed,
        ),
    ];
    for (criterion, minimum, units) in unit_minimums {
        let Some(minimum) = minimum else {
            continue;
        };
        checks.push(EligibilityCheck {
            criterion: criterion.to_string(),
            criterion_type: CriterionType::Threshold,
            passed: units.map(|units| units >= minimum).unwrap_or(false),
            applicant_value: units
                .map(|units| units.to_string())
                .unwrap_or_else(|| NOT_PROVIDED.to_string()),
            required_value: format!(">= {minimum}"),
            weight: 0.5,
        });
    }

    checks
}

fn describe_number(value: Option<f64>, precision: usize) -> String {
    value
        .map(|value| format!("{value:.precision$}"))
        .unwrap_or_else(|| NOT_PROVIDED.to_string())
}

fn describe_flag(flag: Option<bool>) -> String {
    match flag {
        Some(true) => "yes".to_string(),
        Some(false) => "no".to_string(),
        None => NOT_PROVIDED.to_string(),
    }
}
