mod rules;

use serde::{Deserialize, Serialize};

use super::domain::{ApplicantProfile, ScholarshipCriteria};

/// Percentage reported when a scholarship defines no criteria at all.
pub const NO_CRITERIA_PERCENTAGE: u8 = 50;

/// Shape of the comparison a check performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CriterionType {
    Range,
    Threshold,
    Membership,
    Declaration,
    Requirement,
}

/// One pass/fail evaluation of an applicant attribute against a scholarship constraint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EligibilityCheck {
    pub criterion: String,
    pub criterion_type: CriterionType,
    pub passed: bool,
    pub applicant_value: String,
    pub required_value: String,
    pub weight: f64,
}

/// Ordered checklist plus the aggregate verdict.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EligibilityResult {
    pub checks: Vec<EligibilityCheck>,
    pub passed_count: usize,
    pub total_count: usize,
    pub percentage: u8,
    pub passed_all: bool,
}

impl EligibilityResult {
    pub fn from_checks(checks: Vec<EligibilityCheck>) -> Self {
        let total_count = checks.len();
        let passed_count = checks.iter().filter(|check| check.passed).count();

        let percentage = if total_count == 0 {
            NO_CRITERIA_PERCENTAGE
        } else {
            ((passed_count as f64 / total_count as f64) * 100.0).round() as u8
        };

        Self {
            passed_all: passed_count == total_count,
            checks,
            passed_count,
            total_count,
            percentage,
        }
    }

    /// Aggregate percentage on the unit interval, as consumed by the regression.
    pub fn score(&self) -> f64 {
        f64::from(self.percentage) / 100.0
    }

    pub fn failed_criteria(&self) -> Vec<String> {
        self.checks
            .iter()
            .filter(|check| !check.passed)
            .map(|check| check.criterion.clone())
            .collect()
    }
}

/// Stateless screener applying hard scholarship rules to an applicant.
#[derive(Debug, Clone, Copy, Default)]
pub struct EligibilityEngine;

impl EligibilityEngine {
    pub fn new() -> Self {
        Self
    }

    pub fn evaluate(
        &self,
        applicant: &ApplicantProfile,
        criteria: &ScholarshipCriteria,
    ) -> EligibilityResult {
        EligibilityResult::from_checks(rules::collect_checks(applicant, criteria))
    }
}
