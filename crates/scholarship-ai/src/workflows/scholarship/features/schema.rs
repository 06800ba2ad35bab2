use std::fmt;
use std::str::FromStr;

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

pub const FEATURE_COUNT: usize = 15;

/// The single feature schema shared by extraction, training, inference and stored models.
///
/// Declaration order is the canonical vector order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FeatureName {
    GwaScore,
    YearLevelMatch,
    IncomeMatch,
    StBracketMatch,
    CollegeMatch,
    CourseMatch,
    CitizenshipMatch,
    DocumentCompleteness,
    ApplicationTiming,
    EligibilityScore,
    AcademicStrength,
    FinancialNeed,
    ProgramFit,
    ApplicationQuality,
    OverallFit,
}

impl FeatureName {
    pub const ALL: [FeatureName; FEATURE_COUNT] = [
        FeatureName::GwaScore,
        FeatureName::YearLevelMatch,
        FeatureName::IncomeMatch,
        FeatureName::StBracketMatch,
        FeatureName::CollegeMatch,
        FeatureName::CourseMatch,
        FeatureName::CitizenshipMatch,
        FeatureName::DocumentCompleteness,
        FeatureName::ApplicationTiming,
        FeatureName::EligibilityScore,
        FeatureName::AcademicStrength,
        FeatureName::FinancialNeed,
        FeatureName::ProgramFit,
        FeatureName::ApplicationQuality,
        FeatureName::OverallFit,
    ];

    pub const fn index(self) -> usize {
        self as usize
    }

    pub const fn label(self) -> &'static str {
        match self {
            FeatureName::GwaScore => "gwaScore",
            FeatureName::YearLevelMatch => "yearLevelMatch",
            FeatureName::IncomeMatch => "incomeMatch",
            FeatureName::StBracketMatch => "stBracketMatch",
            FeatureName::CollegeMatch => "collegeMatch",
            FeatureName::CourseMatch => "courseMatch",
            FeatureName::CitizenshipMatch => "citizenshipMatch",
            FeatureName::DocumentCompleteness => "documentCompleteness",
            FeatureName::ApplicationTiming => "applicationTiming",
            FeatureName::EligibilityScore => "eligibilityScore",
            FeatureName::AcademicStrength => "academicStrength",
            FeatureName::FinancialNeed => "financialNeed",
            FeatureName::ProgramFit => "programFit",
            FeatureName::ApplicationQuality => "applicationQuality",
            FeatureName::OverallFit => "overallFit",
        }
    }

    /// Derived features are fixed combinations of the base features.
    pub const fn is_interaction(self) -> bool {
        matches!(
            self,
            FeatureName::AcademicStrength
                | FeatureName::FinancialNeed
                | FeatureName::ProgramFit
                | FeatureName::ApplicationQuality
                | FeatureName::OverallFit
        )
    }
}

impl fmt::Display for FeatureName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown feature '{0}'")]
pub struct UnknownFeature(pub String);

impl FromStr for FeatureName {
    type Err = UnknownFeature;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        FeatureName::ALL
            .into_iter()
            .find(|feature| feature.label() == value.trim())
            .ok_or_else(|| UnknownFeature(value.to_string()))
    }
}

/// Fixed-schema numeric representation of an (applicant, scholarship) pair.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FeatureVector {
    values: [f64; FEATURE_COUNT],
}

impl FeatureVector {
    pub fn from_fn(mut value_of: impl FnMut(FeatureName) -> f64) -> Self {
        let mut values = [0.0; FEATURE_COUNT];
        for feature in FeatureName::ALL {
            values[feature.index()] = value_of(feature);
        }
        Self { values }
    }

    pub fn get(&self, feature: FeatureName) -> f64 {
        self.values[feature.index()]
    }

    pub fn set(&mut self, feature: FeatureName, value: f64) {
        self.values[feature.index()] = value;
    }

    pub fn values(&self) -> &[f64; FEATURE_COUNT] {
        &self.values
    }

    pub fn iter(&self) -> impl Iterator<Item = (FeatureName, f64)> + '_ {
        FeatureName::ALL
            .into_iter()
            .map(move |feature| (feature, self.values[feature.index()]))
    }
}

impl Serialize for FeatureVector {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(FEATURE_COUNT))?;
        for (feature, value) in self.iter() {
            map.serialize_entry(feature.label(), &value)?;
        }
        map.end()
    }
}
