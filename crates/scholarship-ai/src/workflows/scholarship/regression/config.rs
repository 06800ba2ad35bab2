use serde::{Deserialize, Serialize};

use super::RegressionError;

pub const DEFAULT_MIN_SAMPLES: usize = 30;

/// Hyper-parameters for a gradient-descent training run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingConfig {
    pub learning_rate: f64,
    pub epochs: usize,
    pub l2_coefficient: f64,
    /// Share of the shuffled samples used for fitting; the rest is held out.
    pub split_fraction: f64,
    pub min_samples: usize,
    pub convergence_tolerance: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            learning_rate: 0.1,
            epochs: 1000,
            l2_coefficient: 0.01,
            split_fraction: 0.8,
            min_samples: DEFAULT_MIN_SAMPLES,
            convergence_tolerance: 1e-6,
            seed: None,
        }
    }
}

impl TrainingConfig {
    pub fn validate(&self) -> Result<(), RegressionError> {
        if !self.learning_rate.is_finite() || self.learning_rate <= 0.0 {
            return Err(RegressionError::InvalidConfig(format!(
                "learning rate must be positive, got {}",
                self.learning_rate
            )));
        }
        if self.epochs == 0 {
            return Err(RegressionError::InvalidConfig(
                "epochs must be at least 1".to_string(),
            ));
        }
        if !self.l2_coefficient.is_finite() || self.l2_coefficient < 0.0 {
            return Err(RegressionError::InvalidConfig(format!(
                "L2 coefficient must be non-negative, got {}",
                self.l2_coefficient
            )));
        }
        if !(self.split_fraction > 0.0 && self.split_fraction <= 1.0) {
            return Err(RegressionError::InvalidConfig(format!(
                "split fraction must be in (0, 1], got {}",
                self.split_fraction
            )));
        }
        if !self.convergence_tolerance.is_finite() || self.convergence_tolerance < 0.0 {
            return Err(RegressionError::InvalidConfig(format!(
                "convergence tolerance must be non-negative, got {}",
                self.convergence_tolerance
            )));
        }
        Ok(())
    }
}
