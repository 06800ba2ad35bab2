use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::super::features::{FeatureName, FeatureVector, FEATURE_COUNT};
use super::config::TrainingConfig;
use super::metrics::{ModelMetrics, DECISION_THRESHOLD};
use super::{sigmoid, LabeledSample, ModelWeights, RegressionError};

const LOG_CLAMP: f64 = 1e-15;
const PROGRESS_INTERVAL: usize = 100;

/// Class balance and split sizes of a training run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingStats {
    pub total_samples: usize,
    pub approved_samples: usize,
    pub rejected_samples: usize,
    pub approval_rate: f64,
    pub training_samples: usize,
    pub test_samples: usize,
    pub train_accuracy: f64,
}

/// Rank of a feature by absolute learned weight.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureImportance {
    pub rank: usize,
    pub feature: FeatureName,
    pub weight: f64,
    pub importance: f64,
}

/// Everything a completed run produces.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainingOutcome {
    pub weights: ModelWeights,
    pub bias: f64,
    pub metrics: ModelMetrics,
    pub training_stats: TrainingStats,
    pub feature_importance: Vec<FeatureImportance>,
    pub loss_history: Vec<f64>,
}

type WeightArray = [f64; FEATURE_COUNT];

/// Fit weights and bias by batch gradient descent, then score the held-out split.
pub fn train(
    samples: &[LabeledSample],
    config: &TrainingConfig,
) -> Result<TrainingOutcome, RegressionError> {
    config.validate()?;

    let required = config.min_samples.max(1);
    if samples.len() < required {
        return Err(RegressionError::InsufficientData {
            required,
            available: samples.len(),
        });
    }

    let mut rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let mut order: Vec<usize> = (0..samples.len()).collect();
    order.shuffle(&mut rng);

    let train_len = split_point(samples.len(), config.split_fraction);
    let (train_indices, test_indices) = order.split_at(train_len);
    let train_set: Vec<&LabeledSample> = train_indices.iter().map(|&i| &samples[i]).collect();
    let test_set: Vec<&LabeledSample> = test_indices.iter().map(|&i| &samples[i]).collect();

    info!(
        samples = samples.len(),
        training = train_set.len(),
        test = test_set.len(),
        epochs = config.epochs,
        "starting logistic regression training"
    );

    let mut weights: WeightArray = [0.0; FEATURE_COUNT];
    let mut bias = 0.0;
    let mut loss_history = Vec::with_capacity(config.epochs);
    let mut convergence_epoch = None;
    let batch = train_set.len() as f64;

    for epoch in 1..=config.epochs {
        let mut weight_gradient: WeightArray = [0.0; FEATURE_COUNT];
        let mut bias_gradient = 0.0;
        let mut log_loss = 0.0;

        for sample in &train_set {
            let x = sample.features.values();
            let y = sample.target();
            let p = score(&weights, bias, &sample.features);
            let error = p - y;

            for (gradient, value) in weight_gradient.iter_mut().zip(x) {
                *gradient += error * value;
            }
            bias_gradient += error;

            let p = p.clamp(LOG_CLAMP, 1.0 - LOG_CLAMP);
            log_loss -= y * p.ln() + (1.0 - y) * (1.0 - p).ln();
        }

        let penalty: f64 = weights.iter().map(|weight| weight * weight).sum();
        let loss = log_loss / batch + 0.5 * config.l2_coefficient * penalty;

        for (weight, gradient) in weights.iter_mut().zip(weight_gradient) {
            *weight -= config.learning_rate * (gradient / batch + config.l2_coefficient * *weight);
        }
        bias -= config.learning_rate * bias_gradient / batch;

        if !loss.is_finite() || !bias.is_finite() || weights.iter().any(|w| !w.is_finite()) {
            return Err(RegressionError::NumericInstability { epoch });
        }

        if convergence_epoch.is_none() {
            if let Some(previous) = loss_history.last() {
                if previous - loss < config.convergence_tolerance {
                    convergence_epoch = Some(epoch);
                }
            }
        }
        loss_history.push(loss);

        if epoch % PROGRESS_INTERVAL == 0 {
            debug!(epoch, loss, "training progress");
        }
    }

    let final_loss = loss_history.last().copied().unwrap_or_default();
    let convergence_epoch = convergence_epoch.unwrap_or(config.epochs);

    let train_scored = score_all(&weights, bias, &train_set);
    let train_accuracy = if train_scored.is_empty() {
        0.0
    } else {
        train_scored
            .iter()
            .filter(|(p, approved)| (*p >= DECISION_THRESHOLD) == *approved)
            .count() as f64
            / train_scored.len() as f64
    };
    let metrics = ModelMetrics::from_evaluation(
        &score_all(&weights, bias, &test_set),
        final_loss,
        convergence_epoch,
    );

    let approved_samples = samples.iter().filter(|sample| sample.approved).count();
    let training_stats = TrainingStats {
        total_samples: samples.len(),
        approved_samples,
        rejected_samples: samples.len() - approved_samples,
        approval_rate: approved_samples as f64 / samples.len() as f64,
        training_samples: train_set.len(),
        test_samples: test_set.len(),
        train_accuracy,
    };

    info!(
        final_loss,
        convergence_epoch,
        accuracy = metrics.accuracy,
        train_accuracy,
        "logistic regression training finished"
    );

    let weights: ModelWeights = FeatureName::ALL
        .into_iter()
        .map(|feature| (feature, weights[feature.index()]))
        .collect();
    let feature_importance = rank_features(&weights);

    Ok(TrainingOutcome {
        weights,
        bias,
        metrics,
        training_stats,
        feature_importance,
        loss_history,
    })
}

/// Features ordered by absolute weight, largest first.
pub(crate) fn rank_features(weights: &ModelWeights) -> Vec<FeatureImportance> {
    let mut ranked: Vec<(FeatureName, f64)> = weights
        .iter()
        .map(|(feature, weight)| (*feature, *weight))
        .collect();
    ranked.sort_by(|left, right| right.1.abs().total_cmp(&left.1.abs()));

    ranked
        .into_iter()
        .enumerate()
        .map(|(position, (feature, weight))| FeatureImportance {
            rank: position + 1,
            feature,
            weight,
            importance: weight.abs(),
        })
        .collect()
}

fn split_point(total: usize, split_fraction: f64) -> usize {
    if total < 2 {
        return total;
    }
    let train = (total as f64 * split_fraction).round() as usize;
    train.clamp(1, total - 1)
}

fn score(weights: &WeightArray, bias: f64, features: &FeatureVector) -> f64 {
    let z: f64 = weights
        .iter()
        .zip(features.values())
        .map(|(weight, value)| weight * value)
        .sum::<f64>()
        + bias;
    sigmoid(z)
}

fn score_all(weights: &WeightArray, bias: f64, samples: &[&LabeledSample]) -> Vec<(f64, bool)> {
    samples
        .iter()
        .map(|sample| (score(weights, bias, &sample.features), sample.approved))
        .collect()
}
