use approx::assert_relative_eq;

use super::common::*;

use crate::workflows::scholarship::features::{FeatureName, FeatureVector};
use crate::workflows::scholarship::regression::{
    explain, predict, sigmoid, train, ContributionDirection, LabeledSample, RegressionError,
    TrainingConfig,
};

/// Two well separated clusters of `per_class` samples each.
fn clusters(per_class: usize) -> Vec<LabeledSample> {
    let mut samples = Vec::with_capacity(per_class * 2);
    for index in 0..per_class {
        let jitter = (index % 10) as f64 * 0.01;
        samples.push(LabeledSample::new(
            FeatureVector::from_fn(|_| 0.85 + jitter),
            true,
        ));
        samples.push(LabeledSample::new(
            FeatureVector::from_fn(|_| 0.05 + jitter),
            false,
        ));
    }
    samples
}

#[test]
fn sigmoid_stays_strictly_inside_unit_interval() {
    for z in [-1e6, -800.0, -500.0, -30.0, 0.0, 30.0, 500.0, 800.0, 1e6] {
        let p = sigmoid(z);
        assert!(p > 0.0 && p < 1.0, "sigmoid({z}) = {p}");
    }
    assert_relative_eq!(sigmoid(0.0), 0.5);
}

#[test]
fn prediction_is_monotonic_in_positive_weights() {
    let weights = weights(&[(FeatureName::GwaScore, 2.0), (FeatureName::IncomeMatch, -1.0)]);
    let mut previous = 0.0;
    for step in 0..=10 {
        let mut vector = FeatureVector::default();
        vector.set(FeatureName::GwaScore, step as f64 / 10.0);
        vector.set(FeatureName::IncomeMatch, 0.3);
        let p = predict(&weights, -0.5, &vector);
        assert!(p > previous, "step {step} did not increase probability");
        previous = p;
    }
}

#[test]
fn features_without_weights_are_skipped() {
    let weights = weights(&[(FeatureName::GwaScore, 1.0)]);
    let sparse = FeatureVector::from_fn(|feature| {
        if feature == FeatureName::GwaScore {
            0.4
        } else {
            0.0
        }
    });
    let dense = FeatureVector::from_fn(|feature| {
        if feature == FeatureName::GwaScore {
            0.4
        } else {
            1.0
        }
    });
    assert_eq!(predict(&weights, 0.1, &sparse), predict(&weights, 0.1, &dense));
    assert_relative_eq!(predict(&weights, 0.1, &sparse), sigmoid(0.5), epsilon = 1e-12);
}

#[test]
fn explain_orders_by_absolute_contribution() {
    let weights = weights(&[
        (FeatureName::GwaScore, 0.5),
        (FeatureName::IncomeMatch, -3.0),
        (FeatureName::EligibilityScore, 1.0),
    ]);
    let vector = FeatureVector::from_fn(|_| 1.0);

    let contributions = explain(&weights, &vector);
    let order: Vec<FeatureName> = contributions.iter().map(|c| c.feature).collect();
    assert_eq!(
        order,
        vec![
            FeatureName::IncomeMatch,
            FeatureName::EligibilityScore,
            FeatureName::GwaScore
        ]
    );
    assert_eq!(contributions[0].direction, ContributionDirection::Negative);
    assert_eq!(contributions[1].direction, ContributionDirection::Positive);
}

#[test]
fn separable_clusters_reach_high_training_accuracy() {
    let outcome = train(&clusters(50), &seeded_config()).expect("training succeeds");

    assert!(
        outcome.training_stats.train_accuracy >= 0.95,
        "train accuracy {}",
        outcome.training_stats.train_accuracy
    );
    assert_eq!(outcome.training_stats.total_samples, 100);
    assert_eq!(outcome.training_stats.approved_samples, 50);
    assert_eq!(outcome.training_stats.training_samples, 80);
    assert_eq!(outcome.training_stats.test_samples, 20);
    assert_eq!(outcome.loss_history.len(), 1000);
    assert!(outcome.loss_history[999] < outcome.loss_history[0]);
    assert!(outcome.metrics.convergence_epoch >= 2);
    assert!(outcome.metrics.convergence_epoch <= 1000);
}

#[test]
fn clusters_split_on_gwa_alone_are_separated_with_default_epochs() {
    let mut samples = Vec::with_capacity(100);
    for index in 0..50 {
        let jitter = (index % 5) as f64 * 0.01;
        for (gwa_score, approved) in [(0.8 + jitter, true), (0.2 + jitter, false)] {
            let vector = FeatureVector::from_fn(|feature| {
                if feature == FeatureName::GwaScore {
                    gwa_score
                } else {
                    0.5
                }
            });
            samples.push(LabeledSample::new(vector, approved));
        }
    }

    let config = TrainingConfig {
        seed: Some(23),
        ..TrainingConfig::default()
    };
    let outcome = train(&samples, &config).expect("training succeeds");

    assert_eq!(outcome.loss_history.len(), TrainingConfig::default().epochs);
    assert!(
        outcome.training_stats.train_accuracy >= 0.95,
        "train accuracy {}",
        outcome.training_stats.train_accuracy
    );
    assert!(outcome.weights[&FeatureName::GwaScore] > 0.0);
}

#[test]
fn held_out_accuracy_matches_the_confusion_matrix() {
    let outcome = train(&clusters(40), &seeded_config()).expect("training succeeds");
    let metrics = &outcome.metrics;
    let matrix = metrics.confusion_matrix;

    assert_eq!(matrix.total(), metrics.test_samples);
    assert_eq!(
        matrix.correct(),
        matrix.true_positives + matrix.true_negatives
    );
    assert_relative_eq!(
        metrics.accuracy,
        matrix.correct() as f64 / matrix.total() as f64
    );
    if let Some(auc) = metrics.auc_roc {
        assert!((0.0..=1.0).contains(&auc));
    }
}

#[test]
fn seeded_runs_are_reproducible() {
    let samples = clusters(20);
    let first = train(&samples, &seeded_config()).expect("training succeeds");
    let second = train(&samples, &seeded_config()).expect("training succeeds");
    assert_eq!(first.weights, second.weights);
    assert_eq!(first.bias, second.bias);
}

#[test]
fn feature_importance_ranks_by_absolute_weight() {
    let outcome = train(&clusters(20), &seeded_config()).expect("training succeeds");
    let importance = &outcome.feature_importance;

    assert_eq!(importance.len(), FeatureName::ALL.len());
    assert_eq!(importance[0].rank, 1);
    assert!(importance
        .windows(2)
        .all(|pair| pair[0].importance >= pair[1].importance));
}

#[test]
fn rejects_samples_below_the_minimum() {
    let err = train(&clusters(5), &seeded_config()).expect_err("too few samples");
    assert_eq!(
        err,
        RegressionError::InsufficientData {
            required: 30,
            available: 10
        }
    );
}

#[test]
fn reports_divergence_instead_of_returning_weights() {
    let config = TrainingConfig {
        learning_rate: 1e308,
        ..seeded_config()
    };
    let err = train(&clusters(20), &config).expect_err("training diverges");
    assert!(matches!(err, RegressionError::NumericInstability { .. }));
}

#[test]
fn rejects_invalid_hyper_parameters() {
    let config = TrainingConfig {
        epochs: 0,
        ..seeded_config()
    };
    assert!(matches!(
        train(&clusters(20), &config),
        Err(RegressionError::InvalidConfig(_))
    ));
}
