use serde::{Deserialize, Serialize};

/// Decision threshold separating predicted approvals from rejections.
pub(crate) const DECISION_THRESHOLD: f64 = 0.5;

/// True/false positive/negative counts on the held-out set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfusionMatrix {
    pub true_positives: usize,
    pub true_negatives: usize,
    pub false_positives: usize,
    pub false_negatives: usize,
}

impl ConfusionMatrix {
    pub(crate) fn record(&mut self, probability: f64, approved: bool) {
        match (probability >= DECISION_THRESHOLD, approved) {
            (true, true) => self.true_positives += 1,
            (false, false) => self.true_negatives += 1,
            (true, false) => self.false_positives += 1,
            (false, true) => self.false_negatives += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.true_positives + self.true_negatives + self.false_positives + self.false_negatives
    }

    pub fn correct(&self) -> usize {
        self.true_positives + self.true_negatives
    }

    /// `correct() / total()` as a float; equals the integer ratio only up to rounding.
    pub fn accuracy(&self) -> f64 {
        ratio(self.correct(), self.total())
    }

    pub fn precision(&self) -> f64 {
        ratio(
            self.true_positives,
            self.true_positives + self.false_positives,
        )
    }

    pub fn recall(&self) -> f64 {
        ratio(
            self.true_positives,
            self.true_positives + self.false_negatives,
        )
    }

    pub fn f1_score(&self) -> f64 {
        let precision = self.precision();
        let recall = self.recall();
        if precision + recall == 0.0 {
            0.0
        } else {
            2.0 * precision * recall / (precision + recall)
        }
    }
}

/// Held-out evaluation of a completed training run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelMetrics {
    pub accuracy: f64,
    pub precision: f64,
    pub recall: f64,
    pub f1_score: f64,
    pub confusion_matrix: ConfusionMatrix,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auc_roc: Option<f64>,
    pub final_loss: f64,
    pub convergence_epoch: usize,
    pub test_samples: usize,
}

impl ModelMetrics {
    pub(crate) fn from_evaluation(
        scored: &[(f64, bool)],
        final_loss: f64,
        convergence_epoch: usize,
    ) -> Self {
        let mut confusion_matrix = ConfusionMatrix::default();
        for (probability, approved) in scored {
            confusion_matrix.record(*probability, *approved);
        }

        Self {
            accuracy: confusion_matrix.accuracy(),
            precision: confusion_matrix.precision(),
            recall: confusion_matrix.recall(),
            f1_score: confusion_matrix.f1_score(),
            confusion_matrix,
            auc_roc: auc_roc(scored),
            final_loss,
            convergence_epoch,
            test_samples: scored.len(),
        }
    }
}

/// Area under the ROC curve via the rank-sum statistic; `None` unless both classes appear.
pub(crate) fn auc_roc(scored: &[(f64, bool)]) -> Option<f64> {
    let positives = scored.iter().filter(|(_, approved)| *approved).count();
    let negatives = scored.len() - positives;
    if positives == 0 || negatives == 0 {
        return None;
    }

    let mut ranked: Vec<(f64, bool)> = scored.to_vec();
    ranked.sort_by(|left, right| left.0.total_cmp(&right.0));

    let mut positive_rank_sum = 0.0;
    let mut start = 0;
    while start < ranked.len() {
        let mut end = start;
        while end + 1 < ranked.len() && ranked[end + 1].0 == ranked[start].0 {
            end += 1;
        }
        // Tied scores share the mean of their 1-based ranks.
        let mean_rank = (start + end) as f64 / 2.0 + 1.0;
        let tied_positives = ranked[start..=end]
            .iter()
            .filter(|(_, approved)| *approved)
            .count();
        positive_rank_sum += mean_rank * tied_positives as f64;
        start = end + 1;
    }

    let positives = positives as f64;
    let negatives = negatives as f64;
    Some((positive_rank_sum - positives * (positives + 1.0) / 2.0) / (positives * negatives))
}

fn ratio(numerator: usize, denominator: usize) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}
