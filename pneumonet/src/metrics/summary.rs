//! Aggregate metrics report for an evaluation run.

use serde::Serialize;

use crate::error::PneumoNetResult;
use crate::metrics::{pr_curve, roc_curve, ConfusionMatrix};

/// Aggregate scalar metrics computed once per evaluation run.
///
/// `roc_auc` and `pr_auc` are `None` (serialized as `null`) when the sample
/// set is single-class and the curve is undefined; the scalar metrics use
/// zero-denominator guards instead of crashing on degenerate input.
#[derive(Debug, Clone, Serialize)]
pub struct MetricsReport {
    /// Fraction of correct predictions.
    pub accuracy: f64,
    /// Positive-class precision: TP / (TP + FP).
    pub precision: f64,
    /// Positive-class recall: TP / (TP + FN).
    pub recall: f64,
    /// Harmonic mean of precision and recall.
    pub f1_score: f64,
    /// Number of evaluated samples.
    pub total_samples: u64,
    /// Number of ground-truth positive samples.
    pub positive_samples: u64,
    /// Number of ground-truth negative samples.
    pub negative_samples: u64,
    /// Area under the ROC curve, `null` when undefined.
    pub roc_auc: Option<f64>,
    /// Area under the precision-recall curve, `null` when undefined.
    pub pr_auc: Option<f64>,
}

impl MetricsReport {
    /// Compute the report from aligned label and probability slices.
    ///
    /// # Errors
    ///
    /// Returns a dataset error if the slices are empty or their lengths
    /// differ.
    pub fn compute(
        actual: &[u8],
        predicted: &[u8],
        probabilities: &[f64],
    ) -> PneumoNetResult<Self> {
        let cm = ConfusionMatrix::from_labels(actual, predicted)?;

        Ok(Self {
            accuracy: cm.accuracy(),
            precision: cm.precision(1),
            recall: cm.recall(1),
            f1_score: cm.f1(1),
            total_samples: cm.total(),
            positive_samples: cm.support(1),
            negative_samples: cm.support(0),
            roc_auc: roc_curve(probabilities, actual).map(|c| c.auc),
            pr_auc: pr_curve(probabilities, actual).map(|c| c.auc),
        })
    }

    /// The confusion matrix backing this report, recomputed from labels.
    pub fn confusion_matrix(actual: &[u8], predicted: &[u8]) -> PneumoNetResult<ConfusionMatrix> {
        ConfusionMatrix::from_labels(actual, predicted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn perfect_two_sample_run() {
        // Manifest [("a.jpg",1), ("b.jpg",0)], probabilities 0.9 and 0.1.
        let actual = [1, 0];
        let predicted = [1, 0];
        let probabilities = [0.9, 0.1];
        let report = MetricsReport::compute(&actual, &predicted, &probabilities).unwrap();
        assert!((report.accuracy - 1.0).abs() < 1e-12);
        assert!((report.precision - 1.0).abs() < 1e-12);
        assert!((report.recall - 1.0).abs() < 1e-12);
        assert!((report.f1_score - 1.0).abs() < 1e-12);
        assert_eq!(report.total_samples, 2);
        assert_eq!(report.positive_samples, 1);
        assert_eq!(report.negative_samples, 1);
        assert!((report.roc_auc.unwrap() - 1.0).abs() < 1e-12);
        assert!((report.pr_auc.unwrap() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn single_class_aucs_are_null() {
        let actual = [1, 1, 1];
        let predicted = [1, 0, 1];
        let probabilities = [0.9, 0.2, 0.8];
        let report = MetricsReport::compute(&actual, &predicted, &probabilities).unwrap();
        assert!(report.roc_auc.is_none());
        // PR is defined when positives exist.
        assert!(report.pr_auc.is_some());

        let json = serde_json::to_string(&report).unwrap();
        assert!(json.contains("\"roc_auc\":null"));
    }

    #[test]
    fn empty_input_is_an_error() {
        assert!(MetricsReport::compute(&[], &[], &[]).is_err());
    }
}
