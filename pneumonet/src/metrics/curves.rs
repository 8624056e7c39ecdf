//! ROC and precision-recall curves with trapezoidal AUC.
//!
//! Both curves sweep the classification threshold over the distinct
//! probabilities present, in descending order, accumulating tied scores in
//! one step. A curve is undefined (`None`) when the sample set lacks the
//! class structure it needs: ROC needs at least one positive and one
//! negative, PR needs at least one positive.

/// A single point on the ROC curve.
#[derive(Debug, Clone)]
pub struct RocPoint {
    /// Score threshold at which this point is computed.
    pub threshold: f64,
    /// False positive rate: FP / (FP + TN).
    pub fpr: f64,
    /// True positive rate (recall): TP / (TP + FN).
    pub tpr: f64,
}

/// ROC curve with its area under the curve.
#[derive(Debug, Clone)]
pub struct RocCurve {
    /// Points on the curve, from (0, 0) to (1, 1).
    pub points: Vec<RocPoint>,
    /// Area under the curve (trapezoidal rule).
    pub auc: f64,
}

/// A single point on the precision-recall curve.
#[derive(Debug, Clone)]
pub struct PrPoint {
    /// Score threshold at which this point is computed.
    pub threshold: f64,
    /// Precision: TP / (TP + FP).
    pub precision: f64,
    /// Recall: TP / (TP + FN).
    pub recall: f64,
}

/// Precision-recall curve with its area under the curve.
#[derive(Debug, Clone)]
pub struct PrCurve {
    /// Points on the curve, starting at (recall 0, precision 1).
    pub points: Vec<PrPoint>,
    /// Area under the curve (trapezoidal rule).
    pub auc: f64,
}

/// Indices sorted by descending score; ties keep negatives first so tied
/// scores are scored pessimistically.
fn sorted_indices(probabilities: &[f64], labels: &[u8]) -> Vec<usize> {
    let mut indices: Vec<usize> = (0..probabilities.len()).collect();
    indices.sort_by(|&a, &b| {
        probabilities[b]
            .partial_cmp(&probabilities[a])
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| labels[a].cmp(&labels[b]))
    });
    indices
}

/// Compute the ROC curve from predicted probabilities and binary labels.
///
/// Returns `None` for degenerate input: empty, mismatched lengths, or a
/// single-class label set (the false/true positive rate has a zero
/// denominator and the curve is undefined).
pub fn roc_curve(probabilities: &[f64], labels: &[u8]) -> Option<RocCurve> {
    if probabilities.is_empty() || probabilities.len() != labels.len() {
        return None;
    }
    let total_pos = labels.iter().filter(|&&l| l != 0).count();
    let total_neg = labels.len() - total_pos;
    if total_pos == 0 || total_neg == 0 {
        return None;
    }

    let indices = sorted_indices(probabilities, labels);
    let p = total_pos as f64;
    let n = total_neg as f64;

    // Start at the origin: threshold above every score, nothing predicted
    // positive.
    let mut points = vec![RocPoint {
        threshold: f64::INFINITY,
        fpr: 0.0,
        tpr: 0.0,
    }];

    let mut tp = 0u64;
    let mut fp = 0u64;
    let mut i = 0;
    while i < indices.len() {
        let current = probabilities[indices[i]];
        while i < indices.len() && probabilities[indices[i]] == current {
            if labels[indices[i]] != 0 {
                tp += 1;
            } else {
                fp += 1;
            }
            i += 1;
        }
        points.push(RocPoint {
            threshold: current,
            fpr: fp as f64 / n,
            tpr: tp as f64 / p,
        });
    }

    let auc = trapezoidal_auc(
        points.iter().map(|pt| (pt.fpr, pt.tpr)).collect::<Vec<_>>(),
    );
    Some(RocCurve { points, auc })
}

/// Compute the precision-recall curve from predicted probabilities and
/// binary labels.
///
/// Returns `None` for degenerate input: empty, mismatched lengths, or no
/// positive samples (recall has a zero denominator).
pub fn pr_curve(probabilities: &[f64], labels: &[u8]) -> Option<PrCurve> {
    if probabilities.is_empty() || probabilities.len() != labels.len() {
        return None;
    }
    let total_pos = labels.iter().filter(|&&l| l != 0).count();
    if total_pos == 0 {
        return None;
    }

    let indices = sorted_indices(probabilities, labels);
    let p = total_pos as f64;

    let mut points = vec![PrPoint {
        threshold: f64::INFINITY,
        precision: 1.0,
        recall: 0.0,
    }];

    let mut tp = 0u64;
    let mut fp = 0u64;
    let mut i = 0;
    while i < indices.len() {
        let current = probabilities[indices[i]];
        while i < indices.len() && probabilities[indices[i]] == current {
            if labels[indices[i]] != 0 {
                tp += 1;
            } else {
                fp += 1;
            }
            i += 1;
        }
        points.push(PrPoint {
            threshold: current,
            precision: tp as f64 / (tp + fp) as f64,
            recall: tp as f64 / p,
        });
    }

    let auc = trapezoidal_auc(
        points
            .iter()
            .map(|pt| (pt.recall, pt.precision))
            .collect::<Vec<_>>(),
    );
    Some(PrCurve { points, auc })
}

/// Trapezoidal rule over consecutive (x, y) points.
fn trapezoidal_auc(points: Vec<(f64, f64)>) -> f64 {
    let mut auc = 0.0;
    for pair in points.windows(2) {
        let (x0, y0) = pair[0];
        let (x1, y1) = pair[1];
        auc += (x1 - x0).abs() * (y1 + y0) / 2.0;
    }
    auc
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roc_perfect_separation() {
        let probs = [0.9, 0.8, 0.3, 0.1];
        let labels = [1, 1, 0, 0];
        let roc = roc_curve(&probs, &labels).unwrap();
        assert!((roc.auc - 1.0).abs() < 1e-12);
    }

    #[test]
    fn roc_inverted_separation() {
        let probs = [0.1, 0.2, 0.8, 0.9];
        let labels = [1, 1, 0, 0];
        let roc = roc_curve(&probs, &labels).unwrap();
        assert!(roc.auc.abs() < 1e-12);
    }

    #[test]
    fn roc_known_curve() {
        // Sorted: (0.9,1), (0.7,0), (0.5,1), (0.3,0) -> AUC 0.75
        let probs = [0.9, 0.7, 0.5, 0.3];
        let labels = [1, 0, 1, 0];
        let roc = roc_curve(&probs, &labels).unwrap();
        assert!((roc.auc - 0.75).abs() < 1e-12);

        let first = &roc.points[0];
        assert!((first.fpr - 0.0).abs() < 1e-12);
        assert!((first.tpr - 0.0).abs() < 1e-12);
        let last = roc.points.last().unwrap();
        assert!((last.fpr - 1.0).abs() < 1e-12);
        assert!((last.tpr - 1.0).abs() < 1e-12);
    }

    #[test]
    fn constant_classifier_has_half_auc() {
        // Every sample gets the same probability: the curve is the single
        // segment (0,0) -> (1,1), whose trapezoid is exactly 0.5.
        let probs = [0.7, 0.7, 0.7, 0.7];
        let labels = [1, 0, 1, 0];
        let roc = roc_curve(&probs, &labels).unwrap();
        assert_eq!(roc.points.len(), 2);
        assert!((roc.auc - 0.5).abs() < 1e-12);
    }

    #[test]
    fn roc_single_class_is_undefined() {
        assert!(roc_curve(&[0.9, 0.8], &[1, 1]).is_none());
        assert!(roc_curve(&[0.1, 0.2], &[0, 0]).is_none());
        assert!(roc_curve(&[], &[]).is_none());
    }

    #[test]
    fn pr_perfect_separation() {
        let probs = [0.9, 0.8, 0.3, 0.1];
        let labels = [1, 1, 0, 0];
        let pr = pr_curve(&probs, &labels).unwrap();
        assert!((pr.auc - 1.0).abs() < 1e-12);
    }

    #[test]
    fn pr_known_points() {
        // Sorted: (0.9,1), (0.7,0), (0.5,1), (0.3,0)
        // At 0.9: P=1.0, R=0.5
        let probs = [0.9, 0.7, 0.5, 0.3];
        let labels = [1, 0, 1, 0];
        let pr = pr_curve(&probs, &labels).unwrap();
        let p1 = &pr.points[1];
        assert!((p1.precision - 1.0).abs() < 1e-12);
        assert!((p1.recall - 0.5).abs() < 1e-12);
    }

    #[test]
    fn pr_no_positives_is_undefined() {
        assert!(pr_curve(&[0.5, 0.3], &[0, 0]).is_none());
    }

    #[test]
    fn pr_all_positives_is_defined() {
        // Precision is 1.0 at every threshold when everything is positive.
        let probs = [0.9, 0.8, 0.7];
        let labels = [1, 1, 1];
        let pr = pr_curve(&probs, &labels).unwrap();
        assert!((pr.auc - 1.0).abs() < 1e-12);
    }
}
