//! Binary confusion matrix and the scalar metrics derived from it.

use crate::error::{PneumoNetError, PneumoNetResult};

/// Confusion matrix for binary classification.
///
/// Class 1 (pneumonia) is the positive class: `tp` counts samples that are
/// positive and predicted positive, `fp` negatives predicted positive, and
/// so on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfusionMatrix {
    /// Negatives predicted negative.
    pub tn: u64,
    /// Negatives predicted positive.
    pub fp: u64,
    /// Positives predicted negative.
    pub fn_: u64,
    /// Positives predicted positive.
    pub tp: u64,
}

impl ConfusionMatrix {
    /// Build a confusion matrix from ground-truth and predicted labels.
    ///
    /// # Errors
    ///
    /// Returns a dataset error if the slices are empty or have different
    /// lengths.
    pub fn from_labels(actual: &[u8], predicted: &[u8]) -> PneumoNetResult<Self> {
        if actual.is_empty() {
            return Err(PneumoNetError::Dataset {
                message: "cannot build a confusion matrix from zero samples".to_owned(),
            });
        }
        if actual.len() != predicted.len() {
            return Err(PneumoNetError::Dataset {
                message: format!(
                    "actual length {} != predicted length {}",
                    actual.len(),
                    predicted.len()
                ),
            });
        }

        let mut cm = Self {
            tn: 0,
            fp: 0,
            fn_: 0,
            tp: 0,
        };
        for (&a, &p) in actual.iter().zip(predicted.iter()) {
            match (a, p) {
                (0, 0) => cm.tn += 1,
                (0, _) => cm.fp += 1,
                (_, 0) => cm.fn_ += 1,
                _ => cm.tp += 1,
            }
        }
        Ok(cm)
    }

    /// Total number of samples.
    pub fn total(&self) -> u64 {
        self.tn + self.fp + self.fn_ + self.tp
    }

    /// Number of ground-truth samples of the given class.
    pub fn support(&self, class: u8) -> u64 {
        if class == 0 {
            self.tn + self.fp
        } else {
            self.fn_ + self.tp
        }
    }

    /// Overall accuracy: `(TP + TN) / total`.
    pub fn accuracy(&self) -> f64 {
        let total = self.total();
        if total == 0 {
            return 0.0;
        }
        (self.tp + self.tn) as f64 / total as f64
    }

    /// Precision for the given class. Returns 0.0 when the class was never
    /// predicted (zero denominator).
    pub fn precision(&self, class: u8) -> f64 {
        let (hits, misses) = if class == 0 {
            (self.tn, self.fn_)
        } else {
            (self.tp, self.fp)
        };
        let denom = hits + misses;
        if denom == 0 {
            0.0
        } else {
            hits as f64 / denom as f64
        }
    }

    /// Recall for the given class. Returns 0.0 when the class has no
    /// ground-truth samples (zero denominator).
    pub fn recall(&self, class: u8) -> f64 {
        let hits = if class == 0 { self.tn } else { self.tp };
        let denom = self.support(class);
        if denom == 0 {
            0.0
        } else {
            hits as f64 / denom as f64
        }
    }

    /// F1 score for the given class: harmonic mean of precision and recall.
    /// Returns 0.0 when both are 0.
    pub fn f1(&self, class: u8) -> f64 {
        let p = self.precision(class);
        let r = self.recall(class);
        if p + r == 0.0 {
            0.0
        } else {
            2.0 * p * r / (p + r)
        }
    }
}
