//! Binary-classification metrics for the evaluation pipeline.
//!
//! Provides the confusion matrix with the derived scalar metrics, ROC and
//! precision-recall curves with trapezoidal AUC, and the aggregate
//! [`MetricsReport`] written at the end of a run.

mod confusion;
mod curves;
mod summary;

pub use confusion::ConfusionMatrix;
pub use curves::{pr_curve, roc_curve, PrCurve, PrPoint, RocCurve, RocPoint};
pub use summary::MetricsReport;
