//! Evaluation toolkit for a Burn-based pneumonia chest X-ray classifier.
//!
//! The trained model is treated as an external collaborator behind the
//! [`BinaryClassifier`] trait; this crate provides the labeled dataset
//! loading, the batch inference pass, binary-classification metrics
//! (accuracy, precision, recall, F1, ROC-AUC, PR-AUC), and the report and
//! plot artifacts written after a run.

pub mod classifier;
pub mod dataset;
pub mod error;
pub mod evaluation;
pub mod metrics;
pub mod plot;
pub mod report;

pub use classifier::{load_checkpoint, BinaryClassifier, PneumoNet, PneumoNetConfig};
pub use dataset::{
    load_manifest, preprocess_image, Sample, XrayBatch, XrayBatcher, XrayDataset, XrayItem,
    IMAGENET_MEAN, IMAGENET_STD,
};
pub use error::{PneumoNetError, PneumoNetResult};
pub use evaluation::{evaluate, write_artifacts, EvalConfig, Prediction};
pub use metrics::{pr_curve, roc_curve, ConfusionMatrix, MetricsReport, PrCurve, RocCurve};
