//! Batch evaluation pipeline.
//!
//! One pass over the manifest in fixed-size batches: preprocess, forward
//! through the classifier, sigmoid, threshold. The accumulated predictions
//! drive the metrics report and the seven output artifacts.

use std::path::{Path, PathBuf};

use burn::{nn::Sigmoid, tensor::backend::Backend};
use serde::{Deserialize, Serialize};

use crate::{
    classifier::BinaryClassifier,
    dataset::{XrayBatcher, XrayDataset},
    error::{PneumoNetError, PneumoNetResult},
    metrics::{pr_curve, roc_curve, MetricsReport},
    plot, report,
};

use burn::data::dataloader::batcher::Batcher;

/// Default evaluation batch size.
pub const DEFAULT_BATCH_SIZE: usize = 32;
/// Default input resolution fed to the classifier.
pub const DEFAULT_IMAGE_SIZE: u32 = 224;
/// Default decision threshold on the sigmoid probability.
pub const DEFAULT_THRESHOLD: f64 = 0.5;

/// One scored sample: the manifest entry plus the model output.
#[derive(Debug, Clone, Serialize)]
pub struct Prediction {
    /// Manifest filename.
    pub filename: String,
    /// Ground-truth label.
    pub true_label: u8,
    /// Thresholded prediction.
    pub predicted_label: u8,
    /// Sigmoid probability of the positive class.
    pub probability: f64,
    /// Whether predicted and true label agree.
    pub correct: bool,
}

/// Evaluation run configuration.
///
/// Loadable from a JSON file, with every field individually defaultable so
/// partial files merge with the defaults; the CLI applies its overrides on
/// top.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EvalConfig {
    /// Directory holding the evaluation images.
    pub image_dir: PathBuf,
    /// CSV manifest with `image` and `label` columns.
    pub manifest_path: PathBuf,
    /// Trained model checkpoint (.mpk).
    pub checkpoint_path: PathBuf,
    /// Directory the artifacts are written to, created if absent.
    pub output_dir: PathBuf,
    /// Number of images per forward pass.
    pub batch_size: usize,
    /// Square input resolution.
    pub image_size: u32,
    /// Decision threshold on the probability.
    pub threshold: f64,
}

impl Default for EvalConfig {
    fn default() -> Self {
        Self {
            image_dir: PathBuf::from("data/images"),
            manifest_path: PathBuf::from("data/labels.csv"),
            checkpoint_path: PathBuf::from("models/pneumonet.mpk"),
            output_dir: PathBuf::from("evaluation_results"),
            batch_size: DEFAULT_BATCH_SIZE,
            image_size: DEFAULT_IMAGE_SIZE,
            threshold: DEFAULT_THRESHOLD,
        }
    }
}

/// Run the full evaluation: score every manifest sample, compute the
/// metrics report, and write all artifacts to the output directory.
///
/// Individual decode or inference failures abort the whole run; there is
/// no skip-and-continue policy.
pub fn evaluate<B: Backend, M: BinaryClassifier<B>>(
    model: &M,
    config: &EvalConfig,
    device: &B::Device,
) -> PneumoNetResult<MetricsReport> {
    let dataset = XrayDataset::<B>::new(
        &config.image_dir,
        &config.manifest_path,
        config.image_size,
        device,
    )?;

    let predictions = run_inference(model, &dataset, config, device)?;

    let actual: Vec<u8> = predictions.iter().map(|p| p.true_label).collect();
    let predicted: Vec<u8> = predictions.iter().map(|p| p.predicted_label).collect();
    let probabilities: Vec<f64> = predictions.iter().map(|p| p.probability).collect();
    let report = MetricsReport::compute(&actual, &predicted, &probabilities)?;

    write_artifacts(&predictions, &report, &config.output_dir)?;

    Ok(report)
}

/// Score every sample in manifest order, batched for throughput.
pub fn run_inference<B: Backend, M: BinaryClassifier<B>>(
    model: &M,
    dataset: &XrayDataset<B>,
    config: &EvalConfig,
    device: &B::Device,
) -> PneumoNetResult<Vec<Prediction>> {
    let batcher = XrayBatcher::<B>::new();
    let sigmoid = Sigmoid::new();
    let indices: Vec<usize> = (0..dataset.len()).collect();

    let mut predictions = Vec::with_capacity(dataset.len());
    for chunk in indices.chunks(config.batch_size.max(1)) {
        let mut items = Vec::with_capacity(chunk.len());
        for &index in chunk {
            items.push(dataset.load(index)?);
        }
        let batch = batcher.batch(items, device);

        let logits = model.forward(batch.images);
        let probabilities = sigmoid.forward(logits);
        let probabilities: Vec<f32> = probabilities
            .into_data()
            .convert::<f32>()
            .to_vec()
            .map_err(|e| PneumoNetError::InferenceFailed {
                reason: format!("failed to read probabilities from device: {e:?}"),
            })?;

        for ((probability, label), filename) in probabilities
            .into_iter()
            .zip(batch.labels)
            .zip(batch.filenames)
        {
            let probability = f64::from(probability);
            let predicted_label = u8::from(probability >= config.threshold);
            predictions.push(Prediction {
                filename,
                true_label: label,
                predicted_label,
                probability,
                correct: predicted_label == label,
            });
        }
    }

    Ok(predictions)
}

/// Write the seven evaluation artifacts into `output_dir`, creating it if
/// absent.
pub fn write_artifacts(
    predictions: &[Prediction],
    metrics: &MetricsReport,
    output_dir: &Path,
) -> PneumoNetResult<()> {
    std::fs::create_dir_all(output_dir)?;

    let actual: Vec<u8> = predictions.iter().map(|p| p.true_label).collect();
    let predicted: Vec<u8> = predictions.iter().map(|p| p.predicted_label).collect();
    let probabilities: Vec<f64> = predictions.iter().map(|p| p.probability).collect();

    let cm = MetricsReport::confusion_matrix(&actual, &predicted)?;
    let roc = roc_curve(&probabilities, &actual);
    let pr = pr_curve(&probabilities, &actual);

    plot::confusion_matrix_plot(&cm, &output_dir.join("confusion_matrix.png"))?;
    plot::roc_curve_plot(roc.as_ref(), &output_dir.join("roc_curve.png"))?;
    plot::pr_curve_plot(pr.as_ref(), &output_dir.join("precision_recall_curve.png"))?;
    plot::metrics_bar_chart(metrics, &output_dir.join("metrics_bar_chart.png"))?;
    report::write_classification_report(&cm, &output_dir.join("classification_report.txt"))?;
    report::write_metrics_json(metrics, &output_dir.join("metrics.json"))?;
    report::write_predictions_csv(predictions, &output_dir.join("predictions.csv"))?;

    println!("All results saved to: {}", output_dir.display());
    Ok(())
}
