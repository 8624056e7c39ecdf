//! Text, JSON, and CSV report writers.
//!
//! All writers are deterministic: the same predictions produce
//! byte-identical files across runs.

use std::io::Write;
use std::path::Path;

use crate::error::PneumoNetResult;
use crate::evaluation::Prediction;
use crate::metrics::{ConfusionMatrix, MetricsReport};

/// Class display names, indexed by label.
pub const CLASS_NAMES: [&str; 2] = ["Normal", "Pneumonia"];

/// Write the plain-text classification report with per-class precision,
/// recall, F1, and support.
pub fn write_classification_report(cm: &ConfusionMatrix, path: &Path) -> PneumoNetResult<()> {
    let mut out = String::new();
    out.push_str("Classification Report\n");
    out.push_str(&"=".repeat(60));
    out.push_str("\n\n");
    out.push_str(&format!(
        "{:>12} {:>10} {:>10} {:>10} {:>10}\n\n",
        "", "precision", "recall", "f1-score", "support"
    ));

    for class in 0..2u8 {
        out.push_str(&format!(
            "{:>12} {:>10.4} {:>10.4} {:>10.4} {:>10}\n",
            CLASS_NAMES[class as usize],
            cm.precision(class),
            cm.recall(class),
            cm.f1(class),
            cm.support(class)
        ));
    }

    out.push_str(&format!(
        "\n{:>12} {:>10} {:>10} {:>10.4} {:>10}\n",
        "accuracy",
        "",
        "",
        cm.accuracy(),
        cm.total()
    ));

    let mut file = std::fs::File::create(path)?;
    file.write_all(out.as_bytes())?;
    Ok(())
}

/// Write the metrics report as pretty-printed JSON.
pub fn write_metrics_json(report: &MetricsReport, path: &Path) -> PneumoNetResult<()> {
    let json = serde_json::to_string_pretty(report)?;
    let mut file = std::fs::File::create(path)?;
    file.write_all(json.as_bytes())?;
    file.write_all(b"\n")?;
    Ok(())
}

/// Write the row-per-sample predictions CSV, in processing order.
pub fn write_predictions_csv(predictions: &[Prediction], path: &Path) -> PneumoNetResult<()> {
    let mut writer = csv::Writer::from_path(path)?;
    for prediction in predictions {
        writer.serialize(prediction)?;
    }
    writer.flush()?;
    Ok(())
}
