//! PneumoNet batch evaluation.
//!
//! Scores a labeled chest X-ray set with a trained checkpoint and writes
//! metrics, plots, and reports to the output directory.
//!
//! ## Usage
//!
//! ```bash
//! # Evaluate with explicit paths
//! cargo run --bin evaluate -- --images data/images --manifest data/labels.csv --model models/pneumonet.mpk
//!
//! # Load settings from a JSON config, overriding the output directory
//! cargo run --bin evaluate -- --config eval.json --output runs/today
//! ```

use std::{fs, path::PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use pneumonet_burn::{evaluate, load_checkpoint, EvalConfig, PneumoNetConfig};
use pneumonet_cli::{create_device, get_backend_name, SelectedBackend};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the evaluation image directory
    #[arg(long)]
    images: Option<PathBuf>,

    /// Path to the manifest CSV with `image` and `label` columns
    #[arg(long)]
    manifest: Option<PathBuf>,

    /// Path to the trained model checkpoint (.mpk)
    #[arg(short, long)]
    model: Option<PathBuf>,

    /// Output directory for results
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Number of images per forward pass
    #[arg(long)]
    batch_size: Option<usize>,

    /// Square input resolution fed to the model
    #[arg(long)]
    image_size: Option<u32>,

    /// Decision threshold on the sigmoid probability (0.0-1.0)
    #[arg(short, long)]
    threshold: Option<f64>,

    /// Configuration file path
    #[arg(short, long)]
    config: Option<PathBuf>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Load configuration
    let mut config = if let Some(config_path) = &args.config {
        let config_str = fs::read_to_string(config_path)
            .with_context(|| format!("Failed to read config file: {}", config_path.display()))?;
        serde_json::from_str::<EvalConfig>(&config_str)
            .with_context(|| format!("Failed to parse config file: {}", config_path.display()))?
    } else {
        EvalConfig::default()
    };

    // Apply command line overrides
    if let Some(images) = args.images {
        config.image_dir = images;
    }
    if let Some(manifest) = args.manifest {
        config.manifest_path = manifest;
    }
    if let Some(model) = args.model {
        config.checkpoint_path = model;
    }
    if let Some(output) = args.output {
        config.output_dir = output;
    }
    if let Some(batch_size) = args.batch_size {
        config.batch_size = batch_size;
    }
    if let Some(image_size) = args.image_size {
        config.image_size = image_size;
    }
    if let Some(threshold) = args.threshold {
        config.threshold = threshold;
    }

    let device = create_device();
    println!("Using backend: {}", get_backend_name());
    println!("Model: {}", config.checkpoint_path.display());
    println!();

    println!("Loading model...");
    let model = load_checkpoint::<SelectedBackend>(
        &PneumoNetConfig::new(),
        &config.checkpoint_path,
        &device,
    )?;

    let report = evaluate(&model, &config, &device)?;

    println!();
    println!("{}", "=".repeat(60));
    println!("RESULTS");
    println!("{}", "=".repeat(60));
    println!("Accuracy:  {:.4}", report.accuracy);
    println!("Precision: {:.4}", report.precision);
    println!("Recall:    {:.4}", report.recall);
    println!("F1-Score:  {:.4}", report.f1_score);
    match report.roc_auc {
        Some(auc) => println!("ROC-AUC:   {auc:.4}"),
        None => println!("ROC-AUC:   undefined (single-class sample set)"),
    }
    match report.pr_auc {
        Some(auc) => println!("PR-AUC:    {auc:.4}"),
        None => println!("PR-AUC:    undefined (no positive samples)"),
    }
    println!(
        "Samples:   {} ({} positive, {} negative)",
        report.total_samples, report.positive_samples, report.negative_samples
    );

    Ok(())
}
