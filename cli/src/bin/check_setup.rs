//! Setup verification.
//!
//! Checks that the local environment is ready for evaluation: the
//! checkpoint is present and loadable, the dataset paths resolve, and the
//! output directory is writable. Exits 0 when every check passes, 1
//! otherwise.
//!
//! ## Usage
//!
//! ```bash
//! cargo run --bin check-setup -- --model models/pneumonet.mpk \
//!     --images data/images --manifest data/labels.csv
//! ```

use std::{path::Path, path::PathBuf, process::ExitCode};

use clap::Parser;
use pneumonet_burn::{load_checkpoint, load_manifest, PneumoNetConfig};
use pneumonet_cli::{create_device, get_backend_name, SelectedBackend};
use walkdir::WalkDir;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the trained model checkpoint (.mpk)
    #[arg(short, long, default_value = "models/pneumonet.mpk")]
    model: PathBuf,

    /// Evaluation image directory (checked when provided)
    #[arg(long)]
    images: Option<PathBuf>,

    /// Manifest CSV (checked when provided)
    #[arg(long)]
    manifest: Option<PathBuf>,

    /// Output directory for evaluation results
    #[arg(short, long, default_value = "evaluation_results")]
    output: PathBuf,
}

fn check_checkpoint_file(path: &Path) -> bool {
    println!("Checking model file...");
    match std::fs::metadata(path) {
        Ok(meta) if meta.is_file() => {
            let size_mb = meta.len() as f64 / (1024.0 * 1024.0);
            println!("  ok: checkpoint found: {} ({size_mb:.1} MB)", path.display());
            true
        }
        _ => {
            println!("  FAILED: checkpoint not found: {}", path.display());
            println!("    -> place the trained .mpk checkpoint at the given path");
            false
        }
    }
}

fn check_model_loading(path: &Path) -> bool {
    println!("\nTesting model loading...");
    let device = create_device();
    match load_checkpoint::<SelectedBackend>(&PneumoNetConfig::new(), path, &device) {
        Ok(_) => {
            println!("  ok: checkpoint loads into the classifier architecture");
            true
        }
        Err(e) => {
            println!("  FAILED: {e}");
            false
        }
    }
}

fn check_image_dir(path: &Path) -> bool {
    println!("\nChecking image directory...");
    if !path.is_dir() {
        println!("  FAILED: image directory not found: {}", path.display());
        println!("    -> pass the directory that holds the evaluation X-ray images");
        return false;
    }

    let image_count = WalkDir::new(path)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|entry| {
            entry.path().is_file()
                && entry
                    .path()
                    .extension()
                    .map(|ext| {
                        matches!(
                            ext.to_string_lossy().to_lowercase().as_str(),
                            "jpg" | "jpeg" | "png" | "bmp" | "tiff" | "webp"
                        )
                    })
                    .unwrap_or(false)
        })
        .count();

    if image_count == 0 {
        println!("  FAILED: no image files in {}", path.display());
        return false;
    }
    println!("  ok: {image_count} image files in {}", path.display());
    true
}

fn check_manifest(path: &Path) -> bool {
    println!("\nChecking manifest...");
    match load_manifest(path) {
        Ok(samples) => {
            println!("  ok: manifest parses ({} rows)", samples.len());
            true
        }
        Err(e) => {
            println!("  FAILED: {e}");
            false
        }
    }
}

fn check_output_dir(path: &Path) -> bool {
    println!("\nChecking output directory...");
    if let Err(e) = std::fs::create_dir_all(path) {
        println!("  FAILED: cannot create {}: {e}", path.display());
        return false;
    }
    let probe = path.join(".write_test");
    match std::fs::write(&probe, b"probe") {
        Ok(()) => {
            let _ = std::fs::remove_file(&probe);
            println!("  ok: {} is writable", path.display());
            true
        }
        Err(e) => {
            println!("  FAILED: {} is not writable: {e}", path.display());
            false
        }
    }
}

fn main() -> ExitCode {
    let args = Args::parse();

    println!("{}", "=".repeat(60));
    println!("PneumoNet Setup Verification");
    println!("{}", "=".repeat(60));
    println!("Backend: {}", get_backend_name());
    println!();

    let mut checks = vec![check_checkpoint_file(&args.model)];
    // Loading only makes sense once the file exists.
    if checks[0] {
        checks.push(check_model_loading(&args.model));
    }
    if let Some(images) = &args.images {
        checks.push(check_image_dir(images));
    }
    if let Some(manifest) = &args.manifest {
        checks.push(check_manifest(manifest));
    }
    checks.push(check_output_dir(&args.output));

    let all_passed = checks.iter().all(|&passed| passed);
    println!("\n{}", "=".repeat(60));
    if all_passed {
        println!("All checks passed. Ready to evaluate:");
        println!("  cargo run --bin evaluate -- --model {}", args.model.display());
        ExitCode::SUCCESS
    } else {
        println!("Some checks failed. Fix the issues above and re-run.");
        ExitCode::FAILURE
    }
}
