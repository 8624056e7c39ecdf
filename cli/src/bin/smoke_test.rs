//! Inference endpoint smoke test.
//!
//! Probes a running PneumoNet HTTP server: hits the health route, then
//! uploads a synthetic chest-X-ray-sized JPEG to the prediction route and
//! checks the response shape. Exits 0 when every probe passes, 1 otherwise.
//!
//! ## Usage
//!
//! ```bash
//! cargo run --bin smoke-test -- --base-url http://localhost:8000
//! ```

use std::{io::Cursor, path::PathBuf, process::ExitCode, time::Duration};

use clap::Parser;
use image::{ImageFormat, Rgb, RgbImage};

const MULTIPART_BOUNDARY: &str = "pneumonet-smoke-test-boundary";

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Base URL of the running inference server
    #[arg(short, long, default_value = "http://localhost:8000")]
    base_url: String,

    /// Checkpoint path to verify on disk (skipped when not provided)
    #[arg(short, long)]
    model: Option<PathBuf>,

    /// Request timeout in seconds
    #[arg(long, default_value_t = 10)]
    timeout: u64,
}

/// Renders a mid-gray 224x224 JPEG in memory, standing in for an X-ray upload.
fn synthetic_jpeg() -> Result<Vec<u8>, image::ImageError> {
    let img = RgbImage::from_pixel(224, 224, Rgb([128, 128, 128]));
    let mut bytes = Cursor::new(Vec::new());
    img.write_to(&mut bytes, ImageFormat::Jpeg)?;
    Ok(bytes.into_inner())
}

/// Wraps the JPEG bytes in a multipart/form-data body under the `file` field.
fn multipart_body(jpeg: &[u8]) -> Vec<u8> {
    let mut body = Vec::with_capacity(jpeg.len() + 256);
    body.extend_from_slice(format!("--{MULTIPART_BOUNDARY}\r\n").as_bytes());
    body.extend_from_slice(
        b"Content-Disposition: form-data; name=\"file\"; filename=\"test.jpg\"\r\n",
    );
    body.extend_from_slice(b"Content-Type: image/jpeg\r\n\r\n");
    body.extend_from_slice(jpeg);
    body.extend_from_slice(format!("\r\n--{MULTIPART_BOUNDARY}--\r\n").as_bytes());
    body
}

fn check_health(agent: &ureq::Agent, base_url: &str) -> bool {
    println!("Checking server health...");
    let response = match agent.get(base_url).call() {
        Ok(response) => response,
        Err(ureq::Error::Status(code, _)) => {
            println!("  FAILED: server returned status {code}");
            return false;
        }
        Err(ureq::Error::Transport(t)) => {
            println!("  FAILED: server not running at {base_url}: {t}");
            println!("    -> start the inference server, then re-run");
            return false;
        }
    };

    let status = response.status();
    match response.into_json::<serde_json::Value>() {
        Ok(body) => {
            println!("  ok: status {status}, body {body}");
            true
        }
        Err(e) => {
            println!("  FAILED: health response is not valid JSON: {e}");
            false
        }
    }
}

fn check_prediction(agent: &ureq::Agent, base_url: &str) -> bool {
    println!("\nTesting prediction endpoint...");
    let jpeg = match synthetic_jpeg() {
        Ok(bytes) => bytes,
        Err(e) => {
            println!("  FAILED: could not encode test image: {e}");
            return false;
        }
    };
    let body = multipart_body(&jpeg);

    let url = format!("{}/predict", base_url.trim_end_matches('/'));
    let response = match agent
        .post(&url)
        .set(
            "Content-Type",
            &format!("multipart/form-data; boundary={MULTIPART_BOUNDARY}"),
        )
        .send_bytes(&body)
    {
        Ok(response) => response,
        Err(ureq::Error::Status(code, response)) => {
            let detail = response.into_string().unwrap_or_default();
            println!("  FAILED: /predict returned status {code}: {detail}");
            return false;
        }
        Err(ureq::Error::Transport(t)) => {
            println!("  FAILED: cannot reach {url}: {t}");
            return false;
        }
    };

    let json: serde_json::Value = match response.into_json() {
        Ok(json) => json,
        Err(e) => {
            println!("  FAILED: /predict response is not valid JSON: {e}");
            return false;
        }
    };

    let prediction = json.get("prediction").and_then(|v| v.as_str());
    let confidence = json.get("confidence").and_then(|v| v.as_f64());
    match (prediction, confidence) {
        (Some(prediction), Some(confidence)) => {
            println!("  ok: prediction = {prediction}, confidence = {confidence:.4}");
            if !(0.0..=1.0).contains(&confidence) {
                println!("  FAILED: confidence {confidence} outside [0, 1]");
                return false;
            }
            true
        }
        _ => {
            println!("  FAILED: response missing `prediction` or `confidence`: {json}");
            false
        }
    }
}

fn check_model_file(path: &std::path::Path) -> bool {
    println!("\nChecking model file...");
    match std::fs::metadata(path) {
        Ok(meta) if meta.is_file() => {
            let size_mb = meta.len() as f64 / (1024.0 * 1024.0);
            println!("  ok: {} ({size_mb:.1} MB)", path.display());
            true
        }
        _ => {
            println!("  FAILED: checkpoint not found: {}", path.display());
            false
        }
    }
}

fn main() -> ExitCode {
    let args = Args::parse();

    println!("{}", "=".repeat(60));
    println!("PneumoNet Endpoint Smoke Test");
    println!("{}", "=".repeat(60));
    println!("Target: {}", args.base_url);
    println!();

    let agent = ureq::AgentBuilder::new()
        .timeout(Duration::from_secs(args.timeout))
        .build();

    let mut checks = vec![check_health(&agent, &args.base_url)];
    // Skip the upload when the server is unreachable.
    if checks[0] {
        checks.push(check_prediction(&agent, &args.base_url));
    }
    if let Some(model) = &args.model {
        checks.push(check_model_file(model));
    }

    let passed = checks.iter().filter(|&&p| p).count();
    println!("\n{}", "=".repeat(60));
    println!("{passed}/{} checks passed", checks.len());
    if passed == checks.len() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn synthetic_jpeg_decodes_to_expected_size() {
        let bytes = synthetic_jpeg().unwrap();
        let img = image::load_from_memory(&bytes).unwrap();
        assert_eq!(img.width(), 224);
        assert_eq!(img.height(), 224);
    }

    #[test]
    fn multipart_body_carries_field_and_boundary() {
        let body = multipart_body(b"jpegdata");
        let text = String::from_utf8_lossy(&body);
        assert!(text.starts_with(&format!("--{MULTIPART_BOUNDARY}\r\n")));
        assert!(text.contains("name=\"file\""));
        assert!(text.contains("filename=\"test.jpg\""));
        assert!(text.ends_with(&format!("\r\n--{MULTIPART_BOUNDARY}--\r\n")));
    }
}
