//! PneumoNet command-line tools.
//!
//! ## Available binaries
//!
//! - `evaluate`: batch evaluation of a checkpoint over a labeled image set
//! - `check-setup`: verifies the local environment and exits 0/1
//! - `smoke-test`: probes the external HTTP inference endpoint
//!
//! ## Usage
//!
//! ```bash
//! # Evaluate a checkpoint
//! cargo run --bin evaluate -- --images data/images --manifest data/labels.csv --model models/pneumonet.mpk
//!
//! # Verify the setup
//! cargo run --bin check-setup -- --model models/pneumonet.mpk
//!
//! # Smoke-test a running inference server
//! cargo run --bin smoke-test -- --base-url http://localhost:8000
//! ```

pub mod backend;

pub use backend::{create_device, get_backend_name, SelectedBackend, SelectedDevice};
