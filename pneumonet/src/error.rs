use thiserror::Error;

/// The error type for `PneumoNet` operations.
///
/// Covers the three failure classes of the evaluation toolkit: configuration
/// problems (missing paths, bad settings), data problems (malformed manifest
/// rows, unreadable images), and model problems (checkpoint loading, forward
/// pass).
#[derive(Error, Debug)]
pub enum PneumoNetError {
    /// A configuration problem the user can fix before re-running.
    /// The `hint` carries the remediation step shown alongside the message.
    #[error("{message}\n  hint: {hint}")]
    Config {
        /// Description of the configuration problem.
        message: String,
        /// How to fix it.
        hint: String,
    },

    /// Error for when manifest or dataset operations fail.
    #[error("Dataset error: {message}")]
    Dataset {
        /// The error message.
        message: String,
    },

    /// Error for when loading model weights fails.
    #[error("Failed to load weights: {reason}")]
    WeightLoadingFailed {
        /// The reason for the weight loading failure.
        reason: String,
    },

    /// Error for when the model forward pass or tensor extraction fails.
    #[error("Inference failed: {reason}")]
    InferenceFailed {
        /// The reason for the inference failure.
        reason: String,
    },

    /// Error for image decoding or encoding failures.
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    /// Error for CSV reading or writing failures.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Error for JSON serialization failures.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Error for filesystem operations.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// A specialized `Result` type for `PneumoNet` operations.
pub type PneumoNetResult<T> = Result<T, PneumoNetError>;
