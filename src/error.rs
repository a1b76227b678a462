use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for operations that may fail with [`VectorizeError`].
pub type VectorizeResult<T> = std::result::Result<T, VectorizeError>;

/// Error types that can occur while vectorizing an image.
///
/// This enum covers color parsing, image decoding, external tracer
/// invocation, and SVG post-processing failures.
#[derive(Debug, Error)]
pub enum VectorizeError {
    /// Color text that is not 3- or 6-digit hex.
    #[error("Invalid color format: `{0}`")]
    InvalidColorFormat(String),
    /// The source image could not be opened or decoded.
    #[error("Unreadable image {}: {source}", path.display())]
    UnreadableImage {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    /// Image encoding error, e.g. while writing the intermediate bitmap.
    #[error("Image processing failed: {0}")]
    Image(#[from] image::ImageError),
    /// File system I/O error.
    #[error(transparent)]
    Io(#[from] std::io::Error),
    /// The external tracer binary is missing or cannot be executed.
    #[error("{tool} is not available: {reason}")]
    ToolUnavailable { tool: String, reason: String },
    /// The external tracer ran but did not produce a result.
    #[error("{tool} failed: {message}")]
    ToolInvocationFailed { tool: String, message: String },
    /// In-process tracing failed.
    #[error("Tracing failed: {0}")]
    Trace(String),
    /// Serializing options for output failed.
    #[error("Serialization failed: {0}")]
    Json(#[from] serde_json::Error),
    /// An expected SVG structure was not found.
    #[error("Malformed SVG: {0}")]
    MalformedSvg(String),
}
