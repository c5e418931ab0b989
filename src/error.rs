//! Error types for the annotation core.

use std::path::PathBuf;
use thiserror::Error;

/// Errors surfaced by the annotator and its helpers.
///
/// Interaction itself never fails: refinement problems degrade to the
/// fallback path and insufficient input is discarded. These errors cover
/// the edges where data enters or leaves the core.
#[derive(Error, Debug)]
pub enum AnnotatorError {
    /// Image bytes could not be decoded
    #[error("Failed to decode image: {0}")]
    ImageDecode(#[from] image::ImageError),

    /// Width or height of zero where a real image size is required
    #[error("Invalid image dimensions {width}x{height}")]
    InvalidDimensions {
        /// Image width in pixels
        width: u32,
        /// Image height in pixels
        height: u32,
    },

    /// Coordinate sequence does not match its shape kind
    #[error("Invalid coordinates: {message}")]
    InvalidCoordinates {
        /// Description of the coordinate error
        message: String,
    },

    /// JSON parsing or serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error while reading input files
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Input file not found at the given path
    #[error("File not found: {path:?}")]
    FileNotFound {
        /// Path that was looked up
        path: PathBuf,
    },
}

impl AnnotatorError {
    /// Create an invalid coordinates error.
    pub fn invalid_coordinates(message: impl Into<String>) -> Self {
        Self::InvalidCoordinates {
            message: message.into(),
        }
    }
}

/// Result type alias for annotator operations.
pub type Result<T> = std::result::Result<T, AnnotatorError>;
