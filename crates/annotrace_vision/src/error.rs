//! Errors raised by the refinement pipeline.

use thiserror::Error;

/// Why a stroke could not be refined.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum VisionError {
    #[error("Image has no pixels")]
    EmptyImage,

    #[error("Path has {distinct} distinct vertices, at least 3 are required")]
    DegeneratePath { distinct: usize },

    #[error("Polygon side count {0} is outside 3..=12")]
    InvalidSides(u8),

    #[error("Largest contour area {area:.1} px² does not exceed the {min:.1} px² threshold")]
    ContourTooSmall { area: f32, min: f32 },

    #[error("Polygon approximation collapsed to {0} vertices")]
    DegeneratePolygon(usize),
}

pub type Result<T> = std::result::Result<T, VisionError>;
