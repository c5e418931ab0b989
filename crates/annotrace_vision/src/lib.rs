//! Pixel and geometry work behind stroke refinement.
//!
//! This crate knows nothing about annotations or pointer events. It turns a
//! raster image plus a freehand path into a clean polygon or oriented box.

pub mod contour;
pub mod edges;
pub mod error;
pub mod geometry;
pub mod mask;
pub mod refine;

pub use error::{Result, VisionError};
pub use geometry::Point;
pub use refine::{
    fallback_shape, refine_or_fallback, try_refine, RefineParams, RefinedShape, ShapeRequest,
    MAX_POLYGON_SIDES, MIN_POLYGON_SIDES,
};
