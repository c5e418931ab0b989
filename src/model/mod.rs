//! Data models for the annotation core.

mod annotation;
mod tool;

pub use annotation::{
    Annotation, AnnotationId, BoundingBox, MIN_POLYGON_VERTICES, Shape, ShapeKind,
};
pub use tool::{ShapeMode, ToolMode};
