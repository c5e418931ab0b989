//! Annotation data structures.

use std::fmt;

use annotrace_vision::geometry::{flatten, point_in_polygon};
use annotrace_vision::{Point, RefinedShape};
use serde::{Deserialize, Serialize};

use super::tool::ShapeMode;
use crate::color_utils::annotation_color;
use crate::error::AnnotatorError;

/// Unique identifier for an annotation.
pub type AnnotationId = u64;

/// Minimum number of vertices required for a valid polygon.
pub const MIN_POLYGON_VERTICES: usize = 3;

/// Kind tag carried by every stored annotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShapeKind {
    Polygon,
    Bbox,
}

impl ShapeKind {
    pub fn name(&self) -> &'static str {
        match self {
            ShapeKind::Polygon => "polygon",
            ShapeKind::Bbox => "bbox",
        }
    }
}

impl fmt::Display for ShapeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Axis-aligned rectangle in canvas pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl BoundingBox {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Normalized box spanning two corner points in any order.
    pub fn from_corners(a: Point, b: Point) -> Self {
        Self {
            x: a.x.min(b.x),
            y: a.y.min(b.y),
            width: (b.x - a.x).abs(),
            height: (b.y - a.y).abs(),
        }
    }

    /// Smallest box containing all points, or None for an empty slice.
    pub fn enclosing(points: &[Point]) -> Option<Self> {
        let first = points.first()?;
        let (mut min, mut max) = (*first, *first);
        for p in &points[1..] {
            min.x = min.x.min(p.x);
            min.y = min.y.min(p.y);
            max.x = max.x.max(p.x);
            max.y = max.y.max(p.y);
        }
        Some(Self::from_corners(min, max))
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    /// Edges inclusive.
    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.x && p.x <= self.right() && p.y >= self.y && p.y <= self.bottom()
    }

    /// True when both width and height are strictly greater than `min`.
    pub fn exceeds(&self, min: f32) -> bool {
        self.width > min && self.height > min
    }

    /// Corners clockwise from the top-left.
    pub fn corners(&self) -> [Point; 4] {
        [
            Point::new(self.x, self.y),
            Point::new(self.right(), self.y),
            Point::new(self.right(), self.bottom()),
            Point::new(self.x, self.bottom()),
        ]
    }
}

/// Geometry of an annotation, in canvas coordinates.
#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    /// Closed polygon, at least three vertices.
    Polygon(Vec<Point>),
    /// Axis-aligned box from the rectangle tool or a boxed fallback.
    BoundingBox(BoundingBox),
    /// Rotated box produced by refinement, corners in the fitted order.
    OrientedBox([Point; 4]),
}

impl Shape {
    pub fn kind(&self) -> ShapeKind {
        match self {
            Shape::Polygon(_) => ShapeKind::Polygon,
            Shape::BoundingBox(_) | Shape::OrientedBox(_) => ShapeKind::Bbox,
        }
    }

    /// Flat coordinates: `[x1, y1, ...]` for vertex shapes, `[x, y, w, h]` for boxes.
    pub fn coordinates(&self) -> Vec<f32> {
        match self {
            Shape::Polygon(points) => flatten(points),
            Shape::BoundingBox(b) => vec![b.x, b.y, b.width, b.height],
            Shape::OrientedBox(corners) => flatten(corners),
        }
    }

    /// Outline vertices, used for drawing and hit testing.
    pub fn vertices(&self) -> Vec<Point> {
        match self {
            Shape::Polygon(points) => points.clone(),
            Shape::BoundingBox(b) => b.corners().to_vec(),
            Shape::OrientedBox(corners) => corners.to_vec(),
        }
    }

    pub fn contains(&self, p: Point) -> bool {
        match self {
            Shape::BoundingBox(b) => b.contains(p),
            Shape::Polygon(points) => point_in_polygon(p, points),
            Shape::OrientedBox(corners) => point_in_polygon(p, corners),
        }
    }

    /// Rebuild a shape from its kind tag and flat coordinates.
    ///
    /// A bbox with four numbers is axis aligned, with eight it is oriented.
    pub fn from_coordinates(kind: ShapeKind, coords: &[f32]) -> Result<Self, AnnotatorError> {
        if coords.len() % 2 != 0 {
            return Err(AnnotatorError::invalid_coordinates(format!(
                "{kind} has an odd coordinate count ({})",
                coords.len()
            )));
        }
        let points: Vec<Point> = coords
            .chunks_exact(2)
            .map(|c| Point::new(c[0], c[1]))
            .collect();

        match kind {
            ShapeKind::Polygon if points.len() >= MIN_POLYGON_VERTICES => {
                Ok(Shape::Polygon(points))
            }
            ShapeKind::Polygon => Err(AnnotatorError::invalid_coordinates(format!(
                "polygon needs at least {MIN_POLYGON_VERTICES} vertices, got {}",
                points.len()
            ))),
            ShapeKind::Bbox => match coords.len() {
                4 => {
                    let b = BoundingBox::new(coords[0], coords[1], coords[2], coords[3]);
                    if b.width > 0.0 && b.height > 0.0 {
                        Ok(Shape::BoundingBox(b))
                    } else {
                        Err(AnnotatorError::invalid_coordinates(
                            "bbox width and height must be positive",
                        ))
                    }
                }
                8 => Ok(Shape::OrientedBox([points[0], points[1], points[2], points[3]])),
                n => Err(AnnotatorError::invalid_coordinates(format!(
                    "bbox takes 4 or 8 coordinates, got {n}"
                ))),
            },
        }
    }

    /// Turn a refinement result into a shape for the active shape mode.
    ///
    /// Returns None when the result cannot form a valid shape, e.g. a
    /// fallback path with fewer than three points or a zero-area box.
    pub fn from_refined(refined: RefinedShape, mode: ShapeMode) -> Option<Self> {
        match refined {
            RefinedShape::Polygon(points) => {
                (points.len() >= MIN_POLYGON_VERTICES).then_some(Shape::Polygon(points))
            }
            RefinedShape::OrientedBox(corners) => Some(Shape::OrientedBox(corners)),
            RefinedShape::Fallback(points) => match mode {
                ShapeMode::Polygon => {
                    (points.len() >= MIN_POLYGON_VERTICES).then_some(Shape::Polygon(points))
                }
                ShapeMode::BBox => BoundingBox::enclosing(&points)
                    .filter(|b| b.width > 0.0 && b.height > 0.0)
                    .map(Shape::BoundingBox),
            },
        }
    }
}

/// A committed annotation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(into = "AnnotationRecord", try_from = "AnnotationRecord")]
pub struct Annotation {
    pub id: AnnotationId,
    pub shape: Shape,
    pub label: Option<String>,
    /// RGBA, components in 0.0-1.0.
    pub color: [f32; 4],
}

impl Annotation {
    /// Create an annotation with the color derived from its id.
    pub fn new(id: AnnotationId, shape: Shape) -> Self {
        Self {
            id,
            shape,
            label: None,
            color: annotation_color(id),
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn kind(&self) -> ShapeKind {
        self.shape.kind()
    }

    pub fn coordinates(&self) -> Vec<f32> {
        self.shape.coordinates()
    }
}

/// Flat wire form of an annotation.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct AnnotationRecord {
    id: AnnotationId,
    kind: ShapeKind,
    coordinates: Vec<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    label: Option<String>,
    #[serde(default)]
    color: Option<[f32; 4]>,
}

impl From<Annotation> for AnnotationRecord {
    fn from(a: Annotation) -> Self {
        Self {
            id: a.id,
            kind: a.shape.kind(),
            coordinates: a.shape.coordinates(),
            label: a.label,
            color: Some(a.color),
        }
    }
}

impl TryFrom<AnnotationRecord> for Annotation {
    type Error = AnnotatorError;

    fn try_from(record: AnnotationRecord) -> Result<Self, Self::Error> {
        let shape = Shape::from_coordinates(record.kind, &record.coordinates)?;
        Ok(Self {
            id: record.id,
            shape,
            label: record.label,
            color: record.color.unwrap_or_else(|| annotation_color(record.id)),
        })
    }
}
