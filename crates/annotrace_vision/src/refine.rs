//! Stroke refinement: raw freehand path in, clean shape out.
//!
//! The pipeline masks the image with the drawn region, runs edge detection
//! inside it, takes the largest external contour and fits either a polygon
//! with an exact vertex count or a minimum-area rotated rectangle. Any
//! failure along the way degrades to a decimated copy of the raw path.

use image::RgbaImage;
use imageproc::geometry::min_area_rect;
use serde::{Deserialize, Serialize};

use crate::contour::largest_external_contour;
use crate::edges::edge_map;
use crate::error::{Result, VisionError};
use crate::geometry::{
    decimate_path, enforce_vertex_count, flatten, perimeter, simplify_closed, Point,
};
use crate::mask::{apply_mask, path_mask};

/// Smallest polygon side count that can be requested.
pub const MIN_POLYGON_SIDES: u8 = 3;

/// Largest polygon side count that can be requested.
pub const MAX_POLYGON_SIDES: u8 = 12;

/// The shape a refinement should produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShapeRequest {
    /// Polygon with exactly `sides` vertices.
    Polygon { sides: u8 },
    /// Minimum-area rotated rectangle.
    OrientedBox,
}

/// Tunables for the refinement pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RefineParams {
    /// Gaussian blur sigma (1.1 matches a 5x5 kernel).
    pub blur_sigma: f32,
    /// Canny hysteresis low threshold.
    pub canny_low: f32,
    /// Canny hysteresis high threshold.
    pub canny_high: f32,
    /// Contours enclosing this area or less are ignored (px²).
    pub min_contour_area: f32,
    /// Douglas-Peucker epsilon as a fraction of the contour perimeter.
    pub epsilon_fraction: f32,
    /// Cap on add/remove steps while enforcing the side count.
    pub max_enforce_iterations: usize,
    /// Number of points the fallback path is decimated to.
    pub fallback_points: usize,
}

impl Default for RefineParams {
    fn default() -> Self {
        Self {
            blur_sigma: 1.1,
            canny_low: 50.0,
            canny_high: 150.0,
            min_contour_area: 100.0,
            epsilon_fraction: 0.02,
            max_enforce_iterations: 50,
            fallback_points: 4,
        }
    }
}

/// Result of refining a stroke.
#[derive(Debug, Clone, PartialEq)]
pub enum RefinedShape {
    /// Polygon fitted to the detected contour.
    Polygon(Vec<Point>),
    /// Rotated rectangle around the detected contour, in its own corner order.
    OrientedBox([Point; 4]),
    /// Decimated raw path, used when refinement is unavailable or fails.
    Fallback(Vec<Point>),
}

impl RefinedShape {
    /// Vertices of the shape.
    pub fn points(&self) -> &[Point] {
        match self {
            RefinedShape::Polygon(points) | RefinedShape::Fallback(points) => points,
            RefinedShape::OrientedBox(corners) => corners,
        }
    }

    /// Coordinates as `[x1, y1, x2, y2, ...]`.
    pub fn to_flat(&self) -> Vec<f32> {
        flatten(self.points())
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, RefinedShape::Fallback(_))
    }

    /// Apply `f` to every vertex, keeping the variant.
    pub fn map_points(self, f: impl Fn(Point) -> Point) -> Self {
        match self {
            RefinedShape::Polygon(points) => {
                RefinedShape::Polygon(points.into_iter().map(f).collect())
            }
            RefinedShape::Fallback(points) => {
                RefinedShape::Fallback(points.into_iter().map(f).collect())
            }
            RefinedShape::OrientedBox(corners) => RefinedShape::OrientedBox(corners.map(f)),
        }
    }
}

/// Decimate the raw path; the shape used whenever refinement is skipped.
pub fn fallback_shape(path: &[Point], params: &RefineParams) -> RefinedShape {
    RefinedShape::Fallback(decimate_path(path, params.fallback_points.max(1)))
}

/// Refine, falling back to the decimated path on any error.
pub fn refine_or_fallback(
    image: &RgbaImage,
    path: &[Point],
    request: ShapeRequest,
    params: &RefineParams,
) -> RefinedShape {
    match try_refine(image, path, request, params) {
        Ok(shape) => shape,
        Err(e) => {
            log::debug!("Refinement fell back to raw path: {}", e);
            fallback_shape(path, params)
        }
    }
}

/// Run the full pipeline and report why it failed, if it did.
pub fn try_refine(
    image: &RgbaImage,
    path: &[Point],
    request: ShapeRequest,
    params: &RefineParams,
) -> Result<RefinedShape> {
    if let ShapeRequest::Polygon { sides } = request {
        if !(MIN_POLYGON_SIDES..=MAX_POLYGON_SIDES).contains(&sides) {
            return Err(VisionError::InvalidSides(sides));
        }
    }
    if image.width() == 0 || image.height() == 0 {
        return Err(VisionError::EmptyImage);
    }

    let mask = path_mask(image.width(), image.height(), path)?;
    let masked = apply_mask(image, &mask);
    let edges = edge_map(&masked, params);

    let contour = largest_external_contour(&edges);
    let area = contour.as_ref().map_or(0.0, |c| c.area);
    let Some(contour) = contour.filter(|c| c.area > params.min_contour_area) else {
        return Err(VisionError::ContourTooSmall {
            area,
            min: params.min_contour_area,
        });
    };
    log::trace!(
        "Largest contour: {} border pixels, area {:.1}",
        contour.points.len(),
        contour.area
    );

    match request {
        ShapeRequest::OrientedBox => {
            let corners = min_area_rect(&contour.pixels)
                .map(|p| Point::new(p.x as f32, p.y as f32).round());
            Ok(RefinedShape::OrientedBox(corners))
        }
        ShapeRequest::Polygon { sides } => {
            let epsilon = params.epsilon_fraction * perimeter(&contour.points);
            let approx = simplify_closed(&contour.points, epsilon);
            log::debug!(
                "Initial approximation: {} vertices, target {}",
                approx.len(),
                sides
            );

            let vertices =
                enforce_vertex_count(&approx, usize::from(sides), params.max_enforce_iterations);
            log::debug!("After enforcement: {} vertices", vertices.len());

            if vertices.len() < usize::from(MIN_POLYGON_SIDES) {
                return Err(VisionError::DegeneratePolygon(vertices.len()));
            }
            Ok(RefinedShape::Polygon(
                vertices.iter().map(Point::round).collect(),
            ))
        }
    }
}
