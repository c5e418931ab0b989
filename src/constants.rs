//! Global constants for the annotation core

/// Default canvas width in pixels
pub const DEFAULT_CANVAS_WIDTH: f32 = 900.0;

/// Default canvas height in pixels
pub const DEFAULT_CANVAS_HEIGHT: f32 = 520.0;

/// Distance (px) within which a pointer-down grabs a rectangle handle
pub const HANDLE_HIT_RADIUS: f32 = 8.0;

/// Side length of the square drawn for each rectangle handle
pub const HANDLE_DRAW_SIZE: f32 = 8.0;

/// Rectangles must exceed this width and height (px) to be committed.
/// Resizing never shrinks an edge below it either.
pub const MIN_RECT_SIZE: f32 = 10.0;

/// Freehand strokes with fewer points are discarded
pub const MIN_STROKE_POINTS: usize = 3;

/// Polygon side count used until the user picks another
pub const DEFAULT_POLYGON_SIDES: u8 = 4;

/// Minimum zoom level
pub const ZOOM_MIN: f32 = 0.5;

/// Maximum zoom level
pub const ZOOM_MAX: f32 = 3.0;

/// Zoom change per zoom-in/zoom-out step
pub const ZOOM_STEP: f32 = 0.1;

/// Zoom level restored by reset
pub const ZOOM_DEFAULT: f32 = 1.0;

/// Saturation used for generated annotation colors
pub const ANNOTATION_SATURATION: f32 = 0.7;

/// Value (brightness) used for generated annotation colors
pub const ANNOTATION_VALUE: f32 = 0.9;
