//! Zoom and image placement on the canvas.
//!
//! Zoom only changes how the image is drawn. Annotations stay in canvas
//! coordinates; the transform is used to map strokes into image pixels for
//! refinement and to map results back.

use annotrace_vision::Point;
use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_CANVAS_HEIGHT, DEFAULT_CANVAS_WIDTH, ZOOM_DEFAULT, ZOOM_MAX, ZOOM_MIN, ZOOM_STEP,
};

/// Zoom range and increment.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ZoomLimits {
    pub min: f32,
    pub max: f32,
    pub step: f32,
}

impl Default for ZoomLimits {
    fn default() -> Self {
        Self {
            min: ZOOM_MIN,
            max: ZOOM_MAX,
            step: ZOOM_STEP,
        }
    }
}

/// Placement of the image on the canvas.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewTransform {
    zoom: f32,
    offset_x: f32,
    offset_y: f32,
    canvas_width: f32,
    canvas_height: f32,
    image_size: Option<(u32, u32)>,
    limits: ZoomLimits,
}

impl Default for ViewTransform {
    fn default() -> Self {
        Self::new(DEFAULT_CANVAS_WIDTH, DEFAULT_CANVAS_HEIGHT, ZoomLimits::default())
    }
}

impl ViewTransform {
    pub fn new(canvas_width: f32, canvas_height: f32, limits: ZoomLimits) -> Self {
        Self {
            zoom: ZOOM_DEFAULT,
            offset_x: 0.0,
            offset_y: 0.0,
            canvas_width,
            canvas_height,
            image_size: None,
            limits,
        }
    }

    pub fn zoom(&self) -> f32 {
        self.zoom
    }

    /// Top-left corner of the drawn image on the canvas.
    pub fn offset(&self) -> Point {
        Point::new(self.offset_x, self.offset_y)
    }

    pub fn canvas_size(&self) -> (f32, f32) {
        (self.canvas_width, self.canvas_height)
    }

    pub fn image_size(&self) -> Option<(u32, u32)> {
        self.image_size
    }

    /// Set or clear the loaded image size and re-center.
    pub fn set_image_size(&mut self, size: Option<(u32, u32)>) {
        self.image_size = size;
        self.recenter();
    }

    pub fn set_canvas_size(&mut self, width: f32, height: f32) {
        self.canvas_width = width;
        self.canvas_height = height;
        self.recenter();
    }

    /// Zoom in by one step, up to the maximum.
    pub fn zoom_in(&mut self) {
        self.set_zoom(self.zoom + self.limits.step);
    }

    /// Zoom out by one step, down to the minimum.
    pub fn zoom_out(&mut self) {
        self.set_zoom(self.zoom - self.limits.step);
    }

    pub fn reset_zoom(&mut self) {
        self.set_zoom(ZOOM_DEFAULT);
    }

    /// Set the zoom, clamped to the limits.
    pub fn set_zoom(&mut self, zoom: f32) {
        // Round away accumulated float error so repeated steps land on
        // exact tenths.
        let zoom = (zoom * 1000.0).round() / 1000.0;
        self.zoom = zoom.clamp(self.limits.min, self.limits.max);
        self.recenter();
        log::trace!("Zoom {:.2}, offset ({:.1}, {:.1})", self.zoom, self.offset_x, self.offset_y);
    }

    /// Center the image on each axis where it is smaller than the canvas.
    fn recenter(&mut self) {
        let Some((w, h)) = self.image_size else {
            self.offset_x = 0.0;
            self.offset_y = 0.0;
            return;
        };
        self.offset_x = ((self.canvas_width - w as f32 * self.zoom) / 2.0).max(0.0);
        self.offset_y = ((self.canvas_height - h as f32 * self.zoom) / 2.0).max(0.0);
    }

    /// Map a canvas point to image pixel coordinates.
    pub fn canvas_to_image(&self, p: Point) -> Point {
        Point::new(
            (p.x - self.offset_x) / self.zoom,
            (p.y - self.offset_y) / self.zoom,
        )
    }

    /// Map an image pixel coordinate to the canvas.
    pub fn image_to_canvas(&self, p: Point) -> Point {
        Point::new(
            p.x * self.zoom + self.offset_x,
            p.y * self.zoom + self.offset_y,
        )
    }
}
