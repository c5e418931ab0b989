//! Canvas surface: what to draw, and where input goes.
//!
//! The annotator does not draw anything itself. [`CanvasSurface`] turns its
//! state into a [`Scene`], a flat display list in canvas coordinates that a
//! host (an HTML canvas, a native renderer, a test) paints in order, and
//! forwards host input events back to the annotator.

use annotrace_vision::Point;
use serde::Serialize;

use crate::color_utils::to_css_rgba;
use crate::constants::HANDLE_DRAW_SIZE;
use crate::event::InputEvent;
use crate::interaction::{Annotator, Handle};
use crate::model::{AnnotationId, BoundingBox, Shape};

/// Outline color of the stroke being drawn.
const STROKE_COLOR: [f32; 4] = [1.0, 0.85, 0.1, 1.0];

/// Outline color of the active rectangle.
const ACTIVE_RECT_COLOR: [f32; 4] = [0.2, 0.6, 1.0, 1.0];

/// Fill color of rectangle handles.
const HANDLE_COLOR: [f32; 4] = [1.0, 1.0, 1.0, 1.0];

/// A shape to draw, in canvas pixels.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DrawShape {
    Rect {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
    },
    Polygon {
        vertices: Vec<Point>,
        /// False for an open polyline
        closed: bool,
    },
    /// Square handle centered on a point.
    Handle { center: Point, size: f32 },
}

/// A shape with styling.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DrawItem {
    pub shape: DrawShape,
    /// RGBA, components in 0.0-1.0
    pub color: [f32; 4],
    /// Same color as a CSS `rgba()` string
    pub css_color: String,
    pub selected: bool,
    /// Set for committed annotations
    pub annotation: Option<AnnotationId>,
}

impl DrawItem {
    pub fn new(shape: DrawShape, color: [f32; 4]) -> Self {
        Self {
            shape,
            color,
            css_color: to_css_rgba(color),
            selected: false,
            annotation: None,
        }
    }
}

/// Where the image goes on the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ImagePlacement {
    pub x: f32,
    pub y: f32,
    /// Scaled size on the canvas
    pub width: f32,
    pub height: f32,
    pub zoom: f32,
}

/// Display list for one frame, painted back to front.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Scene {
    pub canvas_width: f32,
    pub canvas_height: f32,
    /// Background image, if one is loaded
    pub image: Option<ImagePlacement>,
    /// Committed annotations in z-order
    pub annotations: Vec<DrawItem>,
    /// Active rectangle, its handles and the stroke in progress
    pub preview: Vec<DrawItem>,
}

impl Scene {
    /// Build the display list for the annotator's current state.
    pub fn build(annotator: &Annotator) -> Self {
        let view = annotator.view();
        let (canvas_width, canvas_height) = view.canvas_size();
        let image = view.image_size().map(|(w, h)| {
            let offset = view.offset();
            ImagePlacement {
                x: offset.x,
                y: offset.y,
                width: w as f32 * view.zoom(),
                height: h as f32 * view.zoom(),
                zoom: view.zoom(),
            }
        });

        let selected = annotator.selected();
        let annotations = annotator
            .annotations()
            .iter()
            .map(|a| DrawItem {
                selected: selected == Some(a.id),
                annotation: Some(a.id),
                ..DrawItem::new(draw_shape(&a.shape), a.color)
            })
            .collect();

        let mut preview = Vec::new();
        if let Some(rect) = annotator.active_rectangle() {
            preview.push(DrawItem::new(rect_shape(&rect), ACTIVE_RECT_COLOR));
            preview.extend(Handle::ALL.iter().map(|h| {
                DrawItem::new(
                    DrawShape::Handle {
                        center: h.position(&rect),
                        size: HANDLE_DRAW_SIZE,
                    },
                    HANDLE_COLOR,
                )
            }));
        }
        let stroke = annotator
            .pending_path()
            .unwrap_or_else(|| annotator.raw_path());
        if stroke.len() >= 2 {
            preview.push(DrawItem::new(
                DrawShape::Polygon {
                    vertices: stroke.to_vec(),
                    closed: false,
                },
                STROKE_COLOR,
            ));
        }

        Self {
            canvas_width,
            canvas_height,
            image,
            annotations,
            preview,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.image.is_none() && self.annotations.is_empty() && self.preview.is_empty()
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

fn rect_shape(rect: &BoundingBox) -> DrawShape {
    DrawShape::Rect {
        x: rect.x,
        y: rect.y,
        width: rect.width,
        height: rect.height,
    }
}

fn draw_shape(shape: &Shape) -> DrawShape {
    match shape {
        Shape::BoundingBox(rect) => rect_shape(rect),
        Shape::Polygon(_) | Shape::OrientedBox(_) => DrawShape::Polygon {
            vertices: shape.vertices(),
            closed: true,
        },
    }
}

/// An annotator bound to a canvas, with a cached scene.
pub struct CanvasSurface {
    annotator: Annotator,
    scene: Scene,
    needs_redraw: bool,
}

impl CanvasSurface {
    pub fn new(annotator: Annotator) -> Self {
        Self {
            annotator,
            scene: Scene::default(),
            needs_redraw: true,
        }
    }

    pub fn annotator(&self) -> &Annotator {
        &self.annotator
    }

    /// Mutable access for mode changes and image loading. Marks the scene stale.
    pub fn annotator_mut(&mut self) -> &mut Annotator {
        self.needs_redraw = true;
        &mut self.annotator
    }

    pub fn into_annotator(self) -> Annotator {
        self.annotator
    }

    /// Forward an input event. Returns true if the scene should be repainted.
    pub fn dispatch(&mut self, event: &InputEvent) -> bool {
        let handled = self.annotator.handle_event(event);
        let committed = self.annotator.pump_refinements() > 0;
        if handled || committed {
            self.needs_redraw = true;
        }
        self.needs_redraw || self.annotator.store().is_dirty()
    }

    /// Poll background refinement. Call once per frame or timer tick.
    /// Returns true if the scene should be repainted.
    pub fn tick(&mut self) -> bool {
        if self.annotator.pump_refinements() > 0 {
            self.needs_redraw = true;
        }
        self.needs_redraw || self.annotator.store().is_dirty()
    }

    /// Current display list, rebuilt only when something changed.
    pub fn scene(&mut self) -> &Scene {
        if self.needs_redraw || self.annotator.store().is_dirty() {
            self.scene = Scene::build(&self.annotator);
            self.annotator.store_mut().clear_dirty();
            self.needs_redraw = false;
            log::trace!(
                "Rebuilt scene: {} annotations, {} preview items",
                self.scene.annotations.len(),
                self.scene.preview.len()
            );
        }
        &self.scene
    }
}
