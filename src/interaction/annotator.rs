//! The annotator: tool state, gestures and refinement dispatch.

use std::sync::Arc;
use std::time::Duration;

use annotrace_vision::{
    MAX_POLYGON_SIDES, MIN_POLYGON_SIDES, Point, RefineParams, RefinedShape, fallback_shape,
};
use image::RgbaImage;

use super::rectangle::{Handle, hit_handle, resize};
use super::refinement::{
    InlineRefiner, RefinementJob, RefinementOutcome, RefinementRunner, RefinementStatus,
};
use crate::config::{AppConfig, RectangleConfig};
use crate::constants::MIN_STROKE_POINTS;
use crate::error::Result;
use crate::event::{InputEvent, Key, Modifiers};
use crate::keybindings::{KeyAction, KeyBindings};
use crate::model::{Annotation, AnnotationId, BoundingBox, Shape, ShapeMode, ToolMode};
use crate::store::AnnotationStore;
use crate::view::ViewTransform;

/// What the pointer is currently doing.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Gesture {
    #[default]
    Idle,
    /// Collecting a freehand stroke
    Drawing,
    /// Dragging out a new rectangle from `anchor`
    DraggingNew { anchor: Point },
    /// Holding the active rectangle; moves do not change it
    DraggingWhole,
    /// Moving the edges owned by a handle
    Resizing(Handle),
}

/// A dispatched refinement the annotator is waiting on.
#[derive(Debug, Clone)]
struct PendingRefinement {
    generation: u64,
    /// Canvas-space stroke, used for the fallback and for display
    raw_path: Vec<Point>,
    mode: ShapeMode,
    /// View at dispatch, used to map the result back to the canvas
    view: ViewTransform,
}

/// Owns everything the canvas needs to turn pointer input into annotations.
pub struct Annotator {
    tool: ToolMode,
    shape_mode: ShapeMode,
    polygon_sides: u8,
    gesture: Gesture,
    active_rect: Option<BoundingBox>,
    raw_path: Vec<Point>,
    view: ViewTransform,
    image: Option<Arc<RgbaImage>>,
    store: AnnotationStore,
    runner: Box<dyn RefinementRunner>,
    /// Bumped on every gesture start, cancel, tool change and image load
    generation: u64,
    pending: Option<PendingRefinement>,
    refinement_enabled: bool,
    refine_params: RefineParams,
    rect_settings: RectangleConfig,
    keybindings: KeyBindings,
}

impl Annotator {
    /// Create an annotator that refines strokes inline.
    pub fn new(config: &AppConfig) -> Self {
        Self::with_runner(config, Box::new(InlineRefiner::new()))
    }

    pub fn with_runner(config: &AppConfig, runner: Box<dyn RefinementRunner>) -> Self {
        let view = ViewTransform::new(config.canvas.width, config.canvas.height, config.zoom);
        Self {
            tool: config.preferences.default_tool,
            shape_mode: config.preferences.default_shape_mode,
            polygon_sides: clamp_sides(config.preferences.default_polygon_sides),
            gesture: Gesture::Idle,
            active_rect: None,
            raw_path: Vec::new(),
            view,
            image: None,
            store: AnnotationStore::with_history_limit(config.history.max_snapshots),
            runner,
            generation: 0,
            pending: None,
            refinement_enabled: config.refinement.enabled,
            refine_params: config.refinement.params.clone(),
            rect_settings: config.rectangle,
            keybindings: config.keybindings.clone(),
        }
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn tool_mode(&self) -> ToolMode {
        self.tool
    }

    pub fn shape_mode(&self) -> ShapeMode {
        self.shape_mode
    }

    pub fn polygon_sides(&self) -> u8 {
        self.polygon_sides
    }

    pub fn gesture(&self) -> Gesture {
        self.gesture
    }

    pub fn active_rectangle(&self) -> Option<BoundingBox> {
        self.active_rect
    }

    /// Points of the stroke being drawn.
    pub fn raw_path(&self) -> &[Point] {
        &self.raw_path
    }

    /// Stroke whose refinement is still outstanding. None once the stroke
    /// has been cancelled, even if its late result has not arrived yet.
    pub fn pending_path(&self) -> Option<&[Point]> {
        self.pending
            .as_ref()
            .filter(|p| p.generation == self.generation)
            .map(|p| p.raw_path.as_slice())
    }

    pub fn view(&self) -> &ViewTransform {
        &self.view
    }

    pub fn image(&self) -> Option<&RgbaImage> {
        self.image.as_deref()
    }

    pub fn store(&self) -> &AnnotationStore {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut AnnotationStore {
        &mut self.store
    }

    pub fn annotations(&self) -> &[Annotation] {
        self.store.annotations()
    }

    pub fn selected(&self) -> Option<AnnotationId> {
        self.store.selected()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_refining(&self) -> bool {
        self.pending.is_some()
    }

    pub fn refinement_status(&self) -> RefinementStatus {
        if self.pending.is_some() {
            RefinementStatus::Busy
        } else if self.refinement_available() {
            RefinementStatus::Ready
        } else {
            RefinementStatus::Unavailable
        }
    }

    fn refinement_available(&self) -> bool {
        self.image.is_some() && self.refinement_enabled && self.runner.is_available()
    }

    // ========================================================================
    // Modes
    // ========================================================================

    /// Switch tools. Leaving the rectangle tool resolves a retained
    /// rectangle; any gesture in progress is abandoned.
    pub fn set_tool_mode(&mut self, tool: ToolMode) {
        if tool == self.tool {
            return;
        }
        log::debug!("Tool {} -> {}", self.tool.name(), tool.name());

        self.bump_generation();
        self.raw_path.clear();
        self.gesture = Gesture::Idle;
        if self.tool == ToolMode::Rectangle {
            self.resolve_active_rectangle();
        }
        self.tool = tool;
    }

    /// Switch shape mode. Choosing bbox while drawing selects the rectangle tool.
    pub fn set_shape_mode(&mut self, mode: ShapeMode) {
        self.shape_mode = mode;
        if mode == ShapeMode::BBox && self.tool == ToolMode::Draw {
            self.set_tool_mode(ToolMode::Rectangle);
        }
    }

    /// Set the polygon target vertex count, clamped to the supported range.
    pub fn set_polygon_sides(&mut self, sides: u8) {
        self.polygon_sides = clamp_sides(sides);
    }

    pub fn set_refinement_enabled(&mut self, enabled: bool) {
        self.refinement_enabled = enabled;
    }

    pub fn set_change_listener(&mut self, listener: impl FnMut(&[Annotation]) + 'static) {
        self.store.set_change_listener(listener);
    }

    /// Put an editable rectangle on the canvas, e.g. to adjust a suggestion
    /// before committing it. Selects the rectangle tool.
    pub fn set_active_rectangle(&mut self, rect: BoundingBox) {
        self.set_tool_mode(ToolMode::Rectangle);
        self.resolve_active_rectangle();
        self.active_rect = Some(rect);
        self.gesture = Gesture::Idle;
    }

    // ========================================================================
    // Image and view
    // ========================================================================

    /// Decode and load image bytes. On error the current image is kept.
    pub fn load_image_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        let image = image::load_from_memory(bytes)?.to_rgba8();
        self.load_image(image);
        Ok(())
    }

    /// Show a new image. Annotations and history of the previous image are dropped.
    pub fn load_image(&mut self, image: RgbaImage) {
        log::info!("Loaded image {}x{}", image.width(), image.height());
        self.view.set_image_size(Some(image.dimensions()));
        self.image = Some(Arc::new(image));
        self.reset_for_new_image();
    }

    pub fn unload_image(&mut self) {
        self.view.set_image_size(None);
        self.image = None;
        self.reset_for_new_image();
    }

    /// Replace the annotations, e.g. with ones saved for this image earlier.
    pub fn load_annotations(&mut self, annotations: Vec<Annotation>) {
        self.store.load(annotations);
    }

    fn reset_for_new_image(&mut self) {
        self.bump_generation();
        self.clear_gesture_state();
        self.store.reset();
    }

    pub fn zoom_in(&mut self) {
        self.view.zoom_in();
    }

    pub fn zoom_out(&mut self) {
        self.view.zoom_out();
    }

    pub fn reset_zoom(&mut self) {
        self.view.reset_zoom();
    }

    pub fn set_canvas_size(&mut self, width: f32, height: f32) {
        self.view.set_canvas_size(width, height);
    }

    // ========================================================================
    // Store operations
    // ========================================================================

    pub fn undo(&mut self) -> bool {
        self.store.undo()
    }

    pub fn delete_selected(&mut self) -> bool {
        self.store.delete_selected()
    }

    pub fn clear_all(&mut self) -> bool {
        self.store.clear_all()
    }

    pub fn select(&mut self, id: Option<AnnotationId>) {
        self.store.select(id);
    }

    pub fn set_label(&mut self, id: AnnotationId, label: Option<String>) -> bool {
        self.store.set_label(id, label)
    }

    pub fn to_json(&self) -> Result<String> {
        self.store.to_json()
    }

    // ========================================================================
    // Input
    // ========================================================================

    /// Route an input event. Returns true if it changed or could change state.
    pub fn handle_event(&mut self, event: &InputEvent) -> bool {
        log::trace!("Event {:?} in {:?}", event, self.gesture);
        match *event {
            InputEvent::PointerDown { position } => {
                self.pointer_down(position);
                true
            }
            InputEvent::PointerMove { position } => {
                let active = self.gesture != Gesture::Idle;
                self.pointer_move(position);
                active
            }
            InputEvent::PointerUp { position } => {
                self.pointer_up(position);
                true
            }
            InputEvent::Wheel { delta } => {
                if delta < 0.0 {
                    self.zoom_in();
                } else if delta > 0.0 {
                    self.zoom_out();
                }
                delta != 0.0
            }
            InputEvent::KeyDown { key, modifiers } => self.key_down(key, modifiers),
        }
    }

    pub fn pointer_down(&mut self, p: Point) {
        match self.tool {
            ToolMode::Draw => {
                if self.pending.is_some() {
                    log::debug!("Stroke rejected: refinement still in flight");
                    return;
                }
                self.bump_generation();
                self.raw_path.clear();
                self.raw_path.push(p);
                self.gesture = Gesture::Drawing;
            }
            ToolMode::Rectangle => self.rectangle_down(p),
            ToolMode::Select => {
                if let Some(id) = self.store.hit_test(p) {
                    log::debug!("Selected annotation #{}", id);
                    self.store.select(Some(id));
                }
            }
        }
    }

    fn rectangle_down(&mut self, p: Point) {
        if let Some(rect) = self.active_rect {
            if let Some(handle) = hit_handle(&rect, p, self.rect_settings.handle_hit_radius) {
                self.bump_generation();
                self.gesture = Gesture::Resizing(handle);
                log::trace!("Resizing from {:?}", handle);
                return;
            }
            if rect.contains(p) {
                self.bump_generation();
                self.gesture = Gesture::DraggingWhole;
                return;
            }
            self.resolve_active_rectangle();
        }

        self.bump_generation();
        self.active_rect = Some(BoundingBox::new(p.x, p.y, 0.0, 0.0));
        self.gesture = Gesture::DraggingNew { anchor: p };
    }

    pub fn pointer_move(&mut self, p: Point) {
        match self.gesture {
            Gesture::Drawing => self.raw_path.push(p),
            Gesture::DraggingNew { anchor } => {
                self.active_rect = Some(BoundingBox::from_corners(anchor, p));
            }
            Gesture::Resizing(handle) => {
                if let Some(rect) = self.active_rect {
                    self.active_rect =
                        Some(resize(&rect, handle, p, self.rect_settings.min_size));
                }
            }
            Gesture::DraggingWhole | Gesture::Idle => {}
        }
    }

    /// End the current gesture. The release position itself is not sampled.
    pub fn pointer_up(&mut self, _p: Point) {
        match std::mem::take(&mut self.gesture) {
            Gesture::Drawing => self.finish_stroke(),
            Gesture::DraggingNew { .. } => self.resolve_active_rectangle(),
            Gesture::Resizing(_) | Gesture::DraggingWhole | Gesture::Idle => {}
        }
    }

    /// Dispatch a key press. Returns true if the key was bound.
    pub fn key_down(&mut self, key: Key, modifiers: Modifiers) -> bool {
        let Some(action) = self.keybindings.action_for(key, modifiers) else {
            return false;
        };
        log::trace!("Key {:?} -> {:?}", key, action);
        match action {
            KeyAction::Undo => {
                self.undo();
            }
            KeyAction::DeleteSelected => {
                self.delete_selected();
            }
            KeyAction::CancelGesture => self.cancel_gesture(),
            KeyAction::SetTool(tool) => self.set_tool_mode(tool),
        }
        true
    }

    /// Abandon the stroke, active rectangle and gesture. The store is untouched.
    pub fn cancel_gesture(&mut self) {
        self.bump_generation();
        self.clear_gesture_state();
        log::debug!("Gesture cancelled");
    }

    fn clear_gesture_state(&mut self) {
        self.raw_path.clear();
        self.active_rect = None;
        self.gesture = Gesture::Idle;
    }

    // ========================================================================
    // Rectangle and stroke resolution
    // ========================================================================

    /// Commit the active rectangle if it is big enough, otherwise drop it.
    fn resolve_active_rectangle(&mut self) {
        let Some(rect) = self.active_rect.take() else {
            return;
        };
        if rect.exceeds(self.rect_settings.min_size) {
            self.store.add(Shape::BoundingBox(rect));
        } else {
            log::debug!(
                "Discarded {:.0}x{:.0} rectangle below minimum size",
                rect.width,
                rect.height
            );
        }
    }

    fn finish_stroke(&mut self) {
        let path = std::mem::take(&mut self.raw_path);
        if path.len() < MIN_STROKE_POINTS {
            log::debug!("Discarded stroke with {} points", path.len());
            return;
        }

        let mode = self.shape_mode;
        let image = match self.image.as_ref() {
            Some(image) if self.refinement_available() => Arc::clone(image),
            _ => {
                let shape = fallback_shape(&path, &self.refine_params);
                self.commit(shape, mode);
                return;
            }
        };

        let view = self.view;
        let job = RefinementJob {
            generation: self.generation,
            image,
            path: path.iter().map(|p| view.canvas_to_image(*p)).collect(),
            request: mode.request(self.polygon_sides),
            params: self.refine_params.clone(),
        };
        self.pending = Some(PendingRefinement {
            generation: self.generation,
            raw_path: path,
            mode,
            view,
        });
        self.runner.submit(job);
        self.pump_refinements();
    }

    /// Apply finished refinements. Returns how many annotations were added.
    ///
    /// Hosts with a background runner call this from their frame or timer loop.
    pub fn pump_refinements(&mut self) -> usize {
        let mut committed = 0;
        while let Some(outcome) = self.runner.poll() {
            if self.apply_outcome(outcome) {
                committed += 1;
            }
        }
        if !self.runner.is_available() {
            if let Some(pending) = self.pending.take() {
                log::warn!("Refinement runner stopped, using raw path for pending stroke");
                let shape = fallback_shape(&pending.raw_path, &self.refine_params);
                if pending.generation == self.generation && self.commit(shape, pending.mode) {
                    committed += 1;
                }
            }
        }
        committed
    }

    /// Block up to `timeout` for the pending refinement, then apply it.
    /// Returns true if an annotation was added.
    pub fn wait_for_refinement(&mut self, timeout: Duration) -> bool {
        if self.pending.is_none() {
            return false;
        }
        let committed = match self.runner.wait(timeout) {
            Some(outcome) => self.apply_outcome(outcome),
            None => false,
        };
        self.pump_refinements() > 0 || committed
    }

    fn apply_outcome(&mut self, outcome: RefinementOutcome) -> bool {
        let Some(pending) = self
            .pending
            .take_if(|pending| pending.generation == outcome.generation)
        else {
            log::warn!(
                "Discarding refinement for generation {} (nothing waiting on it)",
                outcome.generation
            );
            return false;
        };
        if pending.generation != self.generation {
            log::warn!(
                "Discarding stale refinement for generation {} (now {})",
                pending.generation,
                self.generation
            );
            return false;
        }

        let shape = match outcome.result {
            Ok(shape) => shape.map_points(|p| pending.view.image_to_canvas(p)),
            Err(e) => {
                log::warn!("Refinement failed, using raw path: {}", e);
                fallback_shape(&pending.raw_path, &self.refine_params)
            }
        };
        self.commit(shape, pending.mode)
    }

    fn commit(&mut self, refined: RefinedShape, mode: ShapeMode) -> bool {
        let fallback = refined.is_fallback();
        match Shape::from_refined(refined, mode) {
            Some(shape) => {
                let id = self.store.add(shape);
                if fallback {
                    log::debug!("Annotation #{} uses the decimated stroke", id);
                }
                true
            }
            None => {
                log::debug!("Stroke did not form a valid {} shape", mode.kind());
                false
            }
        }
    }

    fn bump_generation(&mut self) {
        self.generation += 1;
    }
}

fn clamp_sides(sides: u8) -> u8 {
    sides.clamp(MIN_POLYGON_SIDES, MAX_POLYGON_SIDES)
}
