use annotrace_vision::Point;
use wasm_bindgen::prelude::*;

use crate::canvas::CanvasSurface;
use crate::config::AppConfig;
use crate::event::{InputEvent, Key, Modifiers};
use crate::interaction::Annotator;
use crate::model::{ShapeMode, ToolMode};

#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();

    let level = AppConfig::default().preferences.log_level.to_level();
    if console_log::init_with_level(level).is_err() {
        log::debug!("Logger already initialised");
    }
    log::info!("annotrace WASM starting...");
}

fn js_error(e: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&e.to_string())
}

/// Annotator bound to an HTML canvas.
///
/// The host forwards pointer and keyboard events, repaints from
/// [`WebAnnotator::scene_json`] whenever a method returns true, and calls
/// [`WebAnnotator::tick`] once per animation frame.
#[wasm_bindgen]
pub struct WebAnnotator {
    surface: CanvasSurface,
}

#[wasm_bindgen]
impl WebAnnotator {
    /// Create an annotator, optionally from a JSON configuration.
    #[wasm_bindgen(constructor)]
    pub fn new(config_json: Option<String>) -> Result<WebAnnotator, JsValue> {
        let config = match config_json {
            Some(json) => AppConfig::from_json(&json).map_err(js_error)?,
            None => AppConfig::default(),
        };
        Ok(Self {
            surface: CanvasSurface::new(Annotator::new(&config)),
        })
    }

    /// Decode and show an image. Clears all annotations.
    pub fn load_image(&mut self, bytes: &[u8]) -> Result<(), JsValue> {
        self.surface
            .annotator_mut()
            .load_image_bytes(bytes)
            .map_err(js_error)
    }

    pub fn unload_image(&mut self) {
        self.surface.annotator_mut().unload_image();
    }

    pub fn set_canvas_size(&mut self, width: f32, height: f32) {
        self.surface.annotator_mut().set_canvas_size(width, height);
    }

    pub fn pointer_down(&mut self, x: f32, y: f32) -> bool {
        self.surface.dispatch(&InputEvent::PointerDown {
            position: Point::new(x, y),
        })
    }

    pub fn pointer_move(&mut self, x: f32, y: f32) -> bool {
        self.surface.dispatch(&InputEvent::PointerMove {
            position: Point::new(x, y),
        })
    }

    pub fn pointer_up(&mut self, x: f32, y: f32) -> bool {
        self.surface.dispatch(&InputEvent::PointerUp {
            position: Point::new(x, y),
        })
    }

    pub fn wheel(&mut self, delta: f32) -> bool {
        self.surface.dispatch(&InputEvent::Wheel { delta })
    }

    /// Forward a `keydown`. `key` is the DOM `KeyboardEvent.key` value.
    pub fn key_down(&mut self, key: &str, ctrl: bool, meta: bool, shift: bool, alt: bool) -> bool {
        self.surface.dispatch(&InputEvent::KeyDown {
            key: Key::from_dom_key(key),
            modifiers: Modifiers {
                shift,
                ctrl,
                alt,
                meta,
            },
        })
    }

    /// Poll for finished refinements. Returns true if a repaint is due.
    pub fn tick(&mut self) -> bool {
        self.surface.tick()
    }

    pub fn zoom_in(&mut self) {
        self.surface.annotator_mut().zoom_in();
    }

    pub fn zoom_out(&mut self) {
        self.surface.annotator_mut().zoom_out();
    }

    pub fn reset_zoom(&mut self) {
        self.surface.annotator_mut().reset_zoom();
    }

    pub fn zoom(&self) -> f32 {
        self.surface.annotator().view().zoom()
    }

    /// "draw", "rectangle" or "select".
    pub fn set_tool(&mut self, name: &str) -> Result<(), JsValue> {
        let tool = ToolMode::from_name(name)
            .ok_or_else(|| JsValue::from_str(&format!("Unknown tool: {}", name)))?;
        self.surface.annotator_mut().set_tool_mode(tool);
        Ok(())
    }

    pub fn tool(&self) -> String {
        self.surface.annotator().tool_mode().name().to_lowercase()
    }

    /// "polygon" or "bbox".
    pub fn set_shape_mode(&mut self, name: &str) -> Result<(), JsValue> {
        let mode = ShapeMode::from_name(name)
            .ok_or_else(|| JsValue::from_str(&format!("Unknown shape mode: {}", name)))?;
        self.surface.annotator_mut().set_shape_mode(mode);
        Ok(())
    }

    pub fn shape_mode(&self) -> String {
        self.surface.annotator().shape_mode().kind().name().to_string()
    }

    pub fn set_polygon_sides(&mut self, sides: u8) {
        self.surface.annotator_mut().set_polygon_sides(sides);
    }

    pub fn set_refinement_enabled(&mut self, enabled: bool) {
        self.surface.annotator_mut().set_refinement_enabled(enabled);
    }

    /// Refinement indicator text.
    pub fn status(&self) -> String {
        self.surface.annotator().refinement_status().label().to_string()
    }

    pub fn undo(&mut self) -> bool {
        self.surface.annotator_mut().undo()
    }

    pub fn delete_selected(&mut self) -> bool {
        self.surface.annotator_mut().delete_selected()
    }

    pub fn clear_all(&mut self) -> bool {
        self.surface.annotator_mut().clear_all()
    }

    /// Annotations as pretty JSON.
    pub fn to_json(&self) -> Result<String, JsValue> {
        self.surface.annotator().to_json().map_err(js_error)
    }

    /// Display list for the current frame.
    pub fn scene_json(&mut self) -> Result<String, JsValue> {
        self.surface.scene().to_json().map_err(js_error)
    }

    /// Register a function called with the annotation JSON after every change.
    pub fn set_change_callback(&mut self, callback: js_sys::Function) {
        self.surface
            .annotator_mut()
            .set_change_listener(move |annotations| {
                let json = match serde_json::to_string(annotations) {
                    Ok(json) => json,
                    Err(e) => {
                        log::error!("Failed to serialize annotations: {}", e);
                        return;
                    }
                };
                if let Err(e) = callback.call1(&JsValue::NULL, &JsValue::from_str(&json)) {
                    log::warn!("Change callback threw: {:?}", e);
                }
            });
    }

    pub fn clear_change_callback(&mut self) {
        self.surface.annotator_mut().store_mut().clear_change_listener();
    }
}
