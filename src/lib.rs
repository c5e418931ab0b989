//! annotrace - image annotation core
//!
//! Freehand strokes are refined into clean polygons or oriented boxes by
//! edge detection, rectangles are dragged out and edited with handles, and
//! every change to the annotation set can be undone. The crate has no UI of
//! its own: hosts feed it input events and paint the [`canvas::Scene`] it
//! produces. Runs natively and in the browser.

pub mod canvas;
pub mod color_utils;
pub mod config;
pub mod constants;
pub mod error;
pub mod event;
pub mod interaction;
pub mod keybindings;
pub mod model;
pub mod normalize;
pub mod replay;
pub mod store;
pub mod undo;
pub mod view;

pub use annotrace_vision::{Point, RefineParams, RefinedShape, ShapeRequest};
pub use canvas::{CanvasSurface, Scene};
pub use config::{AppConfig, ConfigError};
pub use error::{AnnotatorError, Result};
pub use event::{InputEvent, Key, Modifiers};
#[cfg(not(target_arch = "wasm32"))]
pub use interaction::BackgroundRefiner;
pub use interaction::{Annotator, InlineRefiner, RefinementRunner, RefinementStatus};
pub use model::{Annotation, AnnotationId, BoundingBox, Shape, ShapeKind, ShapeMode, ToolMode};
pub use replay::ReplayScript;
pub use store::AnnotationStore;

// WASM entry point
#[cfg(target_arch = "wasm32")]
mod wasm;

#[cfg(target_arch = "wasm32")]
pub use wasm::*;
