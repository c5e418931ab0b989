//! Pointer and keyboard interaction.
//!
//! [`Annotator`] is the state machine behind the canvas. It turns freehand
//! strokes into refined shapes, drags and resizes rectangles, selects
//! annotations and maps keys to actions.

mod annotator;
pub mod rectangle;
pub mod refinement;

#[cfg(test)]
mod tests;

pub use annotator::{Annotator, Gesture};
pub use rectangle::Handle;
#[cfg(not(target_arch = "wasm32"))]
pub use refinement::BackgroundRefiner;
pub use refinement::{
    InlineRefiner, RefinementJob, RefinementOutcome, RefinementRunner, RefinementStatus,
};
