//! Scripted input sequences.
//!
//! A replay script is a JSON file with optional starting modes and a list
//! of [`InputEvent`]s:
//!
//! ```json
//! {
//!   "tool": "rectangle",
//!   "events": [
//!     { "type": "pointer_down", "position": { "x": 50, "y": 50 } },
//!     { "type": "pointer_move", "position": { "x": 150, "y": 120 } },
//!     { "type": "pointer_up", "position": { "x": 150, "y": 120 } }
//!   ]
//! }
//! ```

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{AnnotatorError, Result};
use crate::event::InputEvent;
use crate::interaction::Annotator;
use crate::model::{ShapeMode, ToolMode};

/// How long to wait for each background refinement before giving up.
const DEFAULT_REFINE_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReplayScript {
    pub shape_mode: Option<ShapeMode>,
    /// Applied after `shape_mode`, which may switch the tool
    pub tool: Option<ToolMode>,
    pub polygon_sides: Option<u8>,
    pub events: Vec<InputEvent>,
}

/// What happened during a replay.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReplayReport {
    pub events: usize,
    pub handled: usize,
    /// Background refinements that timed out
    pub timed_out: usize,
}

impl ReplayScript {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(AnnotatorError::FileNotFound {
                path: path.to_path_buf(),
            });
        }
        Self::from_json(&std::fs::read_to_string(path)?)
    }

    /// Apply the starting modes, then feed every event to the annotator.
    ///
    /// Refinement is awaited after each pointer-up so results land in the
    /// same order a user would see them.
    pub fn run(&self, annotator: &mut Annotator) -> ReplayReport {
        self.run_with_timeout(annotator, DEFAULT_REFINE_TIMEOUT)
    }

    pub fn run_with_timeout(&self, annotator: &mut Annotator, timeout: Duration) -> ReplayReport {
        if let Some(mode) = self.shape_mode {
            annotator.set_shape_mode(mode);
        }
        if let Some(tool) = self.tool {
            annotator.set_tool_mode(tool);
        }
        if let Some(sides) = self.polygon_sides {
            annotator.set_polygon_sides(sides);
        }

        let mut report = ReplayReport {
            events: self.events.len(),
            ..ReplayReport::default()
        };
        for event in &self.events {
            if annotator.handle_event(event) {
                report.handled += 1;
            }
            if matches!(event, InputEvent::PointerUp { .. }) && annotator.is_refining() {
                annotator.wait_for_refinement(timeout);
                if annotator.is_refining() {
                    log::warn!("Refinement did not finish within {:?}", timeout);
                    report.timed_out += 1;
                }
            }
        }
        annotator.pump_refinements();
        log::info!(
            "Replayed {} events ({} handled), {} annotations",
            report.events,
            report.handled,
            annotator.annotations().len()
        );
        report
    }
}
