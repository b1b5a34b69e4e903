//! Gesture controllers.
//!
//! The host forwards raw gesture samples here; controllers turn them into
//! model edits. Each controller is a small state machine:
//!
//! ```text
//! Idle --Began--> Active(start snapshot) --Changed--> Active
//!                        |                  --Ended----> Idle (commit)
//!                        |                  --Cancelled-> Idle (roll back)
//! ```
//!
//! Continuous gestures run inside a model transaction, so every
//! intermediate state is rendered but only `Ended` leaves an undo entry.
//! A cancelled gesture leaves the model exactly as it was before `Began`.
//!
//! An update that arrives without its `Began` is a host bug: it asserts in
//! debug builds and is logged and ignored in release builds.

mod brush;
mod crop;
mod region;
mod text;

use serde::{Deserialize, Serialize};

pub use brush::BrushController;
pub use crop::CropController;
pub use region::{crop_rect_for_drag, crop_region_at, CropRegion};
pub use text::TextItemController;

use crate::error::EditorError;
use crate::geometry::Point;
use crate::model::EditorModel;

/// Lifecycle phase of a continuous gesture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GesturePhase {
    Began,
    Changed,
    Ended,
    Cancelled,
}

/// One sample of a two-finger pinch/rotate gesture, in view space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PinchSample {
    pub centroid: Point,
    pub angle_radians: f64,
    /// Distance between the two touches.
    pub distance: f64,
}

impl PinchSample {
    pub fn new(centroid: Point, angle_radians: f64, distance: f64) -> Self {
        Self {
            centroid,
            angle_radians,
            distance,
        }
    }

    /// Ratio of this sample's touch distance to `start`'s. The start
    /// distance is floored at one point so a collapsed pinch can't divide
    /// by zero.
    pub fn scale_from(&self, start: &PinchSample) -> f64 {
        self.distance / start.distance.max(1.0)
    }
}

/// Report a gesture update that has no matching begin.
pub(crate) fn missing_gesture_state(context: &'static str) {
    let err = EditorError::MissingData(context);
    tracing::error!(%err, "ignoring gesture update");
    debug_assert!(false, "{err}");
}

/// Open the transaction a continuous gesture runs in.
pub(crate) fn begin_gesture_transaction(model: &mut EditorModel, gesture: &'static str) -> bool {
    match model.begin_transaction() {
        Ok(()) => {
            tracing::debug!(gesture, "gesture began");
            true
        }
        Err(err) => {
            tracing::warn!(gesture, %err, "gesture ignored");
            false
        }
    }
}

pub(crate) fn commit_gesture_transaction(model: &mut EditorModel, gesture: &'static str) {
    match model.commit_transaction() {
        Ok(()) => tracing::debug!(gesture, "gesture committed"),
        Err(err) => tracing::error!(gesture, %err, "gesture commit failed"),
    }
}

pub(crate) fn rollback_gesture_transaction(model: &mut EditorModel, gesture: &'static str) {
    match model.rollback_transaction() {
        Ok(()) => tracing::debug!(gesture, "gesture cancelled"),
        Err(err) => tracing::error!(gesture, %err, "gesture rollback failed"),
    }
}
