//! Moving, scaling and rotating text items.

use super::{
    begin_gesture_transaction, commit_gesture_transaction, missing_gesture_state,
    rollback_gesture_transaction, GesturePhase, PinchSample,
};
use crate::geometry::{Point, Size};
use crate::item::{ItemId, TextItem};
use crate::model::EditorModel;
use crate::transform::location_image_unit;

#[derive(Debug, Clone, PartialEq)]
enum TextGestureState {
    Idle,
    Moving {
        start_item: TextItem,
        start_location: Point,
    },
    Pinching {
        start_item: TextItem,
        start: PinchSample,
    },
}

/// Drags and pinches a text item the host hit-tested at gesture start.
pub struct TextItemController {
    view_size: Size,
    state: TextGestureState,
}

impl TextItemController {
    pub fn new(view_size: Size) -> Self {
        Self {
            view_size,
            state: TextGestureState::Idle,
        }
    }

    pub fn set_view_size(&mut self, view_size: Size) {
        self.view_size = view_size;
    }

    /// Id of the text item being manipulated.
    pub fn active_item_id(&self) -> Option<&ItemId> {
        match &self.state {
            TextGestureState::Moving { start_item, .. }
            | TextGestureState::Pinching { start_item, .. } => Some(&start_item.item_id),
            TextGestureState::Idle => None,
        }
    }

    /// One-finger drag of `item_id`. The id is only read on `Began`.
    pub fn handle_pan(
        &mut self,
        model: &mut EditorModel,
        phase: GesturePhase,
        item_id: &ItemId,
        location: Point,
    ) {
        match phase {
            GesturePhase::Began => {
                self.cancel(model);
                let Some(start_item) = self.begin(model, item_id, "text move") else {
                    return;
                };
                self.state = TextGestureState::Moving {
                    start_item,
                    start_location: location,
                };
            }
            GesturePhase::Changed | GesturePhase::Ended => {
                let TextGestureState::Moving {
                    start_item,
                    start_location,
                } = &self.state
                else {
                    missing_gesture_state("text move update without a begin");
                    return;
                };
                if let Some(unit_center) = self.moved_center(model, start_item, *start_location, location) {
                    let moved = start_item.with_unit_center(unit_center);
                    self.replace(model, moved);
                }
                if phase == GesturePhase::Ended {
                    self.state = TextGestureState::Idle;
                    commit_gesture_transaction(model, "text move");
                }
            }
            GesturePhase::Cancelled => {
                if matches!(self.state, TextGestureState::Moving { .. }) {
                    self.cancel(model);
                }
            }
        }
    }

    /// Two-finger pinch of `item_id`: moves with the centroid, rotates and
    /// scales. The id is only read on `Began`.
    pub fn handle_pinch(
        &mut self,
        model: &mut EditorModel,
        phase: GesturePhase,
        item_id: &ItemId,
        sample: PinchSample,
    ) {
        match phase {
            GesturePhase::Began => {
                self.cancel(model);
                let Some(start_item) = self.begin(model, item_id, "text pinch") else {
                    return;
                };
                self.state = TextGestureState::Pinching {
                    start_item,
                    start: sample,
                };
            }
            GesturePhase::Changed | GesturePhase::Ended => {
                let TextGestureState::Pinching { start_item, start } = &self.state else {
                    missing_gesture_state("text pinch update without a begin");
                    return;
                };
                if let Some(unit_center) =
                    self.moved_center(model, start_item, start.centroid, sample.centroid)
                {
                    let pinched = start_item.with_unit_center_scaling_rotation(
                        unit_center,
                        start_item.scaling * sample.scale_from(start),
                        start_item.rotation_radians + (sample.angle_radians - start.angle_radians),
                    );
                    self.replace(model, pinched);
                }
                if phase == GesturePhase::Ended {
                    self.state = TextGestureState::Idle;
                    commit_gesture_transaction(model, "text pinch");
                }
            }
            GesturePhase::Cancelled => {
                if matches!(self.state, TextGestureState::Pinching { .. }) {
                    self.cancel(model);
                }
            }
        }
    }

    /// Abandon the gesture in progress, restoring the item.
    pub fn cancel(&mut self, model: &mut EditorModel) {
        match std::mem::replace(&mut self.state, TextGestureState::Idle) {
            TextGestureState::Moving { .. } => rollback_gesture_transaction(model, "text move"),
            TextGestureState::Pinching { .. } => rollback_gesture_transaction(model, "text pinch"),
            TextGestureState::Idle => {}
        }
    }

    fn begin(&self, model: &mut EditorModel, item_id: &ItemId, gesture: &'static str) -> Option<TextItem> {
        let Some(item) = model.item(item_id).and_then(|item| item.as_text()).cloned() else {
            tracing::warn!(%item_id, gesture, "no text item to manipulate");
            return None;
        };
        begin_gesture_transaction(model, gesture).then_some(item)
    }

    /// The start center moved by the image-unit distance between two view
    /// locations, kept inside the image.
    fn moved_center(&self, model: &EditorModel, start_item: &TextItem, from: Point, to: Point) -> Option<Point> {
        let transform = model.current_transform();
        let src_size = model.src_image_size_pixels();
        let project = |location| location_image_unit(location, self.view_size, src_size, &transform);
        match (project(from), project(to)) {
            (Ok(from), Ok(to)) => Some((start_item.unit_center + (to - from)).clamp01()),
            (Err(err), _) | (_, Err(err)) => {
                tracing::warn!(%err, "skipping text gesture update");
                None
            }
        }
    }

    fn replace(&self, model: &mut EditorModel, item: TextItem) {
        if model.item(&item.item_id).and_then(|current| current.as_text()) == Some(&item) {
            return;
        }
        if let Err(err) = model.replace_item(item) {
            tracing::error!(%err, "text item vanished during gesture");
        }
    }
}
