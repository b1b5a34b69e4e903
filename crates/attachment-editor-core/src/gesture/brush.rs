//! Free-hand drawing.

use super::{
    begin_gesture_transaction, commit_gesture_transaction, missing_gesture_state,
    rollback_gesture_transaction, GesturePhase,
};
use crate::config::EditorConfig;
use crate::geometry::{Point, Size};
use crate::item::{Color, ItemId, StrokeItem};
use crate::model::EditorModel;
use crate::transform::location_image_unit;

/// Turns a one-finger drag into a stroke item.
///
/// The stroke is appended on `Began` and replaced (same id) with more
/// samples on every update, so the renderer only rebuilds that one layer.
pub struct BrushController {
    view_size: Size,
    color: Color,
    default_unit_stroke_width: f64,
    active: Option<StrokeItem>,
}

impl BrushController {
    pub fn new(view_size: Size, color: Color, config: &EditorConfig) -> Self {
        Self {
            view_size,
            color,
            default_unit_stroke_width: config.default_unit_stroke_width,
            active: None,
        }
    }

    pub fn set_view_size(&mut self, view_size: Size) {
        self.view_size = view_size;
    }

    pub fn set_config(&mut self, config: &EditorConfig) {
        self.default_unit_stroke_width = config.default_unit_stroke_width;
    }

    pub fn color(&self) -> Color {
        self.color
    }

    /// Color for the next stroke.
    pub fn set_color(&mut self, color: Color) {
        self.color = color;
    }

    /// Id of the stroke being drawn.
    pub fn active_item_id(&self) -> Option<&ItemId> {
        self.active.as_ref().map(|stroke| &stroke.item_id)
    }

    /// Feed touch locations (view space) for one gesture phase. On `Began`
    /// pass the touch history followed by the current location.
    pub fn handle_stroke(&mut self, model: &mut EditorModel, phase: GesturePhase, locations: &[Point]) {
        match phase {
            GesturePhase::Began => self.begin(model, locations),
            GesturePhase::Changed | GesturePhase::Ended => {
                let Some(stroke) = self.active.take() else {
                    missing_gesture_state("stroke update without a stroke begin");
                    return;
                };
                let mut samples = stroke.unit_samples.clone();
                self.append_samples(model, &mut samples, locations);
                let stroke = if samples.len() != stroke.unit_samples.len() {
                    let extended = stroke.with_unit_samples(samples);
                    if let Err(err) = model.replace_item(extended.clone()) {
                        tracing::error!(%err, "stroke vanished while drawing");
                    }
                    extended
                } else {
                    stroke
                };
                if phase == GesturePhase::Ended {
                    commit_gesture_transaction(model, "stroke");
                } else {
                    self.active = Some(stroke);
                }
            }
            GesturePhase::Cancelled => self.cancel(model),
        }
    }

    /// Abandon the stroke in progress; it is removed from the model.
    pub fn cancel(&mut self, model: &mut EditorModel) {
        if self.active.take().is_some() {
            rollback_gesture_transaction(model, "stroke");
        }
    }

    fn begin(&mut self, model: &mut EditorModel, locations: &[Point]) {
        self.cancel(model);
        if !begin_gesture_transaction(model, "stroke") {
            return;
        }
        let mut samples = Vec::with_capacity(locations.len());
        self.append_samples(model, &mut samples, locations);

        let unit_stroke_width = self.default_unit_stroke_width / model.current_transform().scaling;
        let stroke = StrokeItem::new(self.color, samples, unit_stroke_width);
        match model.append_item(stroke.clone()) {
            Ok(()) => self.active = Some(stroke),
            Err(err) => {
                tracing::error!(%err, "could not add stroke");
                rollback_gesture_transaction(model, "stroke");
            }
        }
    }

    /// Convert view locations to image unit samples, skipping repeats of
    /// the previous sample.
    fn append_samples(&self, model: &EditorModel, samples: &mut Vec<Point>, locations: &[Point]) {
        let transform = model.current_transform();
        let src_size = model.src_image_size_pixels();
        for &location in locations {
            let sample = match location_image_unit(location, self.view_size, src_size, &transform) {
                Ok(sample) => sample,
                Err(err) => {
                    tracing::warn!(%err, "dropping stroke sample");
                    continue;
                }
            };
            if samples.last() != Some(&sample) {
                samples.push(sample);
            }
        }
    }
}
