//! The crop-and-transform controller.
//!
//! While the crop tool is showing, a one-finger drag either moves a crop
//! handle (when it starts near the canvas edge) or pans the content; a
//! two-finger pinch scales and rotates it. Buttons trigger the discrete
//! edits: rotate, zoom, flip and reset.

use super::{
    begin_gesture_transaction, commit_gesture_transaction, crop_rect_for_drag, crop_region_at,
    missing_gesture_state, rollback_gesture_transaction, CropRegion, GesturePhase, PinchSample,
};
use crate::config::EditorConfig;
use crate::geometry::{vector_to_unit, Point, Rect, Size};
use crate::model::EditorModel;
use crate::transform::{crop_transform, Transform, MAX_SCALING, MIN_SCALING};

#[derive(Debug, Clone, Copy, PartialEq)]
enum CropGestureState {
    Idle,
    Panning {
        start_transform: Transform,
        start_location: Point,
    },
    Pinching {
        start_transform: Transform,
        start: PinchSample,
    },
    Cropping {
        region: CropRegion,
        start_location: Point,
        crop_rect: Rect,
    },
}

pub struct CropController {
    /// Size of the on-screen canvas; also the crop bounds.
    view_size: Size,
    corner_size: f64,
    state: CropGestureState,
}

impl CropController {
    pub fn new(view_size: Size, config: &EditorConfig) -> Self {
        Self {
            view_size,
            corner_size: config.crop_corner_size,
            state: CropGestureState::Idle,
        }
    }

    pub fn view_size(&self) -> Size {
        self.view_size
    }

    pub fn set_view_size(&mut self, view_size: Size) {
        self.view_size = view_size;
    }

    pub fn set_config(&mut self, config: &EditorConfig) {
        self.corner_size = config.crop_corner_size;
    }

    /// Whether a pan, pinch or crop drag is in progress.
    pub fn is_active(&self) -> bool {
        self.state != CropGestureState::Idle
    }

    /// The live crop rectangle while a crop handle is being dragged.
    pub fn crop_rect(&self) -> Option<Rect> {
        match self.state {
            CropGestureState::Cropping { crop_rect, .. } => Some(crop_rect),
            _ => None,
        }
    }

    /// The crop handle being dragged, if any.
    pub fn active_region(&self) -> Option<CropRegion> {
        match self.state {
            CropGestureState::Cropping { region, .. } => Some(region),
            _ => None,
        }
    }

    fn bounds(&self) -> Rect {
        Rect::from_size(self.view_size)
    }

    /// One-finger drag: crop handle or content pan.
    pub fn handle_pan(&mut self, model: &mut EditorModel, phase: GesturePhase, location: Point) {
        match phase {
            GesturePhase::Began => self.begin_pan(model, location),
            GesturePhase::Changed => self.update_pan(model, location, false),
            GesturePhase::Ended => self.update_pan(model, location, true),
            GesturePhase::Cancelled => {
                if matches!(
                    self.state,
                    CropGestureState::Panning { .. } | CropGestureState::Cropping { .. }
                ) {
                    self.cancel(model);
                }
            }
        }
    }

    fn begin_pan(&mut self, model: &mut EditorModel, location: Point) {
        self.cancel(model);
        if let Some(region) = crop_region_at(location, self.bounds(), self.corner_size) {
            tracing::debug!(?region, "crop drag began");
            self.state = CropGestureState::Cropping {
                region,
                start_location: location,
                crop_rect: self.bounds(),
            };
            return;
        }
        if begin_gesture_transaction(model, "pan") {
            self.state = CropGestureState::Panning {
                start_transform: model.current_transform(),
                start_location: location,
            };
        }
    }

    fn update_pan(&mut self, model: &mut EditorModel, location: Point, ended: bool) {
        match self.state {
            CropGestureState::Panning {
                start_transform,
                start_location,
            } => {
                match vector_to_unit(location - start_location, self.view_size) {
                    Ok(delta) => {
                        let transform = start_transform
                            .with_unit_translation(start_transform.unit_translation + delta)
                            .normalize(model.src_image_size_pixels());
                        model.replace_transform(transform);
                    }
                    Err(err) => tracing::warn!(%err, "skipping pan update"),
                }
                if ended {
                    self.state = CropGestureState::Idle;
                    commit_gesture_transaction(model, "pan");
                }
            }
            CropGestureState::Cropping {
                region,
                start_location,
                ..
            } => {
                let crop_rect = crop_rect_for_drag(
                    region,
                    self.bounds(),
                    start_location,
                    location,
                    self.corner_size,
                );
                if ended {
                    self.state = CropGestureState::Idle;
                    self.commit_crop(model, crop_rect);
                } else {
                    self.state = CropGestureState::Cropping {
                        region,
                        start_location,
                        crop_rect,
                    };
                }
            }
            _ => missing_gesture_state("pan update without a pan begin"),
        }
    }

    /// Two-finger pinch: translate with the centroid, rotate and scale.
    pub fn handle_pinch(&mut self, model: &mut EditorModel, phase: GesturePhase, sample: PinchSample) {
        match phase {
            GesturePhase::Began => {
                self.cancel(model);
                if begin_gesture_transaction(model, "pinch") {
                    self.state = CropGestureState::Pinching {
                        start_transform: model.current_transform(),
                        start: sample,
                    };
                }
            }
            GesturePhase::Changed | GesturePhase::Ended => {
                let CropGestureState::Pinching {
                    start_transform,
                    start,
                } = self.state
                else {
                    missing_gesture_state("pinch update without a pinch begin");
                    return;
                };
                match vector_to_unit(sample.centroid - start.centroid, self.view_size) {
                    Ok(delta) => {
                        let transform = Transform {
                            unit_translation: start_transform.unit_translation + delta,
                            rotation_radians: start_transform.rotation_radians
                                + (sample.angle_radians - start.angle_radians),
                            scaling: (start_transform.scaling * sample.scale_from(&start))
                                .clamp(MIN_SCALING, MAX_SCALING),
                            ..start_transform
                        }
                        .normalize(model.src_image_size_pixels());
                        model.replace_transform(transform);
                    }
                    Err(err) => tracing::warn!(%err, "skipping pinch update"),
                }
                if phase == GesturePhase::Ended {
                    self.state = CropGestureState::Idle;
                    commit_gesture_transaction(model, "pinch");
                }
            }
            GesturePhase::Cancelled => {
                if matches!(self.state, CropGestureState::Pinching { .. }) {
                    self.cancel(model);
                }
            }
        }
    }

    /// Abandon any gesture in progress, restoring the model.
    pub fn cancel(&mut self, model: &mut EditorModel) {
        match std::mem::replace(&mut self.state, CropGestureState::Idle) {
            CropGestureState::Panning { .. } => rollback_gesture_transaction(model, "pan"),
            CropGestureState::Pinching { .. } => rollback_gesture_transaction(model, "pinch"),
            CropGestureState::Cropping { .. } => tracing::debug!("crop drag cancelled"),
            CropGestureState::Idle => {}
        }
    }

    fn commit_crop(&mut self, model: &mut EditorModel, crop_rect: Rect) {
        if crop_rect == self.bounds() {
            return;
        }
        let current = model.current_transform();
        match crop_transform(
            &current,
            model.src_image_size_pixels(),
            self.view_size,
            crop_rect,
        ) {
            Ok(transform) => model.replace_transform(transform),
            Err(err) => tracing::warn!(%err, "crop not committed"),
        }
    }

    pub fn rotate_90(&mut self, model: &mut EditorModel) {
        self.apply(model, |transform| transform.rotated_90());
    }

    pub fn rotate_45(&mut self, model: &mut EditorModel) {
        self.apply(model, |transform| transform.rotated_45());
    }

    pub fn zoom_2x(&mut self, model: &mut EditorModel) {
        self.apply(model, |transform| transform.zoomed_2x());
    }

    pub fn flip(&mut self, model: &mut EditorModel) {
        self.apply(model, |transform| transform.flipped());
    }

    /// Restore the default transform for the source image.
    pub fn reset(&mut self, model: &mut EditorModel) {
        let default = model.default_transform();
        self.apply(model, move |_| default);
    }

    /// Replace the transform with a normalized edit of it. An edit that
    /// changes nothing records nothing.
    fn apply(&mut self, model: &mut EditorModel, edit: impl FnOnce(Transform) -> Transform) {
        self.cancel(model);
        let current = model.current_transform();
        let next = edit(current).normalize(model.src_image_size_pixels());
        if next != current {
            model.replace_transform(next);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::FRAC_PI_2;

    const SRC: Size = Size::new(300.0, 400.0);

    fn setup() -> (CropController, EditorModel) {
        let config = EditorConfig::default();
        let model = EditorModel::new(SRC, &config).unwrap();
        (CropController::new(SRC, &config), model)
    }

    fn pinch(distance: f64, angle: f64) -> PinchSample {
        PinchSample::new(Point::new(150.0, 200.0), angle, distance)
    }

    #[test]
    fn test_pinch_halving_distance_hits_min_scaling() {
        let (mut controller, mut model) = setup();
        controller.handle_pinch(&mut model, GesturePhase::Began, pinch(100.0, 0.0));
        controller.handle_pinch(&mut model, GesturePhase::Changed, pinch(50.0, 0.0));
        assert_eq!(model.current_transform().scaling, 0.5);
        assert!(model.current_transform().unit_translation.fuzzy_eq(Point::ZERO, 1e-12));
    }

    #[test]
    fn test_pinch_rotates_and_commits() {
        let (mut controller, mut model) = setup();
        controller.handle_pinch(&mut model, GesturePhase::Began, pinch(100.0, 0.2));
        controller.handle_pinch(&mut model, GesturePhase::Changed, pinch(150.0, 0.5));
        assert!(controller.is_active());
        assert!(!model.can_undo());
        controller.handle_pinch(&mut model, GesturePhase::Ended, pinch(200.0, 0.7));

        let transform = model.current_transform();
        assert!((transform.rotation_radians - 0.5).abs() < 1e-12);
        assert_eq!(transform.scaling, 2.0);
        assert!(!controller.is_active());

        assert!(model.undo());
        assert_eq!(model.current_transform(), model.default_transform());
        assert!(!model.can_undo());
    }

    #[test]
    fn test_pinch_cancel_restores() {
        let (mut controller, mut model) = setup();
        controller.handle_pinch(&mut model, GesturePhase::Began, pinch(100.0, 0.0));
        controller.handle_pinch(&mut model, GesturePhase::Changed, pinch(300.0, 1.0));
        controller.handle_pinch(&mut model, GesturePhase::Cancelled, pinch(300.0, 1.0));
        assert_eq!(model.current_transform(), model.default_transform());
        assert!(!model.is_dirty());
        assert!(!model.in_transaction());
    }

    #[test]
    fn test_pan_translates_zoomed_content() {
        let (mut controller, mut model) = setup();
        controller.zoom_2x(&mut model);
        controller.handle_pan(&mut model, GesturePhase::Began, Point::new(150.0, 200.0));
        controller.handle_pan(&mut model, GesturePhase::Ended, Point::new(180.0, 200.0));

        let transform = model.current_transform();
        assert!(transform.unit_translation.fuzzy_eq(Point::new(0.1, 0.0), 1e-9));

        // One undo entry for the zoom, one for the pan.
        assert!(model.undo());
        assert_eq!(model.current_transform().scaling, 2.0);
        assert!(model.current_transform().unit_translation.fuzzy_eq(Point::ZERO, 1e-12));
    }

    #[test]
    fn test_pan_is_clamped_by_normalization() {
        let (mut controller, mut model) = setup();
        controller.handle_pan(&mut model, GesturePhase::Began, Point::new(150.0, 200.0));
        controller.handle_pan(&mut model, GesturePhase::Changed, Point::new(250.0, 300.0));
        // At scaling 1 the image exactly covers the canvas.
        assert!(model.current_transform().unit_translation.fuzzy_eq(Point::ZERO, 1e-9));
        controller.handle_pan(&mut model, GesturePhase::Ended, Point::new(250.0, 300.0));
        assert!(!model.is_dirty());
    }

    #[test]
    fn test_pan_cancel_restores() {
        let (mut controller, mut model) = setup();
        controller.zoom_2x(&mut model);
        let zoomed = model.current_transform();
        controller.handle_pan(&mut model, GesturePhase::Began, Point::new(150.0, 200.0));
        controller.handle_pan(&mut model, GesturePhase::Changed, Point::new(200.0, 250.0));
        assert_ne!(model.current_transform(), zoomed);
        controller.handle_pan(&mut model, GesturePhase::Cancelled, Point::new(200.0, 250.0));
        assert_eq!(model.current_transform(), zoomed);
    }

    #[test]
    fn test_crop_drag_commits_on_end() {
        let (mut controller, mut model) = setup();
        controller.handle_pan(&mut model, GesturePhase::Began, Point::new(5.0, 5.0));
        assert_eq!(controller.active_region(), Some(CropRegion::TopLeft));
        controller.handle_pan(&mut model, GesturePhase::Changed, Point::new(50.0, 50.0));
        assert_eq!(controller.crop_rect(), Some(Rect::new(45.0, 45.0, 255.0, 355.0)));
        // Nothing is committed while dragging.
        assert_eq!(model.current_transform(), model.default_transform());

        controller.handle_pan(&mut model, GesturePhase::Ended, Point::new(50.0, 50.0));
        assert_eq!(controller.crop_rect(), None);
        assert_eq!(model.current_transform().output_size_pixels, Size::new(255.0, 355.0));
        assert!(model.can_undo());

        // The output got narrower, so the view is refitted before the next drag.
        let fitted = model.current_transform().fitted_view_size(SRC).unwrap();
        assert_eq!(fitted.height, 400.0);
        assert!((fitted.width / fitted.height - 255.0 / 355.0).abs() < 1e-12);
        controller.set_view_size(fitted);

        let corner = Point::new(fitted.width - 5.0, fitted.height - 5.0);
        controller.handle_pan(&mut model, GesturePhase::Began, corner);
        assert_eq!(controller.active_region(), Some(CropRegion::BottomRight));
        controller.handle_pan(&mut model, GesturePhase::Changed, corner - Point::new(20.0, 20.0));
        assert_eq!(
            controller.crop_rect(),
            Some(Rect::new(0.0, 0.0, fitted.width - 20.0, 380.0))
        );
        controller.handle_pan(&mut model, GesturePhase::Ended, corner - Point::new(20.0, 20.0));
        assert_eq!(model.current_transform().output_size_pixels, Size::new(237.0, 337.0));
    }

    #[test]
    fn test_crop_drag_cancel_commits_nothing() {
        let (mut controller, mut model) = setup();
        controller.handle_pan(&mut model, GesturePhase::Began, Point::new(295.0, 395.0));
        controller.handle_pan(&mut model, GesturePhase::Changed, Point::new(200.0, 300.0));
        controller.handle_pan(&mut model, GesturePhase::Cancelled, Point::new(200.0, 300.0));
        assert_eq!(controller.crop_rect(), None);
        assert!(!model.is_dirty());
    }

    #[test]
    fn test_crop_drag_without_movement_records_nothing() {
        let (mut controller, mut model) = setup();
        controller.handle_pan(&mut model, GesturePhase::Began, Point::new(5.0, 200.0));
        controller.handle_pan(&mut model, GesturePhase::Ended, Point::new(2.0, 200.0));
        assert!(!model.is_dirty());
    }

    #[test]
    fn test_rotate_90_swaps_output() {
        let (mut controller, mut model) = setup();
        controller.rotate_90(&mut model);
        let transform = model.current_transform();
        assert_eq!(transform.output_size_pixels, Size::new(400.0, 300.0));
        assert!((transform.rotation_radians - FRAC_PI_2).abs() < 1e-12);
    }

    #[test]
    fn test_zoom_is_clamped() {
        let (mut controller, mut model) = setup();
        for _ in 0..3 {
            controller.zoom_2x(&mut model);
        }
        assert_eq!(model.current_transform().scaling, MAX_SCALING);
    }

    #[test]
    fn test_flip_toggles() {
        let (mut controller, mut model) = setup();
        controller.flip(&mut model);
        assert!(model.current_transform().is_flipped);
        controller.flip(&mut model);
        assert!(!model.current_transform().is_flipped);
    }

    #[test]
    fn test_reset_is_idempotent() {
        let (mut controller, mut model) = setup();
        controller.rotate_45(&mut model);
        controller.zoom_2x(&mut model);
        controller.flip(&mut model);

        controller.reset(&mut model);
        let once = model.current_transform();
        controller.reset(&mut model);
        assert_eq!(model.current_transform(), once);
        assert_eq!(once, model.default_transform());

        // The second reset changed nothing and recorded nothing.
        assert!(model.undo());
        assert!(model.current_transform().is_flipped);
    }

    #[test]
    fn test_discrete_edit_cancels_active_pan() {
        let (mut controller, mut model) = setup();
        controller.zoom_2x(&mut model);
        controller.handle_pan(&mut model, GesturePhase::Began, Point::new(150.0, 200.0));
        controller.handle_pan(&mut model, GesturePhase::Changed, Point::new(200.0, 250.0));
        controller.flip(&mut model);

        assert!(!controller.is_active());
        assert!(!model.in_transaction());
        let transform = model.current_transform();
        assert!(transform.is_flipped);
        assert!(transform.unit_translation.fuzzy_eq(Point::ZERO, 1e-12));
    }

    #[test]
    #[cfg_attr(debug_assertions, should_panic(expected = "Missing data"))]
    fn test_update_without_begin() {
        let (mut controller, mut model) = setup();
        controller.handle_pan(&mut model, GesturePhase::Changed, Point::new(10.0, 10.0));
        assert!(!model.is_dirty());
    }
}
