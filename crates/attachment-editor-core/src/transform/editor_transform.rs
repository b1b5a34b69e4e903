//! The immutable editor transform value.

use std::f64::consts::{FRAC_PI_2, FRAC_PI_4};

use glam::{DAffine2, DVec2};
use serde::{Deserialize, Serialize};

use super::image_frame;
use crate::error::{EditorError, Result};
use crate::geometry::{vector_from_unit, vector_to_unit, Point, Rect, Size};

/// Smallest allowed content scaling.
pub const MIN_SCALING: f64 = 0.5;

/// Largest allowed content scaling.
pub const MAX_SCALING: f64 = 4.0;

/// How the source image and overlay items map onto the output canvas.
///
/// Transforms are never mutated in place: every edit (gesture end, crop,
/// rotate, reset, zoom, flip) builds a new value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    /// Output canvas size in pixels. Cropping changes this.
    pub output_size_pixels: Size,
    /// Offset of the content center from the canvas center, as a fraction
    /// of the canvas size.
    pub unit_translation: Point,
    /// Content rotation about its center.
    pub rotation_radians: f64,
    /// Uniform content scale, within [`MIN_SCALING`, `MAX_SCALING`] once normalized.
    pub scaling: f64,
    /// Horizontal mirror of the background image only.
    pub is_flipped: bool,
}

impl Transform {
    pub fn new(
        output_size_pixels: Size,
        unit_translation: Point,
        rotation_radians: f64,
        scaling: f64,
        is_flipped: bool,
    ) -> Self {
        Self {
            output_size_pixels,
            unit_translation,
            rotation_radians,
            scaling,
            is_flipped,
        }
    }

    /// The identity transform for a source image: output at native size,
    /// no translation, rotation or flip, unit scale.
    pub fn default_for(src_image_size_pixels: Size) -> Self {
        Self::new(src_image_size_pixels, Point::ZERO, 0.0, 1.0, false)
    }

    /// Whether this differs from [`Transform::default_for`] the given image.
    pub fn is_non_default(&self, src_image_size_pixels: Size) -> bool {
        *self != Self::default_for(src_image_size_pixels)
    }

    /// Output aspect ratio (width / height).
    pub fn output_aspect_ratio(&self) -> f64 {
        self.output_size_pixels.width / self.output_size_pixels.height
    }

    /// The largest view with the output aspect ratio that fits `available`.
    ///
    /// The on-screen view has to keep the output's aspect ratio, otherwise
    /// the preview shows content outside the output. A crop or a quarter
    /// turn changes that ratio, so hosts resize the view to this afterwards.
    pub fn fitted_view_size(&self, available: Size) -> Result<Size> {
        if !available.is_valid() {
            return Err(EditorError::invalid_geometry(
                "available view",
                available.width,
                available.height,
            ));
        }
        if !self.output_size_pixels.is_valid() {
            return Err(EditorError::invalid_geometry(
                "output",
                self.output_size_pixels.width,
                self.output_size_pixels.height,
            ));
        }
        let aspect = self.output_aspect_ratio();
        if available.width / available.height > aspect {
            Ok(Size::new(available.height * aspect, available.height))
        } else {
            Ok(Size::new(available.width, available.width / aspect))
        }
    }

    /// The affine applied to the content layer, about the view center.
    ///
    /// Composition is scale, then rotate, then translate, so the translation
    /// is unaffected by scale and rotation. A view-space drag therefore maps
    /// straight onto a unit translation delta.
    pub fn affine_transform(&self, view_size: Size) -> DAffine2 {
        let translation = vector_from_unit(self.unit_translation, view_size);
        DAffine2::from_translation(DVec2::from(translation))
            * DAffine2::from_angle(self.rotation_radians)
            * DAffine2::from_scale(DVec2::splat(self.scaling))
    }

    /// Same transform with `unit_translation` replaced.
    pub fn with_unit_translation(&self, unit_translation: Point) -> Self {
        Self {
            unit_translation,
            ..*self
        }
    }

    /// Same transform with `rotation_radians` replaced.
    pub fn with_rotation(&self, rotation_radians: f64) -> Self {
        Self {
            rotation_radians,
            ..*self
        }
    }

    /// Same transform with `scaling` replaced.
    pub fn with_scaling(&self, scaling: f64) -> Self {
        Self { scaling, ..*self }
    }

    /// Rotate a quarter turn; the output canvas swaps width and height.
    pub fn rotated_90(&self) -> Self {
        Self {
            output_size_pixels: self.output_size_pixels.swapped(),
            rotation_radians: self.rotation_radians + FRAC_PI_2,
            ..*self
        }
    }

    /// Rotate an eighth turn; the output canvas is unchanged.
    pub fn rotated_45(&self) -> Self {
        self.with_rotation(self.rotation_radians + FRAC_PI_4)
    }

    /// Double the scaling (normalization clamps it afterwards).
    pub fn zoomed_2x(&self) -> Self {
        self.with_scaling(self.scaling * 2.0)
    }

    /// Toggle the background mirror.
    pub fn flipped(&self) -> Self {
        Self {
            is_flipped: !self.is_flipped,
            ..*self
        }
    }

    /// Clamp scaling and translation so the result is a valid edit state.
    ///
    /// Scaling is clamped to [`MIN_SCALING`, `MAX_SCALING`]. Translation is
    /// then clamped so the image frame still covers the viewport wherever the
    /// scaled image is large enough to do so. The translation region is an
    /// axis-aligned rectangle in canvas space, not view space, so the clamp
    /// is done after projecting the translation back through the naive
    /// (untranslated) affine.
    pub fn normalize(&self, src_image_size_pixels: Size) -> Self {
        let scaling = self.scaling.clamp(MIN_SCALING, MAX_SCALING);
        let clamped = self.with_scaling(scaling);

        let view_size = self.output_size_pixels;
        let naive = clamped.with_unit_translation(Point::ZERO);
        let image_frame = match image_frame(view_size, src_image_size_pixels, &naive) {
            Ok(frame) => frame,
            Err(err) => {
                tracing::warn!(%err, "skipping translation clamp");
                return clamped;
            }
        };

        let naive_affine = naive.affine_transform(view_size);
        let inverse = naive_affine.inverse();

        // Bounding box of the viewport projected onto the canvas, relative
        // to the canvas center.
        let view_bounds = Rect::from_size(view_size);
        let center = view_bounds.center();
        let viewport = Rect::bounding(
            view_bounds
                .corners()
                .map(|corner| Point::from(inverse.transform_vector2((corner - center).into()))),
        )
        .unwrap_or(Rect::ZERO);

        let max_translation = Point::new(
            ((image_frame.width() - viewport.width()) * 0.5).max(0.0),
            ((image_frame.height() - viewport.height()) * 0.5).max(0.0),
        );

        let translation_view = vector_from_unit(self.unit_translation, view_size);
        let translation_canvas = Point::from(inverse.transform_vector2(translation_view.into()));
        let clamped_canvas = translation_canvas.clamp(-max_translation, max_translation);
        let clamped_view = Point::from(naive_affine.transform_vector2(clamped_canvas.into()));

        let unit_translation = match vector_to_unit(clamped_view, view_size) {
            Ok(unit) => unit,
            Err(err) => {
                tracing::warn!(%err, "keeping unclamped translation");
                self.unit_translation
            }
        };

        clamped.with_unit_translation(unit_translation)
    }
}
