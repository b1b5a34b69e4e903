//! Text labels.

use serde::{Deserialize, Serialize};

use super::{Color, ItemId};
use crate::geometry::Point;
use crate::transform::{MAX_SCALING, MIN_SCALING};

/// Default maximum text width as a fraction of the image width.
pub const DEFAULT_TEXT_UNIT_WIDTH: f64 = 0.9;

/// Font family and reference point size.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FontDescriptor {
    pub family: String,
    pub point_size: f64,
}

impl FontDescriptor {
    pub fn new(family: impl Into<String>, point_size: f64) -> Self {
        Self {
            family: family.into(),
            point_size,
        }
    }

    /// Same family at a different size.
    pub fn with_size(&self, point_size: f64) -> Self {
        Self {
            family: self.family.clone(),
            point_size,
        }
    }
}

/// A text label centered at a point in image unit space.
///
/// The font size is relative to `font_reference_image_width`: the image
/// frame width at the time the text was created. Rendering rescales it by
/// the current frame width, so text keeps its size relative to the image
/// through crops and rotations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextItem {
    pub item_id: ItemId,
    pub text: String,
    pub color: Color,
    pub font: FontDescriptor,
    pub font_reference_image_width: f64,
    pub unit_center: Point,
    /// Maximum layout width as a fraction of the image frame width.
    pub unit_width: f64,
    pub rotation_radians: f64,
    /// Clamped to [`MIN_SCALING`, `MAX_SCALING`].
    pub scaling: f64,
}

impl TextItem {
    /// A centered, unrotated, unit-scale label with a fresh id.
    pub fn new(
        text: impl Into<String>,
        color: Color,
        font: FontDescriptor,
        font_reference_image_width: f64,
    ) -> Self {
        Self {
            item_id: ItemId::generate(),
            text: text.into(),
            color,
            font,
            font_reference_image_width,
            unit_center: Point::UNIT_MIDPOINT,
            unit_width: DEFAULT_TEXT_UNIT_WIDTH,
            rotation_radians: 0.0,
            scaling: 1.0,
        }
    }

    /// An empty label, ready for the host to fill in.
    pub fn empty(color: Color, font: FontDescriptor, font_reference_image_width: f64) -> Self {
        Self::new("", color, font, font_reference_image_width)
    }

    pub fn with_text(&self, text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..self.clone()
        }
    }

    pub fn with_color(&self, color: Color) -> Self {
        Self {
            color,
            ..self.clone()
        }
    }

    pub fn with_unit_width(&self, unit_width: f64) -> Self {
        Self {
            unit_width,
            ..self.clone()
        }
    }

    pub fn with_unit_center(&self, unit_center: Point) -> Self {
        Self {
            unit_center,
            ..self.clone()
        }
    }

    /// Same label with a new center, scaling (clamped) and rotation.
    pub fn with_unit_center_scaling_rotation(
        &self,
        unit_center: Point,
        scaling: f64,
        rotation_radians: f64,
    ) -> Self {
        Self {
            unit_center,
            scaling: scaling.clamp(MIN_SCALING, MAX_SCALING),
            rotation_radians,
            ..self.clone()
        }
    }

    /// Text renders at its own scaling so it stays sharp when enlarged.
    pub fn output_scale(&self) -> f64 {
        self.scaling
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> TextItem {
        TextItem::new("Hello", Color::WHITE, FontDescriptor::new("Sans", 32.0), 800.0)
    }

    #[test]
    fn test_new_defaults() {
        let item = sample();
        assert_eq!(item.unit_center, Point::UNIT_MIDPOINT);
        assert_eq!(item.unit_width, DEFAULT_TEXT_UNIT_WIDTH);
        assert_eq!(item.scaling, 1.0);
        assert_eq!(item.rotation_radians, 0.0);
    }

    #[test]
    fn test_empty() {
        let item = TextItem::empty(Color::BLACK, FontDescriptor::new("Sans", 20.0), 500.0);
        assert!(item.text.is_empty());
    }

    #[test]
    fn test_copies_preserve_identity_and_other_fields() {
        let item = sample();

        let moved = item.with_unit_center(Point::new(0.2, 0.3));
        assert_eq!(moved.item_id, item.item_id);
        assert_eq!(moved.text, item.text);
        assert_eq!(moved.scaling, item.scaling);
        assert_eq!(moved.unit_center, Point::new(0.2, 0.3));

        let recolored = item.with_color(Color::BLACK);
        assert_eq!(recolored.item_id, item.item_id);
        assert_eq!(recolored.unit_center, item.unit_center);
        assert_eq!(recolored.color, Color::BLACK);

        let retexted = item.with_text("World");
        assert_eq!(retexted.item_id, item.item_id);
        assert_eq!(retexted.font, item.font);
        assert_eq!(retexted.text, "World");
    }

    #[test]
    fn test_scaling_is_clamped() {
        let item = sample();
        let big = item.with_unit_center_scaling_rotation(Point::UNIT_MIDPOINT, 10.0, 0.5);
        let small = item.with_unit_center_scaling_rotation(Point::UNIT_MIDPOINT, 0.01, 0.5);
        assert_eq!(big.scaling, MAX_SCALING);
        assert_eq!(small.scaling, MIN_SCALING);
        assert_eq!(big.rotation_radians, 0.5);
        assert_eq!(big.item_id, item.item_id);
    }

    #[test]
    fn test_font_with_size() {
        let font = FontDescriptor::new("Serif", 12.0).with_size(24.0);
        assert_eq!(font.family, "Serif");
        assert_eq!(font.point_size, 24.0);
    }
}
