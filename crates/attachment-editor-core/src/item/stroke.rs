//! Free-hand brush strokes.

use serde::{Deserialize, Serialize};

use super::{Color, ItemId};
use crate::geometry::{Point, Size};

/// A brush stroke as an ordered list of samples in image unit space.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrokeItem {
    pub item_id: ItemId,
    pub color: Color,
    pub unit_samples: Vec<Point>,
    /// Line width as a fraction of the destination's smaller dimension.
    pub unit_stroke_width: f64,
}

impl StrokeItem {
    /// Create a stroke with a fresh id.
    pub fn new(color: Color, unit_samples: Vec<Point>, unit_stroke_width: f64) -> Self {
        Self {
            item_id: ItemId::generate(),
            color,
            unit_samples,
            unit_stroke_width,
        }
    }

    /// Same stroke (same id) with a new sample list.
    pub fn with_unit_samples(&self, unit_samples: Vec<Point>) -> Self {
        Self {
            unit_samples,
            ..self.clone()
        }
    }

    /// Strokes always render at their natural scale.
    pub fn output_scale(&self) -> f64 {
        1.0
    }

    /// Line width in destination units. The unit width is clamped to
    /// `[0, 1]` and measured against the smaller destination dimension.
    pub fn stroke_width(unit_stroke_width: f64, dst_size: Size) -> f64 {
        unit_stroke_width.clamp(0.0, 1.0) * dst_size.min_dimension()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_unit_samples_preserves_identity() {
        let stroke = StrokeItem::new(Color::BLACK, vec![Point::new(0.1, 0.2)], 0.02);
        let extended = stroke.with_unit_samples(vec![Point::new(0.1, 0.2), Point::new(0.3, 0.4)]);
        assert_eq!(extended.item_id, stroke.item_id);
        assert_eq!(extended.color, stroke.color);
        assert_eq!(extended.unit_stroke_width, stroke.unit_stroke_width);
        assert_eq!(extended.unit_samples.len(), 2);
    }

    #[test]
    fn test_stroke_width_uses_min_dimension() {
        assert!((StrokeItem::stroke_width(0.02, Size::new(300.0, 400.0)) - 6.0).abs() < 1e-12);
        assert_eq!(StrokeItem::stroke_width(2.0, Size::new(300.0, 400.0)), 300.0);
        assert_eq!(StrokeItem::stroke_width(-1.0, Size::new(300.0, 400.0)), 0.0);
    }
}
