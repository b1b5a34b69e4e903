//! Crop handle hit testing and crop rectangle dragging.

use serde::{Deserialize, Serialize};

use crate::geometry::{Point, Rect};

/// One of the eight drag zones around the crop rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CropRegion {
    TopLeft,
    Top,
    TopRight,
    Right,
    BottomRight,
    Bottom,
    BottomLeft,
    Left,
}

impl CropRegion {
    pub fn moves_left_edge(self) -> bool {
        matches!(self, CropRegion::TopLeft | CropRegion::Left | CropRegion::BottomLeft)
    }

    pub fn moves_right_edge(self) -> bool {
        matches!(self, CropRegion::TopRight | CropRegion::Right | CropRegion::BottomRight)
    }

    pub fn moves_top_edge(self) -> bool {
        matches!(self, CropRegion::TopLeft | CropRegion::Top | CropRegion::TopRight)
    }

    pub fn moves_bottom_edge(self) -> bool {
        matches!(self, CropRegion::BottomLeft | CropRegion::Bottom | CropRegion::BottomRight)
    }
}

/// Which crop region a touch at `location` grabs, if any.
///
/// Touches within `2 * corner_size` of an edge of `bounds` grab that edge;
/// within that distance of two edges they grab the corner. Touches further
/// inside return `None` and should pan the content instead.
pub fn crop_region_at(location: Point, bounds: Rect, corner_size: f64) -> Option<CropRegion> {
    let tolerance = corner_size * 2.0;
    let near_left = location.x < bounds.min_x() + tolerance;
    let near_right = location.x > bounds.max_x() - tolerance;
    let near_top = location.y < bounds.min_y() + tolerance;
    let near_bottom = location.y > bounds.max_y() - tolerance;

    match (near_left, near_right, near_top, near_bottom) {
        (true, _, true, _) => Some(CropRegion::TopLeft),
        (_, true, true, _) => Some(CropRegion::TopRight),
        (true, _, _, true) => Some(CropRegion::BottomLeft),
        (_, true, _, true) => Some(CropRegion::BottomRight),
        (true, _, _, _) => Some(CropRegion::Left),
        (_, true, _, _) => Some(CropRegion::Right),
        (_, _, true, _) => Some(CropRegion::Top),
        (_, _, _, true) => Some(CropRegion::Bottom),
        _ => None,
    }
}

/// The crop rectangle after dragging `region` from `start` to `now`.
///
/// Edges only move inward from `bounds`, and never closer than
/// `2 * corner_size` to the opposite edge.
pub fn crop_rect_for_drag(
    region: CropRegion,
    bounds: Rect,
    start: Point,
    now: Point,
    corner_size: f64,
) -> Rect {
    let delta = now - start;
    let min_size = corner_size * 2.0;
    let max_delta_x = (bounds.width() - min_size).max(0.0);
    let max_delta_y = (bounds.height() - min_size).max(0.0);

    let mut rect = bounds;
    if region.moves_left_edge() {
        let dx = delta.x.clamp(0.0, max_delta_x);
        rect.origin.x += dx;
        rect.size.width -= dx;
    } else if region.moves_right_edge() {
        rect.size.width += delta.x.clamp(-max_delta_x, 0.0);
    }
    if region.moves_top_edge() {
        let dy = delta.y.clamp(0.0, max_delta_y);
        rect.origin.y += dy;
        rect.size.height -= dy;
    } else if region.moves_bottom_edge() {
        rect.size.height += delta.y.clamp(-max_delta_y, 0.0);
    }
    rect
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bounds() -> Rect {
        Rect::new(0.0, 0.0, 300.0, 400.0)
    }

    #[test]
    fn test_region_corners() {
        assert_eq!(crop_region_at(Point::new(5.0, 5.0), bounds(), 20.0), Some(CropRegion::TopLeft));
        assert_eq!(crop_region_at(Point::new(295.0, 5.0), bounds(), 20.0), Some(CropRegion::TopRight));
        assert_eq!(crop_region_at(Point::new(5.0, 395.0), bounds(), 20.0), Some(CropRegion::BottomLeft));
        assert_eq!(crop_region_at(Point::new(295.0, 395.0), bounds(), 20.0), Some(CropRegion::BottomRight));
    }

    #[test]
    fn test_region_edges() {
        assert_eq!(crop_region_at(Point::new(150.0, 10.0), bounds(), 20.0), Some(CropRegion::Top));
        assert_eq!(crop_region_at(Point::new(150.0, 390.0), bounds(), 20.0), Some(CropRegion::Bottom));
        assert_eq!(crop_region_at(Point::new(39.0, 200.0), bounds(), 20.0), Some(CropRegion::Left));
        assert_eq!(crop_region_at(Point::new(270.0, 200.0), bounds(), 20.0), Some(CropRegion::Right));
    }

    #[test]
    fn test_region_interior_is_pan() {
        assert_eq!(crop_region_at(Point::new(150.0, 200.0), bounds(), 20.0), None);
        assert_eq!(crop_region_at(Point::new(41.0, 41.0), bounds(), 20.0), None);
    }

    #[test]
    fn test_drag_top_left_inward() {
        let rect = crop_rect_for_drag(
            CropRegion::TopLeft,
            bounds(),
            Point::new(5.0, 5.0),
            Point::new(50.0, 50.0),
            20.0,
        );
        assert_eq!(rect, Rect::new(45.0, 45.0, 255.0, 355.0));
    }

    #[test]
    fn test_drag_outward_is_ignored() {
        let rect = crop_rect_for_drag(
            CropRegion::Right,
            bounds(),
            Point::new(295.0, 200.0),
            Point::new(400.0, 100.0),
            20.0,
        );
        assert_eq!(rect, bounds());
    }

    #[test]
    fn test_drag_respects_min_size() {
        let rect = crop_rect_for_drag(
            CropRegion::BottomRight,
            bounds(),
            Point::new(295.0, 395.0),
            Point::new(-500.0, -500.0),
            20.0,
        );
        assert_eq!(rect, Rect::new(0.0, 0.0, 40.0, 40.0));
    }

    #[test]
    fn test_edge_drag_moves_one_axis() {
        let rect = crop_rect_for_drag(
            CropRegion::Top,
            bounds(),
            Point::new(150.0, 5.0),
            Point::new(10.0, 105.0),
            20.0,
        );
        assert_eq!(rect, Rect::new(0.0, 100.0, 300.0, 300.0));
    }

    #[test]
    fn test_tiny_bounds_do_not_panic() {
        let tiny = Rect::new(0.0, 0.0, 10.0, 10.0);
        let rect = crop_rect_for_drag(CropRegion::Left, tiny, Point::ZERO, Point::new(5.0, 0.0), 20.0);
        assert_eq!(rect, tiny);
    }
}
