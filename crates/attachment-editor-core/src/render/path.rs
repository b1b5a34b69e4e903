//! Smoothed cubic paths for brush strokes.
//!
//! # Algorithm
//!
//! Raw touch samples are jittery. Strokes are drawn by:
//! 1. A 3-point moving average: `0.8 * p[i] + 0.1 * p[i-1] + 0.1 * p[i+1]`
//!    with endpoints unchanged
//! 2. A Catmull-Rom style cubic through the smoothed points: each segment's
//!    control points sit a quarter of the local tangent away from its ends
//!
//! The tangent at an interior point averages its incoming and outgoing
//! deltas; at an endpoint it is the single available delta.

use crate::geometry::{Point, Rect};

/// Weight given to each neighbor by [`smooth_points`].
const SMOOTHING_ALPHA: f64 = 0.1;

/// Fraction of the tangent used to place control points.
const CONTROL_POINT_FACTOR: f64 = 0.25;

/// Upper bound on flattening subdivisions per segment.
const MAX_SUBDIVISIONS: usize = 64;

/// Light moving-average smoothing; endpoints are kept as-is.
pub fn smooth_points(points: &[Point]) -> Vec<Point> {
    let last = points.len().saturating_sub(1);
    points
        .iter()
        .enumerate()
        .map(|(index, &point)| {
            if index == 0 || index == last {
                point
            } else {
                point * (1.0 - 2.0 * SMOOTHING_ALPHA)
                    + points[index - 1] * SMOOTHING_ALPHA
                    + points[index + 1] * SMOOTHING_ALPHA
            }
        })
        .collect()
}

/// One cubic Bézier segment, starting where the previous one ended.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CubicSegment {
    pub control1: Point,
    pub control2: Point,
    pub to: Point,
}

/// A chain of cubic segments.
#[derive(Debug, Clone, PartialEq)]
pub struct BezierPath {
    pub start: Point,
    pub segments: Vec<CubicSegment>,
}

impl BezierPath {
    /// Build the stroke path through `points` (already in drawing space).
    ///
    /// A single point produces a zero-length segment so round caps still
    /// draw a dot. Returns `None` for no points.
    pub fn stroke_through(points: &[Point]) -> Option<BezierPath> {
        let (&start, _) = points.split_first()?;
        if points.len() == 1 {
            return Some(BezierPath {
                start,
                segments: vec![CubicSegment {
                    control1: start,
                    control2: start,
                    to: start,
                }],
            });
        }

        let last = points.len() - 1;
        let forward_vector = |index: usize| -> Point {
            if index == 0 {
                points[1] - points[0]
            } else if index == last {
                points[last] - points[last - 1]
            } else {
                (points[index + 1] - points[index - 1]) * 0.5
            }
        };

        let segments = (1..points.len())
            .map(|index| CubicSegment {
                control1: points[index - 1] + forward_vector(index - 1) * CONTROL_POINT_FACTOR,
                control2: points[index] - forward_vector(index) * CONTROL_POINT_FACTOR,
                to: points[index],
            })
            .collect();

        Some(BezierPath { start, segments })
    }

    /// Apply a point mapping to every on- and off-curve point. Exact for
    /// affine mappings.
    pub fn map_points(&self, f: impl Fn(Point) -> Point) -> BezierPath {
        BezierPath {
            start: f(self.start),
            segments: self
                .segments
                .iter()
                .map(|segment| CubicSegment {
                    control1: f(segment.control1),
                    control2: f(segment.control2),
                    to: f(segment.to),
                })
                .collect(),
        }
    }

    /// Bounds of the control polygon, which contain the curve.
    pub fn control_bounds(&self) -> Rect {
        let points = std::iter::once(self.start).chain(
            self.segments
                .iter()
                .flat_map(|segment| [segment.control1, segment.control2, segment.to]),
        );
        Rect::bounding(points).unwrap_or(Rect::ZERO)
    }

    /// Approximate the path with a polyline whose steps are at most about
    /// `max_step` long.
    pub fn flatten(&self, max_step: f64) -> Vec<Point> {
        let max_step = max_step.max(0.01);
        let mut polyline = vec![self.start];
        let mut from = self.start;
        for segment in &self.segments {
            let hull_length = from.distance(segment.control1)
                + segment.control1.distance(segment.control2)
                + segment.control2.distance(segment.to);
            let steps = ((hull_length / max_step).ceil() as usize).clamp(1, MAX_SUBDIVISIONS);
            for step in 1..=steps {
                let t = step as f64 / steps as f64;
                polyline.push(cubic_point(from, segment, t));
            }
            from = segment.to;
        }
        polyline
    }
}

fn cubic_point(from: Point, segment: &CubicSegment, t: f64) -> Point {
    let mt = 1.0 - t;
    from * (mt * mt * mt)
        + segment.control1 * (3.0 * mt * mt * t)
        + segment.control2 * (3.0 * mt * t * t)
        + segment.to * (t * t * t)
}
