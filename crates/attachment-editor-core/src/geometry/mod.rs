//! Geometry primitives shared by every other module.
//!
//! # Coordinate Spaces
//!
//! - **Image unit space**: (0, 0) to (1, 1) over the source image. Item
//!   geometry (stroke samples, text centers) lives here.
//! - **Canvas space**: the un-transformed content layer, the size of the view.
//!   The background image frame is a rectangle in this space.
//! - **View space**: what the user sees, i.e. canvas space after the
//!   content affine has been applied about the view center.
//!
//! Origin is the top-left corner in every space; y grows downward.

mod primitives;
mod unit;

pub use primitives::{Point, Rect, Size};
pub use unit::{from_unit, to_unit, vector_from_unit, vector_to_unit, UnitClamp};
