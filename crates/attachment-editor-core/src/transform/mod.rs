//! The editor transform and the projections it defines.
//!
//! This module provides the immutable [`Transform`] value, the image frame
//! computation that anchors all item geometry, and the crop commit that
//! turns a crop rectangle into a new transform.
//!
//! # Transform Order
//!
//! The content layer is drawn about the view center as:
//! 1. Scale by `scaling`
//! 2. Rotate by `rotation_radians`
//! 3. Translate by `unit_translation * view_size`
//!
//! The flip flag is never part of this affine; it only mirrors the
//! background image inside its own frame.
//!
//! # Coordinate System
//!
//! - Rotation angles are in radians; positive is clockwise on screen (y down)
//! - Translations are fractions of the view size
//! - Origin is top-left corner

mod crop;
mod editor_transform;
mod image_frame;

pub use crop::{crop_transform, cropped_output_size};
pub use editor_transform::{Transform, MAX_SCALING, MIN_SCALING};
pub use image_frame::{content_to_view, image_frame, location_image_unit, view_to_content};
