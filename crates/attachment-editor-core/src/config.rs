//! Tunable editor settings.

use serde::{Deserialize, Serialize};

/// Settings supplied by the host. Every field has a default, so a partial
/// (or empty) config deserializes cleanly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Size of a crop corner handle in view points. Touches within twice
    /// this distance of a crop edge drag the crop; the crop never shrinks
    /// below twice this size per axis.
    pub crop_corner_size: f64,
    /// Maximum number of undo snapshots kept.
    pub max_undo_depth: usize,
    /// Brush width for new strokes at transform scaling 1.
    pub default_unit_stroke_width: f64,
    /// Point size for new text items.
    pub default_font_size: f64,
    /// Device pixel ratio used for on-screen text layers.
    pub device_scale: f64,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            crop_corner_size: 20.0,
            max_undo_depth: 50,
            default_unit_stroke_width: 0.02,
            default_font_size: 32.0,
            device_scale: 1.0,
        }
    }
}

impl EditorConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Smallest crop rectangle extent along either axis.
    pub fn min_crop_size(&self) -> f64 {
        self.crop_corner_size * 2.0
    }
}
