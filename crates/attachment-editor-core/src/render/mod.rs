//! Rendering of the content model.
//!
//! Two consumers share the same layer construction:
//!
//! - [`CanvasRenderer`] keeps an up-to-date layer list for the on-screen
//!   view, updating incrementally as it observes the model.
//! - [`render_output`] rasterizes the final image at the output pixel size
//!   for export.
//!
//! # Coordinate System
//!
//! Layers are built in canvas space. Item unit coordinates are projected
//! through the image frame; the content affine then places the whole
//! canvas in the view (or the output buffer) about its center. The flip
//! only mirrors the background layer, never the items.

mod canvas;
mod export;
mod layers;
mod path;
mod text;

pub use canvas::{CanvasLayout, CanvasRenderer, DrawCommand};
pub use export::render_output;
pub use layers::{
    build_item_layer, build_stroke_layer, build_text_layer, ImageLayer, ItemLayer, LayerContext,
    StrokeLayer, TextLayer,
};
pub use path::{smooth_points, BezierPath, CubicSegment};
pub use text::{layout_text, GlyphTextEngine, LineMetrics, TextBlock, TextEngine, TextLine};

#[cfg(test)]
pub(crate) use text::test_support;
