//! Attachment Editor Core - overlay transform engine
//!
//! This crate provides the editing core of an image attachment editor:
//! the crop/rotate/zoom/flip transform, brush strokes and text labels
//! placed in image unit space, an undoable content model, gesture
//! controllers, and rendering both for the live canvas and for export.
//!
//! # Module Structure
//!
//! - `geometry` - Points, sizes, rectangles and unit coordinates
//! - `transform` - The editor transform, image frame and crop commit
//! - `item` - Stroke and text items
//! - `model` - Content snapshots, history, transactions and observers
//! - `render` - Layer construction, canvas renderer and export
//! - `gesture` - Pan, pinch, crop, brush and text controllers
//!
//! Decoding and encoding image files is left to the host.

pub mod config;
pub mod error;
pub mod geometry;
pub mod gesture;
pub mod item;
pub mod model;
pub mod render;
pub mod transform;

pub use config::EditorConfig;
pub use error::{EditorError, Result};
pub use geometry::{Point, Rect, Size};
pub use gesture::{
    BrushController, CropController, CropRegion, GesturePhase, PinchSample, TextItemController,
};
pub use item::{Color, EditorItem, FontDescriptor, ItemId, ItemType, StrokeItem, TextItem};
pub use model::{EditorContents, EditorModel, ModelObserver};
pub use render::{render_output, CanvasRenderer, GlyphTextEngine, TextEngine};
pub use transform::{Transform, MAX_SCALING, MIN_SCALING};
