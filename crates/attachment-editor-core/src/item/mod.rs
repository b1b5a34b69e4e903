//! Drawable overlay items.
//!
//! Items are immutable values in image unit space, independent of the
//! current transform, so their layout stays consistent before and after a
//! crop. "Modifying" an item builds a new value with the same [`ItemId`];
//! identity survives edits so observers can diff by id.
//!
//! ## Item Types
//!
//! - **Stroke**: a free-hand brush stroke sampled in unit coordinates
//! - **Text**: a wrapped, centered text label with its own scale and rotation

mod stroke;
mod text;

use std::fmt;

use serde::{Deserialize, Serialize};

pub use stroke::StrokeItem;
pub use text::{FontDescriptor, TextItem, DEFAULT_TEXT_UNIT_WIDTH};

/// Stable identifier of an item within a content model.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ItemId(String);

impl ItemId {
    /// A fresh, random identifier.
    pub fn generate() -> Self {
        ItemId(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ItemId {
    fn from(value: &str) -> Self {
        ItemId(value.to_string())
    }
}

impl From<String> for ItemId {
    fn from(value: String) -> Self {
        ItemId(value)
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Straight-alpha RGBA color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const WHITE: Color = Color::rgb(255, 255, 255);
    pub const BLACK: Color = Color::rgb(0, 0, 0);

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::rgba(r, g, b, 255)
    }

    pub fn to_array(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

/// Tag for an item's variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ItemType {
    Stroke,
    Text,
}

/// An overlay item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum EditorItem {
    Stroke(StrokeItem),
    Text(TextItem),
}

impl EditorItem {
    pub fn item_id(&self) -> &ItemId {
        match self {
            EditorItem::Stroke(stroke) => &stroke.item_id,
            EditorItem::Text(text) => &text.item_id,
        }
    }

    pub fn item_type(&self) -> ItemType {
        match self {
            EditorItem::Stroke(_) => ItemType::Stroke,
            EditorItem::Text(_) => ItemType::Text,
        }
    }

    /// Rendering scale multiplier used when rasterizing for output.
    pub fn output_scale(&self) -> f64 {
        match self {
            EditorItem::Stroke(stroke) => stroke.output_scale(),
            EditorItem::Text(text) => text.output_scale(),
        }
    }

    pub fn as_text(&self) -> Option<&TextItem> {
        match self {
            EditorItem::Text(text) => Some(text),
            EditorItem::Stroke(_) => None,
        }
    }

    pub fn as_stroke(&self) -> Option<&StrokeItem> {
        match self {
            EditorItem::Stroke(stroke) => Some(stroke),
            EditorItem::Text(_) => None,
        }
    }
}

impl From<StrokeItem> for EditorItem {
    fn from(item: StrokeItem) -> Self {
        EditorItem::Stroke(item)
    }
}

impl From<TextItem> for EditorItem {
    fn from(item: TextItem) -> Self {
        EditorItem::Text(item)
    }
}
