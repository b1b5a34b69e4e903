//! Error types for the editor core.

use thiserror::Error;

use crate::item::ItemId;

/// Errors raised by geometry, model and rendering operations.
///
/// None of these are meant to reach the end user. Renderers and gesture
/// controllers log them and skip the affected frame or item.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EditorError {
    /// A size or bounds with a zero (or negative, or non-finite) dimension
    /// was used where a positive area is required.
    #[error("Invalid geometry in {context}: {width}x{height}")]
    InvalidGeometry {
        context: &'static str,
        width: f64,
        height: f64,
    },

    /// Required state was missing, e.g. a gesture change without a begin.
    #[error("Missing data: {0}")]
    MissingData(&'static str),

    /// No item with this id exists in the model.
    #[error("Unknown item: {0}")]
    UnknownItem(ItemId),

    /// An item with this id already exists in the model.
    #[error("Duplicate item: {0}")]
    DuplicateItem(ItemId),

    /// A transaction is already open on the model.
    #[error("A model transaction is already in progress")]
    TransactionInProgress,

    /// Commit or rollback was requested without an open transaction.
    #[error("No model transaction is in progress")]
    NoTransaction,

    /// Font data could not be parsed, or no font is registered.
    #[error("Invalid font: {0}")]
    InvalidFont(String),

    /// Pixel data length doesn't match the declared dimensions.
    #[error("Invalid pixel buffer: expected {expected} bytes, got {actual}")]
    InvalidPixelBuffer { expected: usize, actual: usize },
}

impl EditorError {
    /// Shorthand for an [`EditorError::InvalidGeometry`] from a width/height pair.
    pub fn invalid_geometry(context: &'static str, width: f64, height: f64) -> Self {
        EditorError::InvalidGeometry {
            context,
            width,
            height,
        }
    }
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, EditorError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_geometry_message() {
        let err = EditorError::invalid_geometry("to_unit", 0.0, 10.0);
        assert_eq!(err.to_string(), "Invalid geometry in to_unit: 0x10");
    }

    #[test]
    fn test_unknown_item_message() {
        let err = EditorError::UnknownItem(ItemId::from("stroke-1"));
        assert_eq!(err.to_string(), "Unknown item: stroke-1");
    }
}
