//! The content model: ordered items, the current transform and history.
//!
//! Every mutation replaces the current [`EditorContents`] snapshot with a
//! new immutable one and notifies observers synchronously. Snapshots are
//! reference counted, so undo history shares structure with the live state.
//!
//! # Transactions
//!
//! Continuous gestures (drawing, dragging, pinching) update the model many
//! times before they end. They run inside a transaction: mutations still
//! update the live snapshot and notify observers, but don't touch history.
//! Committing records the pre-transaction snapshot as one undo entry;
//! rolling back restores it, so a cancelled gesture leaves no trace.
//!
//! # Threading
//!
//! The model is deliberately `!Send`: observers are held as `Rc`s and all
//! mutation, gesture handling and rendering happen on one thread.

mod observer;

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

pub use observer::ModelObserver;
use observer::ObserverList;

#[cfg(test)]
pub(crate) use observer::test_support;

use crate::config::EditorConfig;
use crate::error::{EditorError, Result};
use crate::geometry::Size;
use crate::item::{EditorItem, ItemId};
use crate::transform::Transform;

/// An immutable snapshot of the editable state.
///
/// Items are shared between snapshots; deriving the next snapshot copies
/// only the item pointers.
#[derive(Debug, Clone, PartialEq)]
pub struct EditorContents {
    items: Vec<Rc<EditorItem>>,
    transform: Transform,
}

impl EditorContents {
    /// Empty contents with the given transform.
    pub fn new(transform: Transform) -> Self {
        Self {
            items: Vec::new(),
            transform,
        }
    }

    /// Items in z-order, back to front.
    pub fn items(&self) -> &[Rc<EditorItem>] {
        &self.items
    }

    pub fn transform(&self) -> &Transform {
        &self.transform
    }

    pub fn item(&self, item_id: &ItemId) -> Option<&EditorItem> {
        self.items
            .iter()
            .find(|item| item.item_id() == item_id)
            .map(|item| &**item)
    }

    pub fn has_item(&self, item_id: &ItemId) -> bool {
        self.item(item_id).is_some()
    }

    pub fn item_ids(&self) -> Vec<ItemId> {
        self.items.iter().map(|item| item.item_id().clone()).collect()
    }

    /// Z-order position of an item.
    pub fn index_of(&self, item_id: &ItemId) -> Option<usize> {
        self.items.iter().position(|item| item.item_id() == item_id)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    fn with_item_appended(&self, item: EditorItem) -> Result<Self> {
        if self.has_item(item.item_id()) {
            return Err(EditorError::DuplicateItem(item.item_id().clone()));
        }
        let mut next = self.clone();
        next.items.push(Rc::new(item));
        Ok(next)
    }

    fn with_item_replaced(&self, item: EditorItem) -> Result<Self> {
        let index = self
            .index_of(item.item_id())
            .ok_or_else(|| EditorError::UnknownItem(item.item_id().clone()))?;
        let mut next = self.clone();
        next.items[index] = Rc::new(item);
        Ok(next)
    }

    fn with_item_removed(&self, item_id: &ItemId) -> Result<(Self, EditorItem)> {
        let index = self
            .index_of(item_id)
            .ok_or_else(|| EditorError::UnknownItem(item_id.clone()))?;
        let mut next = self.clone();
        let removed = next.items.remove(index);
        Ok((next, Rc::unwrap_or_clone(removed)))
    }

    fn with_transform(&self, transform: Transform) -> Self {
        Self {
            items: self.items.clone(),
            transform,
        }
    }
}

enum Change {
    Structural,
    Items(Vec<ItemId>),
}

/// The editable model for one source image.
pub struct EditorModel {
    src_image_size_pixels: Size,
    contents: Rc<EditorContents>,
    undo_stack: VecDeque<Rc<EditorContents>>,
    redo_stack: Vec<Rc<EditorContents>>,
    transaction: Option<Rc<EditorContents>>,
    max_undo_depth: usize,
    observers: ObserverList,
}

impl EditorModel {
    /// Create a model for a source image of the given pixel size, starting
    /// from the default transform.
    ///
    /// # Errors
    ///
    /// [`EditorError::InvalidGeometry`] if the size has a zero dimension.
    pub fn new(src_image_size_pixels: Size, config: &EditorConfig) -> Result<Self> {
        if !src_image_size_pixels.is_valid() {
            return Err(EditorError::invalid_geometry(
                "source image",
                src_image_size_pixels.width,
                src_image_size_pixels.height,
            ));
        }
        Ok(Self {
            src_image_size_pixels,
            contents: Rc::new(EditorContents::new(Transform::default_for(
                src_image_size_pixels,
            ))),
            undo_stack: VecDeque::new(),
            redo_stack: Vec::new(),
            transaction: None,
            max_undo_depth: config.max_undo_depth,
            observers: ObserverList::default(),
        })
    }

    pub fn src_image_size_pixels(&self) -> Size {
        self.src_image_size_pixels
    }

    /// The current snapshot.
    pub fn contents(&self) -> &Rc<EditorContents> {
        &self.contents
    }

    pub fn current_transform(&self) -> Transform {
        self.contents.transform
    }

    /// The transform [`reset`](crate::gesture::CropController::reset) restores.
    pub fn default_transform(&self) -> Transform {
        Transform::default_for(self.src_image_size_pixels)
    }

    pub fn items(&self) -> &[Rc<EditorItem>] {
        self.contents.items()
    }

    pub fn item(&self, item_id: &ItemId) -> Option<&EditorItem> {
        self.contents.item(item_id)
    }

    pub fn has_item(&self, item_id: &ItemId) -> bool {
        self.contents.has_item(item_id)
    }

    pub fn item_ids(&self) -> Vec<ItemId> {
        self.contents.item_ids()
    }

    pub fn item_count(&self) -> usize {
        self.contents.len()
    }

    /// True once any committed edit has been made.
    pub fn is_dirty(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    /// Register an observer. It is held weakly.
    pub fn add_observer<O: ModelObserver + 'static>(&mut self, observer: &Rc<RefCell<O>>) {
        self.observers.add(observer);
    }

    pub fn observer_count(&self) -> usize {
        self.observers.len()
    }

    /// Replace the current transform wholesale.
    pub fn replace_transform(&mut self, transform: Transform) {
        let next = self.contents.with_transform(transform);
        self.perform(next, Change::Structural);
    }

    /// Add an item on top of the z-order.
    pub fn append_item(&mut self, item: impl Into<EditorItem>) -> Result<()> {
        let next = self.contents.with_item_appended(item.into())?;
        self.perform(next, Change::Structural);
        Ok(())
    }

    /// Replace the item with the same id, keeping its z-order.
    pub fn replace_item(&mut self, item: impl Into<EditorItem>) -> Result<()> {
        let item = item.into();
        let item_id = item.item_id().clone();
        let next = self.contents.with_item_replaced(item)?;
        self.perform(next, Change::Items(vec![item_id]));
        Ok(())
    }

    /// Remove an item, returning it.
    pub fn remove_item(&mut self, item_id: &ItemId) -> Result<EditorItem> {
        let (next, removed) = self.contents.with_item_removed(item_id)?;
        self.perform(next, Change::Structural);
        Ok(removed)
    }

    fn perform(&mut self, next: EditorContents, change: Change) {
        let before = Rc::clone(&self.contents);
        if self.transaction.is_none() {
            self.push_undo(Rc::clone(&before));
            self.redo_stack.clear();
        }
        self.contents = Rc::new(next);
        match change {
            Change::Structural => self.observers.notify_structural(&before, &self.contents),
            Change::Items(item_ids) => self.observers.notify_items(&self.contents, &item_ids),
        }
    }

    fn push_undo(&mut self, snapshot: Rc<EditorContents>) {
        self.undo_stack.push_back(snapshot);
        while self.undo_stack.len() > self.max_undo_depth.max(1) {
            self.undo_stack.pop_front();
        }
    }

    fn restore(&mut self, snapshot: Rc<EditorContents>) {
        let before = std::mem::replace(&mut self.contents, snapshot);
        self.observers.notify_structural(&before, &self.contents);
    }

    pub fn in_transaction(&self) -> bool {
        self.transaction.is_some()
    }

    /// Start grouping mutations into one undo entry.
    pub fn begin_transaction(&mut self) -> Result<()> {
        if self.transaction.is_some() {
            return Err(EditorError::TransactionInProgress);
        }
        self.transaction = Some(Rc::clone(&self.contents));
        Ok(())
    }

    /// Close the transaction. If anything changed, the pre-transaction
    /// snapshot becomes a single undo entry.
    pub fn commit_transaction(&mut self) -> Result<()> {
        let snapshot = self.transaction.take().ok_or(EditorError::NoTransaction)?;
        if *snapshot != *self.contents {
            self.push_undo(snapshot);
            self.redo_stack.clear();
        }
        Ok(())
    }

    /// Close the transaction and restore the pre-transaction snapshot.
    pub fn rollback_transaction(&mut self) -> Result<()> {
        let snapshot = self.transaction.take().ok_or(EditorError::NoTransaction)?;
        if !Rc::ptr_eq(&snapshot, &self.contents) {
            self.restore(snapshot);
        }
        Ok(())
    }

    pub fn can_undo(&self) -> bool {
        self.transaction.is_none() && !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        self.transaction.is_none() && !self.redo_stack.is_empty()
    }

    /// Step back one committed edit. Returns false if there is nothing to
    /// undo or a transaction is open.
    pub fn undo(&mut self) -> bool {
        if self.transaction.is_some() {
            tracing::warn!("undo requested during a transaction");
            return false;
        }
        let Some(snapshot) = self.undo_stack.pop_back() else {
            return false;
        };
        self.redo_stack.push(Rc::clone(&self.contents));
        self.restore(snapshot);
        true
    }

    /// Re-apply the last undone edit.
    pub fn redo(&mut self) -> bool {
        if self.transaction.is_some() {
            tracing::warn!("redo requested during a transaction");
            return false;
        }
        let Some(snapshot) = self.redo_stack.pop() else {
            return false;
        };
        self.push_undo(Rc::clone(&self.contents));
        self.restore(snapshot);
        true
    }
}
