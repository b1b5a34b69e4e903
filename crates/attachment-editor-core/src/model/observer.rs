//! Change notifications from the content model.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use super::EditorContents;
use crate::item::ItemId;

/// Receives synchronous change notifications from an
/// [`EditorModel`](super::EditorModel), on the thread that mutated it.
pub trait ModelObserver {
    /// The item set, item order or transform changed. Snapshots are shared
    /// with the model; keep the `Rc` rather than cloning the contents.
    fn model_did_change(&mut self, before: &Rc<EditorContents>, after: &Rc<EditorContents>);

    /// Only the listed items changed, in place. `contents` is the model
    /// state after the change.
    fn items_did_change(&mut self, contents: &Rc<EditorContents>, item_ids: &[ItemId]);
}

/// Weakly held observers. Dropping the last strong reference to an observer
/// unregisters it.
#[derive(Default)]
pub(crate) struct ObserverList {
    observers: Vec<Weak<RefCell<dyn ModelObserver>>>,
}

impl ObserverList {
    pub(crate) fn add<O: ModelObserver + 'static>(&mut self, observer: &Rc<RefCell<O>>) {
        let observer: Rc<RefCell<dyn ModelObserver>> = observer.clone();
        self.observers.push(Rc::downgrade(&observer));
    }

    pub(crate) fn len(&self) -> usize {
        self.observers
            .iter()
            .filter(|observer| observer.strong_count() > 0)
            .count()
    }

    pub(crate) fn notify_structural(&mut self, before: &Rc<EditorContents>, after: &Rc<EditorContents>) {
        self.for_each(|observer| observer.model_did_change(before, after));
    }

    pub(crate) fn notify_items(&mut self, contents: &Rc<EditorContents>, item_ids: &[ItemId]) {
        self.for_each(|observer| observer.items_did_change(contents, item_ids));
    }

    fn for_each(&mut self, mut f: impl FnMut(&mut dyn ModelObserver)) {
        self.observers.retain(|observer| observer.strong_count() > 0);
        for observer in &self.observers {
            let Some(observer) = observer.upgrade() else {
                continue;
            };
            // An observer that is already borrowed is mutating the model from
            // inside its own notification.
            match observer.try_borrow_mut() {
                Ok(mut observer) => f(&mut *observer),
                Err(_) => tracing::error!("skipping re-entrant model observer"),
            };
        }
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::RecordingObserver;
    use super::*;
    use crate::geometry::Size;
    use crate::transform::Transform;

    fn contents() -> Rc<EditorContents> {
        Rc::new(EditorContents::new(Transform::default_for(Size::new(10.0, 10.0))))
    }

    #[test]
    fn test_notifies_live_observers() {
        let mut list = ObserverList::default();
        let observer = Rc::new(RefCell::new(RecordingObserver::default()));
        list.add(&observer);

        list.notify_structural(&contents(), &contents());
        list.notify_items(&contents(), &[ItemId::from("a")]);

        assert_eq!(observer.borrow().structural.len(), 1);
        assert_eq!(observer.borrow().item_changes, vec![vec![ItemId::from("a")]]);
    }

    #[test]
    fn test_dropped_observer_is_pruned() {
        let mut list = ObserverList::default();
        let observer = Rc::new(RefCell::new(RecordingObserver::default()));
        list.add(&observer);
        assert_eq!(list.len(), 1);

        drop(observer);
        list.notify_structural(&contents(), &contents());
        assert_eq!(list.len(), 0);
    }

    #[test]
    fn test_borrowed_observer_is_skipped() {
        let mut list = ObserverList::default();
        let observer = Rc::new(RefCell::new(RecordingObserver::default()));
        list.add(&observer);

        let guard = observer.borrow_mut();
        list.notify_structural(&contents(), &contents());
        drop(guard);

        assert!(observer.borrow().structural.is_empty());
    }
}
