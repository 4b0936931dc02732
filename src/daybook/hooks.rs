//! Extension points.
//!
//! The engine calls observers synchronously at three defined moments:
//! after a journal is parsed, before serialized text is written, and
//! after an individual entry is mutated. There is no global dispatch
//! table; whoever owns the facade registers observers explicitly.

use crate::model::Item;
use crate::store::ContentStore;

/// Synchronous observer interface. All methods default to no-ops so
/// implementors override only what they care about.
pub trait Hooks {
    fn post_read(&self, _store: &ContentStore) {}
    fn pre_write(&self, _store: &ContentStore) {}
    fn post_entry_updated(&self, _item: &Item) {}
}

/// An ordered set of registered observers.
#[derive(Default)]
pub struct HookSet {
    observers: Vec<Box<dyn Hooks>>,
}

impl HookSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, hooks: Box<dyn Hooks>) {
        self.observers.push(hooks);
    }

    pub fn post_read(&self, store: &ContentStore) {
        for observer in &self.observers {
            observer.post_read(store);
        }
    }

    pub fn pre_write(&self, store: &ContentStore) {
        for observer in &self.observers {
            observer.pre_write(store);
        }
    }

    pub fn post_entry_updated(&self, item: &Item) {
        for observer in &self.observers {
            observer.post_entry_updated(item);
        }
    }
}
