//! Per-collection lock registry.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;

/// Lock guarding every operation on one collection.
pub type CollectionLock = Arc<Mutex<()>>;

/// Lazily populated map of collection name to its lock.
///
/// Entries are never removed: collection names are chosen by the caller and
/// form a small, bounded set.
#[derive(Debug, Default)]
pub struct LockRegistry {
    locks: Mutex<HashMap<String, CollectionLock>>,
}

impl LockRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the lock for `collection`, creating it on first use.
    ///
    /// Repeated calls with the same name return the same lock.
    pub fn get_or_create(&self, collection: &str) -> CollectionLock {
        let mut locks = self.locks.lock();
        if let Some(lock) = locks.get(collection) {
            return Arc::clone(lock);
        }
        let lock = Arc::new(Mutex::new(()));
        locks.insert(collection.to_string(), Arc::clone(&lock));
        lock
    }

    /// Number of collections that have been touched.
    pub fn len(&self) -> usize {
        self.locks.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
