//! Embedded JSON document store.
//!
//! Collections map to directories and resources to individual JSON files
//! under a single root. Access is serialized per collection.

mod document;
mod locks;

pub use document::{Store, StoreOptions};
pub use locks::{CollectionLock, LockRegistry};
