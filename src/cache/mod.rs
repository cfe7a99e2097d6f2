//! Persisted client state
//!
//! This module holds the key-value store abstraction and the two collections
//! persisted through it: the date-keyed record cache and the favorites list.
//! Both are loaded once and rewritten whole after every change.

mod favorites;
mod records;
mod store;

pub use favorites::{AddOutcome, FavoriteSet, FAVORITES_KEY};
pub use records::{RecordCache, CACHE_KEY};
pub use store::{FileStore, KeyValueStore, MemoryStore, StoreError};
