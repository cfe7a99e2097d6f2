//! Favorites management
//!
//! An ordered list of saved records, unique by date, persisted after every
//! change.

use std::fmt;
use std::sync::Arc;

use super::store::{KeyValueStore, StoreError};
use crate::data::PictureRecord;

/// Store key holding the serialized favorites list
pub const FAVORITES_KEY: &str = "favorites";

/// Result of adding a record to the favorites
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOutcome {
    /// The record was appended
    Added,
    /// A record with the same date was already saved
    AlreadyPresent,
}

impl fmt::Display for AddOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AddOutcome::Added => write!(f, "Added to favorites!"),
            AddOutcome::AlreadyPresent => write!(f, "Already in favorites"),
        }
    }
}

/// Saved records in insertion order
pub struct FavoriteSet {
    store: Arc<dyn KeyValueStore>,
    favorites: Vec<PictureRecord>,
}

impl FavoriteSet {
    /// Loads favorites from `store`; a missing or unreadable blob yields an empty set
    pub fn load(store: Arc<dyn KeyValueStore>) -> Self {
        let favorites = match store.get(FAVORITES_KEY) {
            Some(blob) => serde_json::from_str(&blob).unwrap_or_else(|e| {
                tracing::warn!(error = %e, "discarding unreadable favorites");
                Vec::new()
            }),
            None => Vec::new(),
        };
        Self { store, favorites }
    }

    /// Appends a record unless one with the same date is already saved
    pub fn add(&mut self, record: PictureRecord) -> Result<AddOutcome, StoreError> {
        if self.contains(&record.date) {
            return Ok(AddOutcome::AlreadyPresent);
        }
        self.favorites.push(record);
        self.persist()?;
        Ok(AddOutcome::Added)
    }

    /// Removes the record saved for `date`
    ///
    /// Returns whether anything was removed; an absent date is a no-op.
    pub fn remove(&mut self, date: &str) -> Result<bool, StoreError> {
        let before = self.favorites.len();
        self.favorites.retain(|fav| fav.date != date);
        if self.favorites.len() == before {
            return Ok(false);
        }
        self.persist()?;
        Ok(true)
    }

    /// Whether a record for `date` is saved
    pub fn contains(&self, date: &str) -> bool {
        self.favorites.iter().any(|fav| fav.date == date)
    }

    /// Saved records in the order they were added
    pub fn list(&self) -> &[PictureRecord] {
        &self.favorites
    }

    pub fn len(&self) -> usize {
        self.favorites.len()
    }

    pub fn is_empty(&self) -> bool {
        self.favorites.is_empty()
    }

    fn persist(&self) -> Result<(), StoreError> {
        let blob = serde_json::to_string(&self.favorites)?;
        self.store.set(FAVORITES_KEY, &blob)
    }
}
