//! Cache-first picture loading
//!
//! `PictureHook` answers "show me the picture for this date": a cached record
//! is applied immediately, otherwise a fetch is spawned and its outcome
//! published through a `watch` channel. Every request bumps a generation
//! counter; a fetch only updates the visible state if no newer request has
//! been made since it started, so a slow response for an old date never
//! overwrites a newer one. Asking again for the date whose fetch is still in
//! flight is a no-op, so one date never has two fetches racing.
//!
//! Persisting the cache touches the filesystem, so the write runs on the
//! blocking pool rather than on the async worker.

use std::sync::Arc;

use chrono::NaiveDate;
use parking_lot::Mutex;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use super::fetcher::PictureFetcher;
use crate::cache::{KeyValueStore, RecordCache};
use crate::data::{format_date, PictureRecord};

/// What the consumer should currently display
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PictureState {
    /// The record for the current date, if loaded
    pub record: Option<PictureRecord>,
    /// Whether a fetch for the current date is in flight
    pub loading: bool,
    /// User-displayable error from the last failed fetch
    pub error: Option<String>,
}

/// The most recent request
#[derive(Debug, Default)]
struct Target {
    generation: u64,
    date: Option<String>,
}

struct Inner<F> {
    fetcher: F,
    cache: Mutex<RecordCache>,
    target: Mutex<Target>,
    state: watch::Sender<PictureState>,
}

/// Cache-first loader for picture records
pub struct PictureHook<F> {
    inner: Arc<Inner<F>>,
}

impl<F> Clone for PictureHook<F> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<F: PictureFetcher> PictureHook<F> {
    /// Creates a hook, loading the persisted cache from `store` once
    pub fn new(fetcher: F, store: Arc<dyn KeyValueStore>) -> Self {
        let (state, _) = watch::channel(PictureState::default());
        Self {
            inner: Arc::new(Inner {
                fetcher,
                cache: Mutex::new(RecordCache::load(store)),
                target: Mutex::new(Target::default()),
                state,
            }),
        }
    }

    /// Receiver notified on every state change
    pub fn subscribe(&self) -> watch::Receiver<PictureState> {
        self.inner.state.subscribe()
    }

    /// Snapshot of the current state
    pub fn state(&self) -> PictureState {
        self.inner.state.borrow().clone()
    }

    /// The date most recently requested, normalized
    pub fn current_date(&self) -> Option<String> {
        self.inner.target.lock().date.clone()
    }

    /// Points the hook at `date`
    ///
    /// With `skip` set nothing happens. A cache hit is applied before this
    /// returns. On a miss the state switches to loading and the handle of the
    /// spawned fetch is returned; if that same date is already loading, the
    /// running fetch is left to finish and `None` is returned.
    pub fn request(&self, date: NaiveDate, skip: bool) -> Option<JoinHandle<()>> {
        if skip {
            return None;
        }
        let key = format_date(date);

        let mut target = self.inner.target.lock();
        if target.date.as_deref() == Some(key.as_str()) && self.inner.state.borrow().loading {
            tracing::debug!(date = %key, "fetch already in flight");
            return None;
        }
        target.generation += 1;
        target.date = Some(key.clone());
        let generation = target.generation;

        let cached = self.inner.cache.lock().get(&key).cloned();
        if let Some(record) = cached {
            tracing::debug!(date = %key, "serving record from cache");
            self.inner.state.send_modify(|s| {
                s.record = Some(record);
                s.loading = false;
                s.error = None;
            });
            return None;
        }

        self.inner.state.send_modify(|s| {
            s.loading = true;
            s.error = None;
        });
        drop(target);

        let inner = Arc::clone(&self.inner);
        Some(tokio::spawn(async move {
            inner.resolve(key, generation).await;
        }))
    }

    /// Requests `date` and waits for any fetch to finish
    pub async fn load(&self, date: NaiveDate, skip: bool) -> PictureState {
        if let Some(handle) = self.request(date, skip) {
            if let Err(e) = handle.await {
                tracing::error!(error = %e, "picture fetch task failed");
            }
        }
        self.state()
    }
}

impl<F: PictureFetcher> Inner<F> {
    async fn resolve(self: Arc<Self>, key: String, generation: u64) {
        let result = self.fetcher.fetch(&key).await;

        if let Ok(record) = &result {
            let inner = Arc::clone(&self);
            let (date, record) = (key.clone(), record.clone());
            let persisted =
                tokio::task::spawn_blocking(move || inner.cache.lock().insert(date, record)).await;
            match persisted {
                Ok(Ok(())) => {}
                Ok(Err(e)) => {
                    tracing::warn!(date = %key, error = %e, "failed to persist record cache")
                }
                Err(e) => tracing::error!(date = %key, error = %e, "cache write task failed"),
            }
        }

        let target = self.target.lock();
        if target.generation != generation {
            tracing::debug!(date = %key, "discarding result for superseded request");
            return;
        }

        match result {
            Ok(record) => self.state.send_modify(|s| {
                s.record = Some(record);
                s.loading = false;
                s.error = None;
            }),
            Err(e) => {
                tracing::warn!(date = %key, error = %e, "picture fetch failed");
                self.state.send_modify(|s| {
                    s.record = None;
                    s.loading = false;
                    s.error = Some(e.to_string());
                });
            }
        }
        drop(target);
    }
}
