//! In-memory record lists and their reload contract.
//!
//! A store holds the last successfully loaded list of one collection. Writes
//! never patch the list in place: every mutating service call returns an
//! [`Invalidation`] and the owning stores reload wholesale.

use std::future::Future;

use crate::models::Record;
use crate::Result;

/// A list the front end keeps loaded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ListKind {
    Diary,
    Journal,
    MyPrayers,
    SharedPrayers,
    Reminders,
}

/// Lists made stale by a write.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Invalidation(Vec<ListKind>);

impl Invalidation {
    #[must_use]
    pub const fn none() -> Self {
        Self(Vec::new())
    }

    #[must_use]
    pub fn of(kind: ListKind) -> Self {
        Self(vec![kind])
    }

    /// Add `kind` to the stale set.
    #[must_use]
    pub fn and(mut self, kind: ListKind) -> Self {
        if !self.0.contains(&kind) {
            self.0.push(kind);
        }
        self
    }

    #[must_use]
    pub fn contains(&self, kind: ListKind) -> bool {
        self.0.contains(&kind)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = ListKind> + '_ {
        self.0.iter().copied()
    }
}

/// Last loaded list of one collection.
#[derive(Debug, Clone)]
pub struct EntryStore<R> {
    kind: ListKind,
    records: Vec<R>,
    last_error: Option<String>,
    loaded: bool,
}

impl<R: Record> EntryStore<R> {
    #[must_use]
    pub const fn new(kind: ListKind) -> Self {
        Self {
            kind,
            records: Vec::new(),
            last_error: None,
            loaded: false,
        }
    }

    #[must_use]
    pub const fn kind(&self) -> ListKind {
        self.kind
    }

    #[must_use]
    pub fn records(&self) -> &[R] {
        &self.records
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// True once a load has succeeded.
    #[must_use]
    pub const fn is_loaded(&self) -> bool {
        self.loaded
    }

    /// Message of the most recent failed load, cleared by the next success.
    #[must_use]
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    #[must_use]
    pub fn find(&self, id: &str) -> Option<&R> {
        self.records.iter().find(|record| record.record_id() == id)
    }

    /// Replace the list with the result of `load`.
    ///
    /// On failure the previous list is kept and the error is both recorded and
    /// returned.
    pub async fn reload<F, Fut>(&mut self, load: F) -> Result<&[R]>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Vec<R>>>,
    {
        match load().await {
            Ok(records) => {
                tracing::debug!(list = ?self.kind, count = records.len(), "Reloaded list");
                self.records = records;
                self.last_error = None;
                self.loaded = true;
                Ok(&self.records)
            }
            Err(error) => {
                tracing::warn!(list = ?self.kind, %error, "Failed to reload list");
                self.last_error = Some(error.to_string());
                Err(error)
            }
        }
    }

    /// Reload only when `invalidation` names this store's list.
    ///
    /// Returns whether a reload happened.
    pub async fn refresh_if<F, Fut>(&mut self, invalidation: &Invalidation, load: F) -> Result<bool>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Vec<R>>>,
    {
        if !invalidation.contains(self.kind) {
            return Ok(false);
        }
        self.reload(load).await?;
        Ok(true)
    }
}
