// @zen-component: CORE-RecordStore
//
//! Record store abstraction.
//!
//! Every logical table (credentials, sessions, retakes, password resets)
//! lives behind [`Store`], so the domain services never know whether they
//! talk to process memory or a database. [`MemoryStore`] is the concurrent
//! in-process implementation used by the server.

use std::hash::Hash;

use dashmap::DashMap;
use thiserror::Error;

/// Storage-layer failures.
///
/// These are the only errors the domain treats as unexpected; "not found"
/// is never a `StoreError`.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    #[error("Store corrupted: {0}")]
    Corrupted(String),
}

/// A value that can be kept in a [`Store`].
pub trait Record: Clone + Send + Sync + 'static {
    /// Primary key type.
    type Key: Clone + Eq + Hash + Send + Sync + 'static;

    /// Primary key of this record.
    fn key(&self) -> Self::Key;

    /// Identity (email) of the user owning this record.
    fn owner(&self) -> &str;
}

/// Narrow persistence interface shared by every table.
pub trait Store<R: Record>: Send + Sync {
    /// Fetch a record by key.
    fn get(&self, key: &R::Key) -> Result<Option<R>, StoreError>;

    /// Insert or replace a record.
    fn put(&self, record: R) -> Result<(), StoreError>;

    /// Remove a record, returning it if it existed.
    fn delete(&self, key: &R::Key) -> Result<Option<R>, StoreError>;

    /// All records owned by `owner`.
    fn scan_by_owner(&self, owner: &str) -> Result<Vec<R>, StoreError>;

    /// Every record in the table. Used by maintenance sweeps only.
    fn scan(&self) -> Result<Vec<R>, StoreError>;
}

/// In-memory store backed by a concurrent hash map.
pub struct MemoryStore<R: Record> {
    records: DashMap<R::Key, R>,
}

impl<R: Record> MemoryStore<R> {
    pub fn new() -> Self {
        Self {
            records: DashMap::new(),
        }
    }

    /// Number of records currently held.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl<R: Record> Default for MemoryStore<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Record> Store<R> for MemoryStore<R> {
    fn get(&self, key: &R::Key) -> Result<Option<R>, StoreError> {
        Ok(self.records.get(key).map(|entry| entry.value().clone()))
    }

    fn put(&self, record: R) -> Result<(), StoreError> {
        self.records.insert(record.key(), record);
        Ok(())
    }

    fn delete(&self, key: &R::Key) -> Result<Option<R>, StoreError> {
        Ok(self.records.remove(key).map(|(_, record)| record))
    }

    fn scan_by_owner(&self, owner: &str) -> Result<Vec<R>, StoreError> {
        Ok(self
            .records
            .iter()
            .filter(|entry| entry.value().owner() == owner)
            .map(|entry| entry.value().clone())
            .collect())
    }

    fn scan(&self) -> Result<Vec<R>, StoreError> {
        Ok(self
            .records
            .iter()
            .map(|entry| entry.value().clone())
            .collect())
    }
}
