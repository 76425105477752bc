//! Per-table write-through record cache.

use crate::Record;

use dashmap::DashMap;
use std::{any::Any, collections::BTreeMap, sync::Arc};

/// Records of one table keyed by joined primary key text.
///
/// Safe for concurrent reads and writes without external locking.
#[derive(Debug)]
pub struct TableCache<R> {
    entries: DashMap<String, R>,
}

impl<R: Record> TableCache<R> {
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// A copy of the record stored under `key`.
    pub fn get(&self, key: &str) -> Option<R> {
        self.entries.get(key).map(|entry| entry.value().clone())
    }

    pub fn insert(&self, key: String, record: R) {
        self.entries.insert(key, record);
    }

    pub fn remove(&self, key: &str) -> Option<R> {
        self.entries.remove(key).map(|(_, record)| record)
    }

    pub fn clear(&self) {
        self.entries.clear();
    }

    /// A sorted copy of every entry.
    pub fn snapshot(&self) -> BTreeMap<String, R> {
        self.entries
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().clone()))
            .collect()
    }
}

impl<R: Record> Default for TableCache<R> {
    fn default() -> Self {
        Self::new()
    }
}

/// Type-erased handle the registry stores.
pub(crate) trait AnyCache: Send + Sync + 'static {
    fn len(&self) -> usize;

    fn into_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync>;
}

impl<R: Record> AnyCache for TableCache<R> {
    fn len(&self) -> usize {
        self.entries.len()
    }

    fn into_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync> {
        self
    }
}
