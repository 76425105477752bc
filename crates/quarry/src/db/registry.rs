use crate::{
    cache::{AnyCache, TableCache},
    Record,
};

use parking_lot::RwLock;
use quarry_core::Schema;
use std::{any::TypeId, collections::HashMap, sync::Arc};

/// Bound tables: memoized schemas and their cache state.
#[derive(Default)]
pub(crate) struct Registry {
    tables: RwLock<HashMap<String, Entry>>,
}

struct Entry {
    schema: Arc<Schema>,

    /// Record type the schema was built from
    record: TypeId,

    cache: CacheState,
}

enum CacheState {
    Uncached,

    /// A full scan is in flight. Reads and writes treat the table as
    /// uncached until it completes.
    Loading,

    Cached(Arc<dyn AnyCache>),
}

impl Registry {
    /// The schema bound to `table`, if it was built from `R`.
    pub(crate) fn schema_for<R: Record>(&self, table: &str) -> Option<Arc<Schema>> {
        let tables = self.tables.read();
        let entry = tables.get(table)?;
        (entry.record == TypeId::of::<R>()).then(|| entry.schema.clone())
    }

    pub(crate) fn schema(&self, table: &str) -> Option<Arc<Schema>> {
        self.tables.read().get(table).map(|entry| entry.schema.clone())
    }

    /// Stores `schema` for `table`. Replacing a binding drops the table's
    /// cache.
    pub(crate) fn insert<R: Record>(&self, table: &str, schema: Arc<Schema>) {
        self.tables.write().insert(
            table.to_string(),
            Entry {
                schema,
                record: TypeId::of::<R>(),
                cache: CacheState::Uncached,
            },
        );
    }

    /// The table's cache, when the table is cached with records of type `R`.
    pub(crate) fn cache<R: Record>(&self, table: &str) -> Option<Arc<TableCache<R>>> {
        let tables = self.tables.read();
        let CacheState::Cached(cache) = &tables.get(table)?.cache else {
            return None;
        };
        cache.clone().into_any().downcast::<TableCache<R>>().ok()
    }

    pub(crate) fn cache_len(&self, table: &str) -> Option<usize> {
        match &self.tables.read().get(table)?.cache {
            CacheState::Cached(cache) => Some(cache.len()),
            _ => None,
        }
    }

    /// Marks `table` as loading.
    pub(crate) fn begin_load(&self, table: &str) {
        if let Some(entry) = self.tables.write().get_mut(table) {
            entry.cache = CacheState::Loading;
        }
    }

    /// Installs a loaded cache. Ignored if the table was unbound, re-bound
    /// or uncached while the scan ran.
    pub(crate) fn finish_load<R: Record>(&self, table: &str, cache: Arc<TableCache<R>>) -> bool {
        let mut tables = self.tables.write();
        match tables.get_mut(table) {
            Some(entry)
                if entry.record == TypeId::of::<R>()
                    && matches!(entry.cache, CacheState::Loading) =>
            {
                entry.cache = CacheState::Cached(cache);
                true
            }
            _ => false,
        }
    }

    pub(crate) fn uncache(&self, table: &str) {
        if let Some(entry) = self.tables.write().get_mut(table) {
            entry.cache = CacheState::Uncached;
        }
    }
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let tables = self.tables.read();
        let mut map = f.debug_map();
        for (table, entry) in tables.iter() {
            let state = match &entry.cache {
                CacheState::Uncached => "uncached",
                CacheState::Loading => "loading",
                CacheState::Cached(_) => "cached",
            };
            map.entry(table, &(entry.schema.record, state));
        }
        map.finish()
    }
}
