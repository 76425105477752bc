mod builder;
pub use builder::Builder;

mod connect;

pub(crate) mod registry;
use registry::Registry;

use crate::{cache::TableCache, materialize::RowLayout, IntoValues, Query, Record};

use quarry_core::{
    driver::{Capability, Connection, ExecResponse, Rows},
    stmt::{self, Action, Statement},
    Result, Schema,
};
use quarry_sql::Compiler;

use std::{
    collections::BTreeMap,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
};

/// Shared state between all `Db` clones.
pub(crate) struct Shared {
    pub(crate) conn: Arc<dyn Connection>,
    pub(crate) registry: Registry,
    read_only: AtomicBool,
}

/// A database handle.
///
/// Cloning is cheap; every clone shares the connection, the bound schemas
/// and the table caches.
#[derive(Clone)]
pub struct Db {
    pub(crate) shared: Arc<Shared>,
}

impl Db {
    pub fn builder() -> Builder {
        Builder::default()
    }

    pub(crate) fn new(conn: Arc<dyn Connection>, read_only: bool) -> Db {
        Db {
            shared: Arc::new(Shared {
                conn,
                registry: Registry::default(),
                read_only: AtomicBool::new(read_only),
            }),
        }
    }

    pub fn capability(&self) -> &'static Capability {
        self.shared.conn.capability()
    }

    /// Introspects `table` as seen through `R` and stores the resulting
    /// schema, replacing any earlier binding of the table. With `cache`
    /// set, the table is then loaded into memory.
    pub async fn bind<R: Record>(&self, table: &str, cache: bool) -> Result<Arc<Schema>> {
        let metadata = self.shared.conn.describe_table(table).await?;
        let schema = Arc::new(Schema::build(table, R::NAME, &R::shape(), &metadata)?);

        tracing::debug!(
            table,
            record = R::NAME,
            columns = schema.columns.len(),
            primary_key = ?schema.primary_key,
            "bound table"
        );

        self.shared.registry.insert::<R>(table, schema.clone());

        if cache {
            self.fill_cache::<R>(table, &schema).await?;
        }

        Ok(schema)
    }

    /// The schema of `table` for `R`, binding the table without a cache on
    /// first use.
    pub(crate) async fn schema_for<R: Record>(&self, table: &str) -> Result<Arc<Schema>> {
        match self.shared.registry.schema_for::<R>(table) {
            Some(schema) => Ok(schema),
            None => self.bind::<R>(table, false).await,
        }
    }

    /// The schema `table` was last bound with.
    pub fn schema(&self, table: &str) -> Option<Arc<Schema>> {
        self.shared.registry.schema(table)
    }

    /// Starts a query against `table`.
    pub fn table<R: Record>(&self, table: impl Into<String>) -> Query<R> {
        Query::new(self.clone(), table.into())
    }

    /// Replaces the cache of `table` with a fresh full scan. Returns the
    /// number of records loaded.
    pub async fn load_cache<R: Record>(&self, table: &str) -> Result<usize> {
        let schema = self.schema_for::<R>(table).await?;
        self.fill_cache::<R>(table, &schema).await
    }

    async fn fill_cache<R: Record>(&self, table: &str, schema: &Schema) -> Result<usize> {
        schema.require_primary_key()?;

        self.shared.registry.begin_load(table);

        let cache = match self.scan::<R>(schema).await {
            Ok(cache) => Arc::new(cache),
            Err(err) => {
                self.shared.registry.uncache(table);
                return Err(err);
            }
        };

        let len = cache.len();
        if self.shared.registry.finish_load::<R>(table, cache) {
            tracing::info!(table, records = len, "loaded table cache");
        } else {
            tracing::warn!(table, "table re-bound while loading; cache discarded");
        }

        Ok(len)
    }

    async fn scan<R: Record>(&self, schema: &Schema) -> Result<TableCache<R>> {
        let stmt = Compiler::new(schema, self.capability()).compile(
            Action::SelectAll,
            &stmt::Query::default(),
            None,
        )?;
        let rows = self.query_stmt(&stmt).await?;
        let layout = RowLayout::new(schema, &rows);

        let cache = TableCache::new();
        for row in rows.rows {
            let record = layout.to_record::<R>(row)?;
            cache.insert(crate::materialize::cache_key(schema, &record)?, record);
        }
        Ok(cache)
    }

    /// Loads `table` into memory unless it is already cached.
    pub async fn enable_cache<R: Record>(&self, table: &str) -> Result<()> {
        if self.shared.registry.cache::<R>(table).is_some() {
            return Ok(());
        }
        self.load_cache::<R>(table).await?;
        Ok(())
    }

    /// Drops the cache of `table`. Later reads go to the backend.
    pub fn disable_cache(&self, table: &str) {
        self.shared.registry.uncache(table);
    }

    /// Number of cached records, or `None` when `table` is not cached.
    pub fn cache_len(&self, table: &str) -> Option<usize> {
        self.shared.registry.cache_len(table)
    }

    /// A copy of every cached record of `table`, keyed by cache key.
    pub fn all_from_cache<R: Record>(&self, table: &str) -> Option<BTreeMap<String, R>> {
        self.shared
            .registry
            .cache::<R>(table)
            .map(|cache| cache.snapshot())
    }

    pub(crate) fn cache<R: Record>(&self, table: &str) -> Option<Arc<TableCache<R>>> {
        self.shared.registry.cache::<R>(table)
    }

    /// In read-only mode every write returns an empty result without
    /// reaching the backend.
    pub fn set_read_only(&self, read_only: bool) {
        self.shared.read_only.store(read_only, Ordering::Relaxed);
    }

    pub fn is_read_only(&self) -> bool {
        self.shared.read_only.load(Ordering::Relaxed)
    }

    /// Executes raw statement text, such as DDL. Returns the affected row
    /// count, or zero when the backend does not report one.
    pub async fn execute(&self, sql: &str, args: impl IntoValues) -> Result<u64> {
        if self.is_read_only() {
            return Ok(0);
        }
        let response = self.exec_stmt(&Statement::new(sql, args.into_values())).await?;
        Ok(response.rows_affected.unwrap_or(0))
    }

    /// Runs a raw read.
    pub async fn query(&self, sql: &str, args: impl IntoValues) -> Result<Rows> {
        self.query_stmt(&Statement::new(sql, args.into_values())).await
    }

    pub(crate) async fn exec_stmt(&self, stmt: &Statement) -> Result<ExecResponse> {
        tracing::debug!(sql = %stmt, "exec");
        self.shared
            .conn
            .exec(stmt)
            .await
            .inspect_err(|err| log_failure(stmt, err))
    }

    pub(crate) async fn query_stmt(&self, stmt: &Statement) -> Result<Rows> {
        tracing::debug!(sql = %stmt, "query");
        self.shared
            .conn
            .query(stmt)
            .await
            .inspect_err(|err| log_failure(stmt, err))
    }
}

pub(crate) fn log_failure(stmt: &Statement, err: &quarry_core::Error) {
    tracing::error!(sql = %stmt, error = %err, "statement failed");
}

impl std::fmt::Debug for Db {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Db")
            .field("conn", &self.shared.conn)
            .field("tables", &self.shared.registry)
            .field("read_only", &self.is_read_only())
            .finish()
    }
}
