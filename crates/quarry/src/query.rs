mod aggregate;

mod into_values;
pub use into_values::IntoValues;

mod read;
mod write;

use crate::{cache::TableCache, Db, Record};

use quarry_core::{
    schema::join_key,
    stmt::{self, Assignment, Direction, Limit, OrderBy, PrimaryKeyLookup},
    Error, Result, Schema,
};
use quarry_sql::Compiler;

use std::{marker::PhantomData, sync::Arc};

/// A query against one table, built up by chaining and run by one of the
/// terminal operations.
///
/// Mutators never fail. An invalid argument, such as a null primary key
/// value, is held until the terminal operation and returned from it.
#[must_use = "queries do nothing until a terminal operation is awaited"]
pub struct Query<R> {
    db: Db,
    table: String,
    state: stmt::Query,
    error: Option<Error>,
    _p: PhantomData<fn() -> R>,
}

impl<R: Record> Query<R> {
    pub(crate) fn new(db: Db, table: String) -> Self {
        Self {
            db,
            table,
            state: stmt::Query::default(),
            error: None,
            _p: PhantomData,
        }
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    /// ANDs a predicate such as `"uid>? AND gid>?"` onto the filter.
    pub fn filter(mut self, predicate: &str, args: impl IntoValues) -> Self {
        self.state.and_predicate(predicate, args.into_values());
        self
    }

    /// Same as [`Query::filter`].
    pub fn and(self, predicate: &str, args: impl IntoValues) -> Self {
        self.filter(predicate, args)
    }

    /// ORs a predicate onto the filter.
    pub fn or_filter(mut self, predicate: &str, args: impl IntoValues) -> Self {
        self.state.or_predicate(predicate, args.into_values());
        self
    }

    /// Adds `column = value`, ANDed after the predicate.
    pub fn filter_eq(mut self, column: impl Into<String>, value: impl Into<stmt::Value>) -> Self {
        self.state.filter_eq.push((column.into(), value.into()));
        self
    }

    /// Addresses one row by its primary key values, in key order. Other
    /// filters are ignored once this is set.
    pub fn filter_pk(mut self, values: impl IntoValues) -> Self {
        let values = values.into_values();
        match join_key(&values) {
            Ok(cache_key) => self.state.primary_key = Some(PrimaryKeyLookup { values, cache_key }),
            Err(err) => self.defer(err),
        }
        self
    }

    pub fn sort(mut self, column: impl Into<String>, direction: Direction) -> Self {
        self.state.order_by.push(OrderBy::new(column, direction));
        self
    }

    pub fn sort_by<I, C>(mut self, items: I) -> Self
    where
        I: IntoIterator<Item = (C, Direction)>,
        C: Into<String>,
    {
        self.state
            .order_by
            .extend(items.into_iter().map(|(column, direction)| OrderBy::new(column, direction)));
        self
    }

    /// `limit(10, None)` caps the result at ten rows; `limit(20, Some(10))`
    /// skips twenty rows and then caps at ten.
    pub fn limit(mut self, start: u64, count: Option<u64>) -> Self {
        self.state.limit = Limit::new(start, count);
        self
    }

    /// Restricts the projection. Unmapped names, such as expressions, are
    /// passed through as written.
    pub fn fields<I, F>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = F>,
        F: AsRef<str>,
    {
        self.state.fields = fields.into_iter().map(|field| field.as_ref().to_string()).collect();
        self
    }

    /// Adds a partial-update assignment. A trailing `+`, `-`, `*` or `%` on
    /// `spec` applies that operator to the current value; `=` or nothing
    /// assigns.
    pub fn set(mut self, spec: &str, value: impl Into<stmt::Value>) -> Self {
        self.state.assignments.push(Assignment::parse(spec, value));
        self
    }

    fn defer(&mut self, err: Error) {
        if self.error.is_none() {
            self.error = Some(err);
        }
    }

    /// Surfaces a deferred error and resolves the table's schema.
    async fn prepare(&mut self) -> Result<Arc<Schema>> {
        if let Some(err) = self.error.take() {
            return Err(err);
        }

        let schema = self.db.schema_for::<R>(&self.table).await?;

        if let Some(lookup) = &self.state.primary_key {
            schema.cache_key(&lookup.values)?;
        }

        Ok(schema)
    }

    fn compiler<'a>(&self, schema: &'a Schema) -> Compiler<'a> {
        Compiler::new(schema, self.db.capability())
    }

    fn cache(&self) -> Option<Arc<TableCache<R>>> {
        self.db.cache::<R>(&self.table)
    }

    fn not_found(&self) -> Error {
        match &self.state.primary_key {
            Some(lookup) => Error::record_not_found(format!(
                "no `{}` row with primary key `{}`",
                self.table, lookup.cache_key
            )),
            None => Error::record_not_found(format!("no matching `{}` rows", self.table)),
        }
    }
}

impl<R> std::fmt::Debug for Query<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Query")
            .field("table", &self.table)
            .field("state", &self.state)
            .field("error", &self.error)
            .finish()
    }
}
