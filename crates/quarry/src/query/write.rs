use super::Query;
use crate::{
    db::log_failure,
    materialize::{self, RowLayout},
    Record,
};

use quarry_core::{
    stmt::{self, Action, Assignment, AssignmentOp, PrimaryKeyLookup, Value},
    Error, Result, Schema,
};

impl<R: Record> Query<R> {
    /// Inserts `record` and returns the generated id, or zero when the
    /// backend generated none. The id is written back into the
    /// auto-increment field before the record is cached.
    pub async fn insert(mut self, record: &mut R) -> Result<i64> {
        if self.db.is_read_only() {
            return Ok(0);
        }

        let schema = self.prepare().await?;
        let row = materialize::to_row(&schema, record)?;
        let stmt = self
            .compiler(&schema)
            .compile(Action::Insert, &self.state, Some(&row))?;

        let response = self.db.exec_stmt(&stmt).await?;
        write_back_id(&schema, record, response.last_insert_id)?;

        if let Some(cache) = self.cache() {
            cache.insert(materialize::cache_key(&schema, record)?, record.clone());
        }

        Ok(response.last_insert_id.unwrap_or(0))
    }

    /// Inserts `record` unless a row with the same key exists. Returns
    /// whether the row was inserted; a duplicate is not an error.
    pub async fn insert_ignore(mut self, record: &mut R) -> Result<bool> {
        if self.db.is_read_only() {
            return Ok(false);
        }

        let schema = self.prepare().await?;
        let row = materialize::to_row(&schema, record)?;
        let stmt = self
            .compiler(&schema)
            .compile(Action::InsertIgnore, &self.state, Some(&row))?;

        tracing::debug!(sql = %stmt, "exec");
        let response = match self.db.shared.conn.exec(&stmt).await {
            Ok(response) => response,
            Err(err) if err.is_duplicate_key() => {
                tracing::warn!(table = %self.table, error = %err, "duplicate row ignored");
                return Ok(false);
            }
            Err(err) => {
                log_failure(&stmt, &err);
                return Err(err);
            }
        };

        if !response.rows_affected.is_some_and(|n| n > 0) {
            return Ok(false);
        }

        write_back_id(&schema, record, response.last_insert_id)?;

        if let Some(cache) = self.cache() {
            cache.insert(materialize::cache_key(&schema, record)?, record.clone());
        }

        Ok(true)
    }

    /// Writes `record` over any row with the same key. Backends without a
    /// native replace delete the key first and then insert.
    pub async fn replace(mut self, record: &R) -> Result<u64> {
        if self.db.is_read_only() {
            return Ok(0);
        }

        let schema = self.prepare().await?;
        let row = materialize::to_row(&schema, record)?;
        let compiler = self.compiler(&schema);

        let affected = if compiler.capability().native_replace {
            let stmt = compiler.compile(Action::Replace, &self.state, Some(&row))?;
            self.db.exec_stmt(&stmt).await?.rows_affected.unwrap_or(0)
        } else {
            let lookup = key_lookup(&schema, materialize::key_values(&schema, record)?)?;
            let delete = compiler.compile(Action::Delete, &keyed(lookup, vec![]), None)?;
            self.db.exec_stmt(&delete).await?;

            let insert = compiler.compile(Action::Insert, &self.state, Some(&row))?;
            self.db.exec_stmt(&insert).await?.rows_affected.unwrap_or(0)
        };

        if let Some(cache) = self.cache() {
            cache.insert(materialize::cache_key(&schema, record)?, record.clone());
        }

        Ok(affected)
    }

    /// Updates every non-key column from `record`. Without a filter the
    /// record's own key addresses the row.
    pub async fn update(mut self, record: &R) -> Result<u64> {
        if self.db.is_read_only() {
            return Ok(0);
        }

        let schema = self.prepare().await?;
        let row = materialize::to_row(&schema, record)?;
        let stmt = self
            .compiler(&schema)
            .compile(Action::Update, &self.state, Some(&row))?;

        let affected = self.db.exec_stmt(&stmt).await?.rows_affected.unwrap_or(0);

        if let Some(cache) = self.cache() {
            cache.insert(materialize::cache_key(&schema, record)?, record.clone());
        }

        Ok(affected)
    }

    /// Applies the assignments added with [`Query::set`] to every matching
    /// row.
    ///
    /// Uncached tables take a single filtered statement. Cached tables,
    /// limited queries and backends that only write rows addressed by key
    /// resolve the matching keys first and issue one statement per key, so
    /// the backend and the cache change the same rows. Cached records are
    /// recomputed before anything is written; a record the assignments
    /// cannot be applied to fails the call with the backend untouched.
    pub async fn update_partial(mut self) -> Result<u64> {
        if self.db.is_read_only() {
            return Ok(0);
        }

        let schema = self.prepare().await?;
        let compiler = self.compiler(&schema);
        let cache = self.cache();
        let assignments = partial_assignments(&schema, &self.state.assignments)?;
        let bulk = compiler.capability().filtered_writes;

        if bulk && cache.is_none() && self.state.limit.is_none() {
            let stmt = compiler.compile(Action::UpdatePartial, &self.state, None)?;
            return Ok(self.db.exec_stmt(&stmt).await?.rows_affected.unwrap_or(0));
        }

        // arithmetic the backend cannot evaluate is computed from the current
        // record and written as a plain assignment
        let computed = !bulk && assignments.iter().any(|assignment| !assignment.op.is_set());

        let mut planned = vec![];
        for key in self.resolve_keys(&schema).await? {
            let lookup = key_lookup(&schema, key)?;

            let current = match &cache {
                Some(cache) => cache.get(&lookup.cache_key),
                None if computed => self.fetch(&schema, &lookup).await?,
                None => None,
            };

            let next = match current {
                Some(mut record) => {
                    apply_assignments(&schema, &mut record, &assignments)?;
                    Some(record)
                }
                None if computed => {
                    tracing::warn!(
                        table = %self.table,
                        key = %lookup.cache_key,
                        "row to update not found; skipped"
                    );
                    continue;
                }
                None => {
                    if cache.is_some() {
                        tracing::warn!(
                            table = %self.table,
                            key = %lookup.cache_key,
                            "updated row missing from cache"
                        );
                    }
                    None
                }
            };

            planned.push((lookup, next));
        }

        let mut affected = 0;
        for (lookup, next) in planned {
            let writes = match (&next, computed) {
                (Some(record), true) => computed_assignments(&schema, record, &assignments)?,
                _ => assignments.clone(),
            };

            let stmt = compiler.compile(Action::UpdatePartial, &keyed(lookup.clone(), writes), None)?;
            affected += self.db.exec_stmt(&stmt).await?.rows_affected.unwrap_or(0);

            if let (Some(cache), Some(record)) = (&cache, next) {
                cache.insert(lookup.cache_key, record);
            }
        }

        Ok(affected)
    }

    /// Deletes matching rows. Without a filter this is [`Query::truncate`].
    ///
    /// Like [`Query::update_partial`], cached tables and limited queries
    /// delete exactly the resolved keys, evicting each one as it goes.
    pub async fn delete(mut self) -> Result<u64> {
        if self.db.is_read_only() {
            return Ok(0);
        }

        let schema = self.prepare().await?;

        if !self.state.has_filter() {
            return self.truncate_table(&schema).await;
        }

        let compiler = self.compiler(&schema);
        let cache = self.cache();

        if compiler.capability().filtered_writes && cache.is_none() && self.state.limit.is_none() {
            let stmt = compiler.compile(Action::Delete, &self.state, None)?;
            return Ok(self.db.exec_stmt(&stmt).await?.rows_affected.unwrap_or(0));
        }

        let keys = match &self.state.primary_key {
            Some(lookup) => vec![lookup.values.clone()],
            None => self.resolve_keys(&schema).await?,
        };

        let mut affected = 0;
        for key in keys {
            let lookup = key_lookup(&schema, key)?;
            let stmt = compiler.compile(Action::Delete, &keyed(lookup.clone(), vec![]), None)?;
            affected += self.db.exec_stmt(&stmt).await?.rows_affected.unwrap_or(0);

            if let Some(cache) = &cache {
                cache.remove(&lookup.cache_key);
            }
        }
        Ok(affected)
    }

    /// Removes every row of the table and empties its cache.
    pub async fn truncate(mut self) -> Result<u64> {
        if self.db.is_read_only() {
            return Ok(0);
        }

        let schema = self.prepare().await?;
        self.truncate_table(&schema).await
    }

    async fn truncate_table(&self, schema: &Schema) -> Result<u64> {
        if let Some(cache) = self.cache() {
            cache.clear();
        }

        let stmt = self
            .compiler(schema)
            .compile(Action::Truncate, &stmt::Query::default(), None)?;
        Ok(self.db.exec_stmt(&stmt).await?.rows_affected.unwrap_or(0))
    }

    /// Primary keys of the rows the current filter matches, coerced to the
    /// key column types.
    async fn resolve_keys(&self, schema: &Schema) -> Result<Vec<Vec<Value>>> {
        let stmt = self
            .compiler(schema)
            .compile(Action::SelectKeys, &self.state, None)?;
        let rows = self.db.query_stmt(&stmt).await?;

        rows.rows
            .into_iter()
            .map(|row| materialize::key_from_row(schema, row))
            .collect()
    }

    /// Reads one row by key, bypassing the cache.
    async fn fetch(&self, schema: &Schema, lookup: &PrimaryKeyLookup) -> Result<Option<R>> {
        let stmt = self
            .compiler(schema)
            .compile(Action::SelectOne, &keyed(lookup.clone(), vec![]), None)?;
        let rows = self.db.query_stmt(&stmt).await?;
        let layout = RowLayout::new(schema, &rows);

        rows.rows
            .into_iter()
            .next()
            .map(|row| layout.to_record(row))
            .transpose()
    }
}

fn keyed(lookup: PrimaryKeyLookup, assignments: Vec<Assignment>) -> stmt::Query {
    stmt::Query {
        primary_key: Some(lookup),
        assignments,
        ..stmt::Query::default()
    }
}

fn key_lookup(schema: &Schema, values: Vec<Value>) -> Result<PrimaryKeyLookup> {
    Ok(PrimaryKeyLookup {
        cache_key: schema.cache_key(&values)?,
        values,
    })
}

fn mapped_column<'a>(schema: &'a Schema, name: &str) -> Result<&'a quarry_core::schema::Column> {
    schema.column(name).ok_or_else(|| {
        Error::invalid_statement(format!(
            "table `{}` has no mapped column `{name}`",
            schema.table
        ))
    })
}

/// Non-key assignments, each naming a mapped column.
fn partial_assignments(schema: &Schema, assignments: &[Assignment]) -> Result<Vec<Assignment>> {
    let mut kept = vec![];
    for assignment in assignments {
        mapped_column(schema, &assignment.column)?;
        if !schema.is_primary_key(&assignment.column) {
            kept.push(assignment.clone());
        }
    }

    if kept.is_empty() {
        return Err(Error::invalid_statement(format!(
            "partial update of `{}` has no non-key assignments",
            schema.table
        )));
    }
    Ok(kept)
}

/// Plain assignments carrying the values `record` holds for each assigned
/// column.
fn computed_assignments<R: Record>(schema: &Schema, record: &R, assignments: &[Assignment]) -> Result<Vec<Assignment>> {
    assignments
        .iter()
        .map(|assignment| -> Result<Assignment> {
            let column = mapped_column(schema, &assignment.column)?;
            Ok(Assignment {
                column: assignment.column.clone(),
                op: AssignmentOp::Set,
                value: record.get(&column.path)?,
            })
        })
        .collect()
}

/// Applies assignments to a record, skipping key columns.
fn apply_assignments<R: Record>(schema: &Schema, record: &mut R, assignments: &[Assignment]) -> Result<()> {
    for assignment in assignments {
        if schema.is_primary_key(&assignment.column) {
            continue;
        }

        let column = mapped_column(schema, &assignment.column)?;
        let current = record.get(&column.path)?;
        let next = assignment.op.apply(&current, &assignment.value)?;
        record.set(&column.path, next)?;
    }
    Ok(())
}

/// Stores a generated id in the auto-increment field.
fn write_back_id<R: Record>(schema: &Schema, record: &mut R, id: Option<i64>) -> Result<()> {
    let (Some(name), Some(id)) = (&schema.auto_increment, id) else {
        return Ok(());
    };
    let column = mapped_column(schema, name)?;
    record.set(&column.path, Value::I64(id))
}
