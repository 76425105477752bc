use super::Query;
use crate::{materialize::RowLayout, Record};

use quarry_core::{stmt::Action, Result};

impl<R: Record> Query<R> {
    /// Fetches the first matching record.
    ///
    /// A primary-key lookup on a cached table is answered from the cache
    /// alone; a miss there is not-found.
    pub async fn one(mut self) -> Result<R> {
        let schema = self.prepare().await?;

        if let (Some(lookup), Some(cache)) = (&self.state.primary_key, self.cache()) {
            return cache.get(&lookup.cache_key).ok_or_else(|| self.not_found());
        }

        let stmt = self
            .compiler(&schema)
            .compile(Action::SelectOne, &self.state, None)?;
        let rows = self.db.query_stmt(&stmt).await?;
        let layout = RowLayout::new(&schema, &rows);

        match rows.rows.into_iter().next() {
            Some(row) => layout.to_record(row),
            None => Err(self.not_found()),
        }
    }

    /// Fetches every matching record. No match is not-found rather than an
    /// empty list.
    pub async fn all(mut self) -> Result<Vec<R>> {
        let schema = self.prepare().await?;

        if let (Some(lookup), Some(cache)) = (&self.state.primary_key, self.cache()) {
            return match cache.get(&lookup.cache_key) {
                Some(record) => Ok(vec![record]),
                None => Err(self.not_found()),
            };
        }

        let stmt = self
            .compiler(&schema)
            .compile(Action::SelectAll, &self.state, None)?;
        let rows = self.db.query_stmt(&stmt).await?;

        RowLayout::new(&schema, &rows)
            .to_records(rows.rows)
            .map_err(|err| if err.is_record_not_found() { self.not_found() } else { err })
    }
}
