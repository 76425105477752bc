use super::Query;
use crate::Record;

use quarry_core::{
    stmt::{Aggregate, Type, Value},
    Error, Result, Schema,
};

impl<R: Record> Query<R> {
    /// Counts matching rows. An unfiltered count on a cached table is the
    /// cache size.
    pub async fn count(mut self) -> Result<i64> {
        let schema = self.prepare().await?;

        if let Some(cache) = self.cache() {
            match &self.state.primary_key {
                Some(lookup) => return Ok(cache.contains(&lookup.cache_key) as i64),
                None if !self.state.has_filter() => return Ok(cache.len() as i64),
                None => {}
            }
        }

        self.aggregate(&schema, Aggregate::Count, None).await
    }

    /// Sum of `column`, which may also be an expression such as `gid*2`.
    /// Zero when no row matches.
    pub async fn sum(mut self, column: &str) -> Result<i64> {
        let schema = self.prepare().await?;
        self.aggregate(&schema, Aggregate::Sum, Some(column)).await
    }

    pub async fn min(mut self, column: &str) -> Result<i64> {
        let schema = self.prepare().await?;
        self.aggregate(&schema, Aggregate::Min, Some(column)).await
    }

    pub async fn max(mut self, column: &str) -> Result<i64> {
        let schema = self.prepare().await?;
        self.aggregate(&schema, Aggregate::Max, Some(column)).await
    }

    async fn aggregate(&self, schema: &Schema, aggregate: Aggregate, column: Option<&str>) -> Result<i64> {
        let stmt = self
            .compiler(schema)
            .aggregate(&self.state, aggregate, column)?;

        match self.db.query_stmt(&stmt).await?.into_scalar() {
            Some(value) => to_i64(value),
            None => Ok(0),
        }
    }
}

fn to_i64(value: Value) -> Result<i64> {
    if value.is_null() {
        return Ok(0);
    }

    if let Some(n) = value.to_i64() {
        return Ok(n);
    }

    match value.coerce(Type::F64)? {
        Value::F64(n) => Ok(n as i64),
        other => Err(Error::type_conversion(other, Type::I64)),
    }
}
