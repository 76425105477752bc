//! Conversion between backend rows and records.

use crate::Record;

use quarry_core::{
    driver::Rows,
    schema::Column,
    stmt::Value,
    Error, Result, Schema,
};

/// Maps each result column to the schema column it loads, if any.
pub(crate) struct RowLayout<'a> {
    schema: &'a Schema,
    columns: Vec<Option<&'a Column>>,
}

impl<'a> RowLayout<'a> {
    pub(crate) fn new(schema: &'a Schema, rows: &Rows) -> Self {
        let columns = rows
            .columns
            .iter()
            .map(|name| {
                schema.column(name).or_else(|| {
                    schema
                        .columns
                        .values()
                        .find(|column| column.name.eq_ignore_ascii_case(name))
                })
            })
            .collect();

        Self { schema, columns }
    }

    /// Builds a record from one result row. Columns no field maps are
    /// skipped; fields without a column keep their default.
    pub(crate) fn to_record<R: Record>(&self, row: Vec<Value>) -> Result<R> {
        let mut record = R::default();

        for (value, column) in row.into_iter().zip(&self.columns) {
            let Some(column) = column else {
                continue;
            };

            record.set(&column.path, value).map_err(|err| {
                err.context(quarry_core::err!(
                    "failed to load column `{}` of `{}` into `{}.{}`",
                    column.name,
                    self.schema.table,
                    R::NAME,
                    column.field
                ))
            })?;
        }

        Ok(record)
    }

    /// Materializes every row. Zero rows is a not-found condition.
    pub(crate) fn to_records<R: Record>(&self, rows: Vec<Vec<Value>>) -> Result<Vec<R>> {
        if rows.is_empty() {
            return Err(Error::record_not_found(format!(
                "no rows in `{}`",
                self.schema.table
            )));
        }

        rows.into_iter().map(|row| self.to_record(row)).collect()
    }
}

/// One value per schema column, in schema order.
pub(crate) fn to_row<R: Record>(schema: &Schema, record: &R) -> Result<Vec<Value>> {
    schema
        .columns
        .values()
        .map(|column| record.get(&column.path))
        .collect()
}

/// Primary key values of `record`, in key order.
pub(crate) fn key_values<R: Record>(schema: &Schema, record: &R) -> Result<Vec<Value>> {
    schema.require_primary_key()?;
    schema
        .primary_key_columns()
        .map(|column| record.get(&column.path))
        .collect()
}

/// Cache key of `record`.
pub(crate) fn cache_key<R: Record>(schema: &Schema, record: &R) -> Result<String> {
    schema.cache_key(&key_values(schema, record)?)
}

/// Primary key values from a `SELECT <pk columns>` row, coerced to the key
/// columns' declared types so they join into the same cache key a record
/// would produce.
pub(crate) fn key_from_row(schema: &Schema, row: Vec<Value>) -> Result<Vec<Value>> {
    schema
        .primary_key_columns()
        .zip(row)
        .map(|(column, value)| value.coerce(column.ty))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use quarry_core::{schema::TableMetadata, stmt::Value};

    #[derive(Debug, Default, Clone, PartialEq, quarry::Record)]
    struct Score {
        #[column("uid")]
        uid: u32,

        #[column("level")]
        level: i16,

        #[column("points")]
        points: f64,
    }

    fn schema() -> Schema {
        Schema::build(
            "score",
            "Score",
            &<Score as crate::Field>::shape(),
            &TableMetadata::CreateStatement(
                "CREATE TABLE score (uid INT PRIMARY KEY, level INT, points DOUBLE)".to_string(),
            ),
        )
        .unwrap()
    }

    #[test]
    fn result_columns_match_case_insensitively() {
        let schema = schema();
        let rows = Rows::new(
            vec!["UID".into(), "extra".into(), "Points".into()],
            vec![vec![Value::I64(3), Value::from("ignored"), Value::from(b"2.5".to_vec())]],
        );

        let layout = RowLayout::new(&schema, &rows);
        let score: Score = layout.to_record(rows.rows[0].clone()).unwrap();
        assert_eq!(
            score,
            Score {
                uid: 3,
                level: 0,
                points: 2.5
            }
        );
    }

    #[test]
    fn out_of_range_value_is_type_error() {
        let schema = schema();
        let rows = Rows::new(vec!["level".into()], vec![vec![Value::I64(70_000)]]);

        let err = RowLayout::new(&schema, &rows)
            .to_record::<Score>(rows.rows[0].clone())
            .unwrap_err();
        assert!(err.is_type_conversion());
        assert!(err.to_string().contains("level"));
    }

    #[test]
    fn zero_rows_is_not_found() {
        let schema = schema();
        let rows = Rows::new(vec!["uid".into()], vec![]);
        let err = RowLayout::new(&schema, &rows)
            .to_records::<Score>(vec![])
            .unwrap_err();
        assert!(err.is_record_not_found());
    }

    #[test]
    fn keys_from_rows_match_record_keys() {
        let schema = schema();
        let record = Score {
            uid: 9,
            ..Score::default()
        };

        let from_row = key_from_row(&schema, vec![Value::from("9")]).unwrap();
        assert_eq!(schema.cache_key(&from_row).unwrap(), cache_key(&schema, &record).unwrap());
        assert_eq!(to_row(&schema, &record).unwrap(), [Value::U64(9), Value::I64(0), Value::F64(0.0)]);
    }
}
