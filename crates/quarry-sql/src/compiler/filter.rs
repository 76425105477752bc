use super::{And, Compiler, Equals, Formatter, Param, ToSql};

use quarry_core::{
    stmt::{Query, Value},
    Error, Result,
};

/// What restricts a compiled statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum FilterKind {
    None,
    PrimaryKey,
    Other,
}

impl Compiler<'_> {
    /// Writes the `WHERE` clause for `query`.
    ///
    /// A primary-key lookup is exclusive. Otherwise the free-form predicate
    /// comes first, followed by the equality filters, joined by `AND`.
    pub(super) fn filter(&self, f: &mut Formatter<'_>, query: &Query) -> Result<FilterKind> {
        if let Some(lookup) = &query.primary_key {
            self.key_equality(f, &lookup.values)?;
            return Ok(FilterKind::PrimaryKey);
        }

        if !query.has_filter() {
            return Ok(FilterKind::None);
        }

        f.dst.push_str(" WHERE ");

        if !query.predicate.is_empty() {
            let wrap = !query.filter_eq.is_empty() && contains_or(&query.predicate);
            if wrap {
                f.dst.push('(');
            }
            f.dst.push_str(&query.predicate);
            if wrap {
                f.dst.push(')');
            }
            for arg in &query.predicate_args {
                f.push_arg(arg.clone());
            }
        }

        if !query.filter_eq.is_empty() {
            if !query.predicate.is_empty() {
                f.dst.push_str(" AND ");
            }
            fmt!(f, And(query.filter_eq.iter().map(|(column, value)| Equals(column, Param(value.clone())))));
        }

        Ok(FilterKind::Other)
    }

    /// Writes ` WHERE pk1=? AND pk2=?` over the given key values.
    pub(super) fn key_equality(&self, f: &mut Formatter<'_>, values: &[Value]) -> Result<()> {
        self.schema.require_primary_key()?;

        if values.len() != self.schema.primary_key.len() {
            return Err(Error::invalid_statement(format!(
                "table `{}` has {} primary key column(s), got {} value(s)",
                self.schema.table,
                self.schema.primary_key.len(),
                values.len()
            )));
        }

        fmt!(f, " WHERE " And(
            self.schema
                .primary_key
                .iter()
                .zip(values)
                .map(|(column, value)| Equals(column, Param(value.clone())))
        ));
        Ok(())
    }

    /// Key equality using the key columns of a schema-ordered row.
    pub(super) fn row_key_equality(&self, f: &mut Formatter<'_>, row: &[Value]) -> Result<()> {
        let values = self
            .schema
            .primary_key
            .iter()
            .map(|column| self.row_value(row, column))
            .collect::<Vec<_>>();
        self.key_equality(f, &values)
    }
}

fn contains_or(predicate: &str) -> bool {
    predicate.to_ascii_uppercase().contains(" OR ")
}
