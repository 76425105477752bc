use super::{Comma, Compiler, Equals, Formatter, Ident, Param, ToSql};

use quarry_core::{
    stmt::{Assignment, Query, Value},
    Error, Result,
};

struct SetItem<'a>(&'a Assignment);

impl ToSql for SetItem<'_> {
    fn to_sql(self, f: &mut Formatter<'_>) {
        let Assignment { column, op, value } = self.0;
        match op.symbol() {
            None => fmt!(f, Ident(column) "=" Param(value.clone())),
            Some(symbol) => {
                fmt!(f, Ident(column) "=" Ident(column));
                f.dst.push(symbol);
                fmt!(f, Param(value.clone()));
            }
        }
    }
}

impl Compiler<'_> {
    /// Full-row update. Key columns are never assigned; without an explicit
    /// filter the row's own key addresses it.
    pub(super) fn update(&self, f: &mut Formatter<'_>, query: &Query, row: &[Value]) -> Result<()> {
        let columns = self.schema.update_columns().collect::<Vec<_>>();
        if columns.is_empty() {
            return Err(Error::invalid_statement(format!(
                "table `{}` has no non-key columns to update",
                self.schema.table
            )));
        }

        self.check_key_addressed(query)?;

        fmt!(f, "UPDATE " self.table() " SET " Comma(
            columns
                .iter()
                .map(|column| Equals(&column.name, Param(self.row_value(row, &column.name))))
        ));

        if query.has_filter() {
            self.filter(f, query)?;
        } else {
            self.row_key_equality(f, row)?;
        }

        if self.capability.update_limit {
            f.dst.push_str(" LIMIT 1");
        }

        Ok(())
    }

    /// Update from accumulated assignments. Assignment arguments precede
    /// filter arguments.
    pub(super) fn update_partial(&self, f: &mut Formatter<'_>, query: &Query) -> Result<()> {
        let assignments = query
            .assignments
            .iter()
            .filter(|assignment| !self.schema.is_primary_key(&assignment.column))
            .collect::<Vec<_>>();

        if assignments.is_empty() {
            return Err(Error::invalid_statement(format!(
                "partial update of `{}` has no non-key assignments",
                self.schema.table
            )));
        }

        for assignment in &assignments {
            if self.schema.column(&assignment.column).is_none() {
                return Err(Error::invalid_statement(format!(
                    "table `{}` has no mapped column `{}`",
                    self.schema.table, assignment.column
                )));
            }

            if !assignment.op.is_set() && self.capability.is_cql() {
                return Err(Error::unsupported_feature(format!(
                    "{:?} cannot apply `{}` to column `{}`; write the computed value per row",
                    self.capability.dialect,
                    assignment.op.symbol().unwrap_or('='),
                    assignment.column
                )));
            }
        }

        self.check_key_addressed(query)?;
        self.check_unlimited(query)?;

        fmt!(f, "UPDATE " self.table() " SET " Comma(assignments.iter().copied().map(SetItem)));
        self.filter(f, query)?;

        Ok(())
    }

    /// Backends without filtered writes only accept rows addressed by full
    /// primary key.
    pub(super) fn check_key_addressed(&self, query: &Query) -> Result<()> {
        if self.capability.filtered_writes || query.primary_key.is_some() {
            return Ok(());
        }

        if query.has_filter() || !query.assignments.is_empty() {
            return Err(Error::unsupported_feature(format!(
                "{:?} writes must address `{}` by its full primary key; resolve the keys first",
                self.capability.dialect, self.schema.table
            )));
        }

        Ok(())
    }

    /// Filtered writes touch every matching row. A row window has to be
    /// resolved to keys by the caller.
    pub(super) fn check_unlimited(&self, query: &Query) -> Result<()> {
        if query.limit.is_none() || query.primary_key.is_some() {
            return Ok(());
        }

        Err(Error::invalid_statement(format!(
            "filtered write to `{}` cannot take a LIMIT; resolve the keys first",
            self.schema.table
        )))
    }
}
