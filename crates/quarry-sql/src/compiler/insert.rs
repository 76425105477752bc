use super::{Comma, Compiler, Formatter, Ident, Param, ToSql};

use quarry_core::{
    driver::Dialect,
    schema::Column,
    stmt::Value,
    Error, Result,
};

impl Compiler<'_> {
    /// `INSERT` over every column but the auto-increment one.
    pub(super) fn insert(&self, f: &mut Formatter<'_>, row: &[Value], ignore: bool) -> Result<()> {
        let columns = self.schema.insert_columns().collect::<Vec<_>>();

        let verb = match (ignore, self.capability.dialect) {
            (true, Dialect::Mysql) => "INSERT IGNORE INTO ",
            (true, Dialect::Sqlite) => "INSERT OR IGNORE INTO ",
            _ => "INSERT INTO ",
        };

        self.values(f, verb, &columns, row)?;

        if ignore && self.capability.dialect == Dialect::Cql {
            f.dst.push_str(" IF NOT EXISTS");
        }

        Ok(())
    }

    /// `REPLACE INTO` over every column.
    pub(super) fn replace(&self, f: &mut Formatter<'_>, row: &[Value]) -> Result<()> {
        if !self.capability.native_replace {
            return Err(Error::unsupported_feature(format!(
                "{:?} has no REPLACE statement; delete by primary key, then insert",
                self.capability.dialect
            )));
        }

        let columns = self.schema.columns.values().collect::<Vec<_>>();
        self.values(f, "REPLACE INTO ", &columns, row)
    }

    fn values(&self, f: &mut Formatter<'_>, verb: &str, columns: &[&Column], row: &[Value]) -> Result<()> {
        if columns.is_empty() {
            return Err(Error::invalid_statement(format!(
                "table `{}` has no columns to write",
                self.schema.table
            )));
        }

        fmt!(f, verb self.table() " (" Comma(columns.iter().map(|column| Ident(&column.name))) ") VALUES (");
        fmt!(f, Comma(columns.iter().map(|column| Param(self.row_value(row, &column.name)))) ")");
        Ok(())
    }
}
