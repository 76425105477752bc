use super::{filter::FilterKind, Compiler, Formatter, ToSql};

use quarry_core::{driver::Dialect, stmt::Query, Result};

impl Compiler<'_> {
    /// Filtered delete. Without a filter this is a truncate.
    pub(super) fn delete(&self, f: &mut Formatter<'_>, query: &Query) -> Result<()> {
        if !query.has_filter() {
            self.truncate(f);
            return Ok(());
        }

        self.check_key_addressed(query)?;
        self.check_unlimited(query)?;

        fmt!(f, "DELETE FROM " self.table());
        let kind = self.filter(f, query)?;

        if kind == FilterKind::PrimaryKey && self.capability.delete_limit {
            f.dst.push_str(" LIMIT 1");
        }

        Ok(())
    }

    pub(super) fn truncate(&self, f: &mut Formatter<'_>) {
        let verb = match self.capability.dialect {
            Dialect::Sqlite => "DELETE FROM ",
            Dialect::Mysql => "TRUNCATE TABLE ",
            Dialect::Cql => "TRUNCATE ",
        };
        fmt!(f, verb self.table());
    }
}
