use super::{filter::FilterKind, Comma, Compiler, Formatter, Ident, ToSql};

use quarry_core::{
    stmt::{Action, Limit, OrderBy, Query},
    Result,
};

impl ToSql for &OrderBy {
    fn to_sql(self, f: &mut Formatter<'_>) {
        fmt!(f, Ident(&self.column) " " self.direction.as_str());
    }
}

impl Compiler<'_> {
    pub(super) fn select(&self, f: &mut Formatter<'_>, action: Action, query: &Query) -> Result<()> {
        f.dst.push_str("SELECT ");

        match action {
            Action::SelectKeys => {
                self.schema.require_primary_key()?;
                fmt!(f, Comma(self.schema.primary_key.iter().map(Ident)));
            }
            _ if query.fields.is_empty() => f.dst.push('*'),
            _ => f.dst.push_str(&query.fields.join(", ")),
        }

        fmt!(f, " FROM " self.table());

        let kind = self.filter(f, query)?;

        if !query.order_by.is_empty() {
            fmt!(f, " ORDER BY " Comma(&query.order_by));
        }

        match action {
            Action::SelectOne => self.limit(f, Limit::one()),
            _ => {
                if let Some(limit) = query.limit {
                    self.limit(f, limit);
                }
            }
        }

        if kind == FilterKind::Other && self.capability.allow_filtering {
            f.dst.push_str(" ALLOW FILTERING");
        }

        Ok(())
    }

    /// Writes the row cap in the dialect's syntax.
    pub(super) fn limit(&self, f: &mut Formatter<'_>, limit: Limit) {
        let Limit { offset, count } = limit;

        match offset {
            Some(offset) if self.capability.limit_offset_pair => {
                f.dst.push_str(&format!(" LIMIT {offset},{count}"));
            }
            Some(offset) if offset != 0 && self.capability.limit_offset_keyword => {
                f.dst.push_str(&format!(" LIMIT {count} OFFSET {offset}"));
            }
            Some(offset) if offset != 0 => {
                tracing::warn!(
                    table = %self.schema.table,
                    offset,
                    "backend cannot skip rows; offset dropped from LIMIT"
                );
                f.dst.push_str(&format!(" LIMIT {count}"));
            }
            _ => f.dst.push_str(&format!(" LIMIT {count}")),
        }
    }
}
