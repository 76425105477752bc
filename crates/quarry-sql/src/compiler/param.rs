use super::{Formatter, ToSql};

use quarry_core::stmt::Value;

/// A positional argument, rendered as `?`.
pub(super) struct Param(pub(super) Value);

impl ToSql for Param {
    fn to_sql(self, f: &mut Formatter<'_>) {
        f.dst.push('?');
        f.push_arg(self.0);
    }
}

impl Formatter<'_> {
    /// Records an argument, converting temporal values to canonical text
    /// for backends that cannot bind them.
    pub(super) fn push_arg(&mut self, value: Value) {
        let value = match value {
            Value::DateTime(_) if !self.compiler.capability.native_temporal => {
                Value::String(value.to_text().unwrap_or_default())
            }
            value => value,
        };
        self.args.push(value);
    }
}
