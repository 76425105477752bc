#[macro_use]
mod fmt;
use fmt::ToSql;

mod delete;

mod delim;
use delim::{And, Comma};

mod filter;

mod flavor;

mod ident;
use ident::{Equals, Ident};

mod insert;

mod param;
use param::Param;

mod select;
mod update;

use quarry_core::{
    driver::Capability,
    stmt::{Action, Aggregate, Query, Statement, Value},
    Error, Result, Schema,
};

/// Compiles builder state into statement text and positional arguments for
/// one table on one backend.
#[derive(Debug, Clone, Copy)]
pub struct Compiler<'a> {
    /// Schema of the table the statement targets
    schema: &'a Schema,

    /// Dialect rules of the backend
    capability: &'static Capability,
}

struct Formatter<'a> {
    /// Handle to the compiler
    compiler: &'a Compiler<'a>,

    /// Where to write the statement text
    dst: String,

    /// Arguments, in placeholder order
    args: Vec<Value>,
}

impl<'a> Compiler<'a> {
    pub fn schema(&self) -> &'a Schema {
        self.schema
    }

    pub fn capability(&self) -> &'static Capability {
        self.capability
    }

    /// Compiles `query` for `action`.
    ///
    /// `row` holds one value per schema column, in schema order. It is
    /// required by `Insert`, `InsertIgnore`, `Replace` and `Update`, and
    /// ignored otherwise.
    pub fn compile(&self, action: Action, query: &Query, row: Option<&[Value]>) -> Result<Statement> {
        let mut f = Formatter {
            compiler: self,
            dst: String::new(),
            args: vec![],
        };

        match action {
            Action::SelectOne | Action::SelectAll | Action::SelectKeys => {
                self.select(&mut f, action, query)?
            }
            Action::Update => self.update(&mut f, query, self.require_row(action, row)?)?,
            Action::UpdatePartial => self.update_partial(&mut f, query)?,
            Action::Delete => self.delete(&mut f, query)?,
            Action::Truncate => self.truncate(&mut f),
            Action::Insert => self.insert(&mut f, self.require_row(action, row)?, false)?,
            Action::InsertIgnore => self.insert(&mut f, self.require_row(action, row)?, true)?,
            Action::Replace => self.replace(&mut f, self.require_row(action, row)?)?,
        }

        Ok(Statement::new(f.dst, f.args))
    }

    /// Compiles an aggregate over `column` as a single-row select.
    ///
    /// `column` is quoted when it names a mapped column and passed through
    /// otherwise, so expressions such as `gid*2` work. `COUNT` ignores it.
    pub fn aggregate(&self, query: &Query, aggregate: Aggregate, column: Option<&str>) -> Result<Statement> {
        let argument = match (aggregate, column) {
            (Aggregate::Count, _) => "*".to_string(),
            (_, Some(column)) => self.projection_item(column),
            (_, None) => {
                return Err(Error::invalid_statement(format!(
                    "{} requires a column",
                    aggregate.function_name()
                )))
            }
        };

        let mut query = query.clone();
        query.fields = vec![format!("{}({argument})", aggregate.function_name())];
        query.order_by.clear();
        self.compile(Action::SelectOne, &query, None)
    }

    /// Renders a column name the way the dialect quotes it, or returns the
    /// text unchanged if no mapped column has that name.
    pub fn projection_item(&self, name: &str) -> String {
        if self.schema.column(name).is_none() {
            return name.to_string();
        }

        let mut f = Formatter {
            compiler: self,
            dst: String::new(),
            args: vec![],
        };
        fmt!(&mut f, Ident(name));
        f.dst
    }

    fn require_row<'r>(&self, action: Action, row: Option<&'r [Value]>) -> Result<&'r [Value]> {
        let Some(row) = row else {
            return Err(Error::invalid_statement(format!(
                "{action:?} on `{}` requires a record",
                self.schema.table
            )));
        };

        if row.len() != self.schema.columns.len() {
            return Err(Error::invalid_statement(format!(
                "record for `{}` has {} value(s), expected {}",
                self.schema.table,
                row.len(),
                self.schema.columns.len()
            )));
        }

        Ok(row)
    }

    /// Value of `column` in a schema-ordered row.
    fn row_value(&self, row: &[Value], column: &str) -> Value {
        self.schema
            .columns
            .get_index_of(column)
            .and_then(|index| row.get(index))
            .cloned()
            .unwrap_or_default()
    }

    fn table(&self) -> Ident<&'a str> {
        Ident(self.schema.table.as_str())
    }
}
