extern crate self as quarry;

pub mod cache;
pub use cache::TableCache;

pub mod db;
pub use db::Db;

mod field;
pub use field::Field;

mod materialize;

pub mod query;
pub use query::{IntoValues, Query};

mod record;
pub use record::Record;

pub use quarry_core::{
    driver::{Capability, Connection, Dialect, ExecResponse, Rows},
    schema::Schema,
    stmt::{Direction, Statement, Value},
    Error, Result,
};

pub use quarry_macros::{Embed, Record};

pub use quarry_core::async_trait;

#[doc(hidden)]
pub mod codegen_support {
    pub use crate::{field::invalid_field_path, Field, Record, Result};
    pub use quarry_core::{
        schema::{FieldShape, Shape, StructShape},
        stmt::Value,
    };
}
