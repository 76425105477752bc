mod capability;
pub use capability::{Capability, Dialect};

mod response;
pub use response::{ExecResponse, Rows};

use crate::{async_trait, schema::TableMetadata, stmt::Statement, Result};

use std::fmt::Debug;

/// A live handle to one backend.
///
/// Methods take `&self` so that many queries can share the handle; drivers
/// serialize access internally where the client requires it.
#[async_trait]
pub trait Connection: Debug + Send + Sync + 'static {
    /// Describes the backend's dialect, which informs the compiler.
    fn capability(&self) -> &'static Capability;

    /// Reads the metadata the schema registry needs for `table`.
    ///
    /// Fails with an invalid schema error when the table does not exist.
    async fn describe_table(&self, table: &str) -> Result<TableMetadata>;

    /// Executes a write.
    async fn exec(&self, stmt: &Statement) -> Result<ExecResponse>;

    /// Executes a read.
    async fn query(&self, stmt: &Statement) -> Result<Rows>;
}
