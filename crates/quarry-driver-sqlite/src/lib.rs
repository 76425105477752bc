mod value;
pub(crate) use value::Value;

use parking_lot::Mutex;
use quarry_core::{
    async_trait,
    driver::{Capability, ExecResponse, Rows},
    schema::TableMetadata,
    stmt::Statement,
    Error, Result,
};
use rusqlite::{params_from_iter, Connection as RusqliteConnection, OptionalExtension};
use std::path::{Path, PathBuf};
use url::Url;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Sqlite {
    File(PathBuf),
    InMemory,
}

impl Sqlite {
    /// Parses a `sqlite::memory:` or `sqlite:<path>` URL.
    pub fn new(url: impl Into<String>) -> Result<Self> {
        let url_str = url.into();
        let url = Url::parse(&url_str).map_err(|err| {
            Error::invalid_connection_url(format!("{err}; url={url_str}"))
        })?;

        if url.scheme() != "sqlite" {
            return Err(Error::invalid_connection_url(format!(
                "connection URL does not have a `sqlite` scheme; url={url_str}"
            )));
        }

        match url.path() {
            ":memory:" => Ok(Self::InMemory),
            "" => Err(Error::invalid_connection_url(format!(
                "connection URL has no database path; url={url_str}"
            ))),
            path => Ok(Self::File(PathBuf::from(path))),
        }
    }

    /// Create an in-memory SQLite database
    pub fn in_memory() -> Self {
        Self::InMemory
    }

    /// Open a SQLite database at the specified file path
    pub fn open<P: AsRef<Path>>(path: P) -> Self {
        Self::File(path.as_ref().to_path_buf())
    }

    pub fn connect(&self) -> Result<Connection> {
        match self {
            Sqlite::File(path) => Connection::open(path),
            Sqlite::InMemory => Connection::in_memory(),
        }
    }
}

/// A single SQLite connection. Statements are serialized through a mutex.
#[derive(Debug)]
pub struct Connection {
    connection: Mutex<RusqliteConnection>,
}

impl Connection {
    pub fn in_memory() -> Result<Self> {
        let connection =
            RusqliteConnection::open_in_memory().map_err(Error::driver_operation_failed)?;
        Ok(Self::from_connection(connection))
    }

    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let connection = RusqliteConnection::open(path).map_err(Error::driver_operation_failed)?;
        Ok(Self::from_connection(connection))
    }

    pub fn from_connection(connection: RusqliteConnection) -> Self {
        Self {
            connection: Mutex::new(connection),
        }
    }
}

#[async_trait]
impl quarry_core::driver::Connection for Connection {
    fn capability(&self) -> &'static Capability {
        &Capability::SQLITE
    }

    async fn describe_table(&self, table: &str) -> Result<TableMetadata> {
        let connection = self.connection.lock();
        let sql: Option<String> = connection
            .query_row(
                "SELECT sql FROM sqlite_master WHERE type = 'table' AND name = ?1 COLLATE NOCASE",
                [table],
                |row| row.get(0),
            )
            .optional()
            .map_err(Error::driver_operation_failed)?;

        match sql {
            Some(sql) => Ok(TableMetadata::CreateStatement(sql)),
            None => Err(Error::invalid_schema(format!(
                "table `{table}` does not exist"
            ))),
        }
    }

    async fn exec(&self, stmt: &Statement) -> Result<ExecResponse> {
        let connection = self.connection.lock();
        let mut prepared = connection
            .prepare_cached(&stmt.text)
            .map_err(Error::driver_operation_failed)?;

        let count = prepared
            .execute(params_from_iter(stmt.args.iter().map(Value::from)))
            .map_err(Error::driver_operation_failed)?;

        let last_insert_id = (count > 0 && is_insert(&stmt.text))
            .then(|| connection.last_insert_rowid());

        Ok(ExecResponse {
            rows_affected: Some(count as u64),
            last_insert_id,
        })
    }

    async fn query(&self, stmt: &Statement) -> Result<Rows> {
        let connection = self.connection.lock();
        let mut prepared = connection
            .prepare_cached(&stmt.text)
            .map_err(Error::driver_operation_failed)?;

        let columns = prepared
            .column_names()
            .into_iter()
            .map(str::to_string)
            .collect::<Vec<_>>();
        let width = columns.len();

        let mut rows = prepared
            .query(params_from_iter(stmt.args.iter().map(Value::from)))
            .map_err(Error::driver_operation_failed)?;

        let mut values = vec![];
        while let Some(row) = rows.next().map_err(Error::driver_operation_failed)? {
            let mut record = Vec::with_capacity(width);
            for index in 0..width {
                let value = row.get_ref(index).map_err(Error::driver_operation_failed)?;
                record.push(Value::from_sql(value));
            }
            values.push(record);
        }

        Ok(Rows::new(columns, values))
    }
}

fn is_insert(text: &str) -> bool {
    let verb = text.trim_start().split_whitespace().next().unwrap_or_default();
    verb.eq_ignore_ascii_case("INSERT") || verb.eq_ignore_ascii_case("REPLACE")
}
