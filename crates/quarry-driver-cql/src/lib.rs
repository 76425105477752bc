mod value;

use quarry_core::{
    async_trait,
    driver::{Capability, ExecResponse, Rows},
    schema::TableMetadata,
    stmt::{Statement, Value},
    Error, Result,
};
use scylla::{
    client::{session::Session, session_builder::SessionBuilder},
    response::query_result::QueryResult,
    statement::prepared::PreparedStatement,
    value::{CqlValue, Row},
};
use url::Url;

/// Default native protocol port.
const DEFAULT_PORT: u16 = 9042;

/// Column the cluster adds to lightweight-transaction results.
const APPLIED_COLUMN: &str = "[applied]";

/// Cluster contact points and keyspace parsed from a `cql://` URL.
///
/// `cql://host:port/keyspace?node=host2:port` lists `host:port` and every
/// `node` parameter as known nodes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CqlConfig {
    pub nodes: Vec<String>,
    pub keyspace: String,
}

impl CqlConfig {
    pub fn from_url(url: impl Into<String>) -> Result<Self> {
        let url_str = url.into();
        let url = Url::parse(&url_str)
            .map_err(|err| Error::invalid_connection_url(format!("{err}; url={url_str}")))?;

        if url.scheme() != "cql" {
            return Err(Error::invalid_connection_url(format!(
                "connection URL does not have a `cql` scheme; url={url_str}"
            )));
        }

        let host = match url.host_str() {
            Some(host) if !host.is_empty() => host,
            _ => {
                return Err(Error::invalid_connection_url(format!(
                    "missing host in connection URL; url={url_str}"
                )))
            }
        };

        let keyspace = url.path().trim_start_matches('/');
        if keyspace.is_empty() {
            return Err(Error::invalid_connection_url(format!(
                "no keyspace specified - missing path in connection URL; url={url_str}"
            )));
        }

        let mut nodes = vec![format!("{host}:{}", url.port().unwrap_or(DEFAULT_PORT))];
        for (key, node) in url.query_pairs() {
            if key == "node" {
                nodes.push(node.into_owned());
            }
        }

        Ok(Self {
            nodes,
            keyspace: keyspace.to_string(),
        })
    }
}

/// A session against a Cassandra or ScyllaDB cluster, bound to one keyspace.
#[derive(Debug)]
pub struct Cql {
    session: Session,
    keyspace: String,
}

impl Cql {
    pub async fn connect(url: impl Into<String>) -> Result<Self> {
        let config = CqlConfig::from_url(url)?;

        let session = SessionBuilder::new()
            .known_nodes(&config.nodes)
            .use_keyspace(&config.keyspace, false)
            .build()
            .await
            .map_err(Error::driver_operation_failed)?;

        Ok(Self {
            session,
            keyspace: config.keyspace,
        })
    }

    pub fn from_session(session: Session, keyspace: impl Into<String>) -> Self {
        Self {
            session,
            keyspace: keyspace.into(),
        }
    }

    async fn execute(&self, stmt: &Statement) -> Result<QueryResult> {
        let prepared = self
            .session
            .prepare(stmt.text.as_str())
            .await
            .map_err(Error::driver_operation_failed)?;

        let values = bind(&prepared, &stmt.args)?;

        self.session
            .execute_unpaged(&prepared, values)
            .await
            .map_err(Error::driver_operation_failed)
    }
}

#[async_trait]
impl quarry_core::driver::Connection for Cql {
    fn capability(&self) -> &'static Capability {
        &Capability::CQL
    }

    async fn describe_table(&self, table: &str) -> Result<TableMetadata> {
        self.session
            .refresh_metadata()
            .await
            .map_err(Error::driver_operation_failed)?;

        let state = self.session.get_cluster_state();
        let Some(keyspace) = state.get_keyspace(&self.keyspace) else {
            return Err(Error::invalid_schema(format!(
                "keyspace `{}` does not exist",
                self.keyspace
            )));
        };

        // unquoted CQL identifiers are stored lower-cased
        let metadata = keyspace
            .tables
            .get(table)
            .or_else(|| keyspace.tables.get(&table.to_ascii_lowercase()));

        match metadata {
            Some(metadata) => Ok(TableMetadata::PartitionKey(metadata.partition_key.clone())),
            None => Err(Error::invalid_schema(format!(
                "table `{table}` does not exist in keyspace `{}`",
                self.keyspace
            ))),
        }
    }

    async fn exec(&self, stmt: &Statement) -> Result<ExecResponse> {
        let result = self.execute(stmt).await?;

        if !result.is_rows() {
            return Ok(ExecResponse::unknown());
        }

        let rows = into_rows(result)?;
        let Some(index) = rows.column_index(APPLIED_COLUMN) else {
            return Ok(ExecResponse::unknown());
        };

        let applied = rows
            .rows
            .first()
            .and_then(|row| row.get(index))
            .is_some_and(|value| *value == Value::Bool(true));

        Ok(ExecResponse::count(applied as u64))
    }

    async fn query(&self, stmt: &Statement) -> Result<Rows> {
        let result = self.execute(stmt).await?;

        if !result.is_rows() {
            return Ok(Rows::default());
        }

        into_rows(result)
    }
}

fn bind(prepared: &PreparedStatement, args: &[Value]) -> Result<Vec<Option<CqlValue>>> {
    let specs = prepared.get_variable_col_specs();

    if specs.len() != args.len() {
        return Err(Error::invalid_statement(format!(
            "statement has {} placeholder(s), got {} argument(s)",
            specs.len(),
            args.len()
        )));
    }

    specs
        .iter()
        .zip(args)
        .map(|(spec, arg)| value::to_cql(arg, spec.typ()))
        .collect()
}

fn into_rows(result: QueryResult) -> Result<Rows> {
    let rows_result = result
        .into_rows_result()
        .map_err(Error::driver_operation_failed)?;

    let columns = rows_result
        .column_specs()
        .iter()
        .map(|spec| spec.name().to_string())
        .collect::<Vec<_>>();

    let mut values = vec![];
    for row in rows_result
        .rows::<Row>()
        .map_err(Error::driver_operation_failed)?
    {
        let row = row.map_err(Error::driver_operation_failed)?;
        values.push(
            row.columns
                .into_iter()
                .map(value::from_cql)
                .collect::<Result<Vec<_>>>()?,
        );
    }

    Ok(Rows::new(columns, values))
}
