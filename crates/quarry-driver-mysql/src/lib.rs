mod value;
pub(crate) use value::Value;

use mysql_async::{
    prelude::{Queryable, ToValue},
    Params, Pool,
};
use quarry_core::{
    async_trait,
    driver::{Capability, ExecResponse, Rows},
    schema::TableMetadata,
    stmt::Statement,
    Error, Result,
};
use url::Url;

/// Server error code for a table that does not exist.
const ER_NO_SUCH_TABLE: u16 = 1146;

/// A MySQL connection pool. Each statement checks out a connection.
#[derive(Debug, Clone)]
pub struct MySQL {
    pool: Pool,
}

impl MySQL {
    pub fn new(url: impl Into<String>) -> Result<Self> {
        let url_str = url.into();
        let url = Url::parse(&url_str)
            .map_err(|err| Error::invalid_connection_url(format!("{err}; url={url_str}")))?;

        if url.scheme() != "mysql" {
            return Err(Error::invalid_connection_url(format!(
                "connection URL does not have a `mysql` scheme; url={url_str}"
            )));
        }

        if url.host_str().is_none() {
            return Err(Error::invalid_connection_url(format!(
                "missing host in connection URL; url={url_str}"
            )));
        }

        if url.path().trim_start_matches('/').is_empty() {
            return Err(Error::invalid_connection_url(format!(
                "no database specified - missing path in connection URL; url={url_str}"
            )));
        }

        let opts = mysql_async::Opts::from_url(url.as_str())
            .map_err(|err| Error::invalid_connection_url(format!("{err}; url={url_str}")))?;
        let opts = mysql_async::OptsBuilder::from_opts(opts).client_found_rows(true);

        Ok(Self {
            pool: Pool::new(opts),
        })
    }

    /// Closes every pooled connection.
    pub async fn disconnect(self) -> Result<()> {
        self.pool
            .disconnect()
            .await
            .map_err(Error::driver_operation_failed)
    }
}

impl From<Pool> for MySQL {
    fn from(pool: Pool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl quarry_core::driver::Connection for MySQL {
    fn capability(&self) -> &'static Capability {
        &Capability::MYSQL
    }

    async fn describe_table(&self, table: &str) -> Result<TableMetadata> {
        let mut conn = self.conn().await?;
        let sql = format!("SHOW CREATE TABLE `{}`", table.replace('`', "``"));

        match conn.query_first::<(String, String), _>(sql).await {
            Ok(Some((_, create))) => Ok(TableMetadata::CreateStatement(create)),
            Ok(None) => Err(Error::invalid_schema(format!(
                "table `{table}` does not exist"
            ))),
            Err(mysql_async::Error::Server(err)) if err.code == ER_NO_SUCH_TABLE => Err(
                Error::invalid_schema(format!("table `{table}` does not exist")),
            ),
            Err(err) => Err(Error::driver_operation_failed(err)),
        }
    }

    async fn exec(&self, stmt: &Statement) -> Result<ExecResponse> {
        let mut conn = self.conn().await?;

        // text and binary protocol results are distinct types
        let (rows_affected, last_insert_id) = if stmt.args.is_empty() {
            let result = conn
                .query_iter(stmt.text.as_str())
                .await
                .map_err(Error::driver_operation_failed)?;
            let summary = (result.affected_rows(), result.last_insert_id());
            result.drop_result().await.map_err(Error::driver_operation_failed)?;
            summary
        } else {
            let result = conn
                .exec_iter(stmt.text.as_str(), params(stmt))
                .await
                .map_err(Error::driver_operation_failed)?;
            let summary = (result.affected_rows(), result.last_insert_id());
            result.drop_result().await.map_err(Error::driver_operation_failed)?;
            summary
        };

        let last_insert_id = last_insert_id
            .filter(|id| *id != 0)
            .and_then(|id| i64::try_from(id).ok());

        Ok(ExecResponse {
            rows_affected: Some(rows_affected),
            last_insert_id,
        })
    }

    async fn query(&self, stmt: &Statement) -> Result<Rows> {
        let mut conn = self.conn().await?;

        let rows: Vec<mysql_async::Row> = if stmt.args.is_empty() {
            conn.query(stmt.text.as_str()).await
        } else {
            conn.exec(stmt.text.as_str(), params(stmt)).await
        }
        .map_err(Error::driver_operation_failed)?;

        let Some(first) = rows.first() else {
            return Ok(Rows::default());
        };

        let columns = first
            .columns_ref()
            .iter()
            .map(|column| column.name_str().into_owned())
            .collect::<Vec<_>>();

        let values = rows
            .into_iter()
            .map(|mut row| {
                (0..row.len())
                    .map(|index| Value::from_sql(row.take(index).unwrap_or(mysql_async::Value::NULL)))
                    .collect()
            })
            .collect();

        Ok(Rows::new(columns, values))
    }
}

impl MySQL {
    async fn conn(&self) -> Result<mysql_async::Conn> {
        self.pool
            .get_conn()
            .await
            .map_err(Error::driver_operation_failed)
    }
}

fn params(stmt: &Statement) -> Params {
    Params::Positional(
        stmt.args
            .iter()
            .map(|arg| Value::from(arg).to_value())
            .collect(),
    )
}
