use crate::Result;

use quarry_core::{driver::Connection, Error};

use std::sync::Arc;
use url::Url;

/// Opens the driver selected by the URL scheme.
pub(super) async fn connect(url: &str) -> Result<Arc<dyn Connection>> {
    let parsed = Url::parse(url)
        .map_err(|err| Error::invalid_connection_url(format!("{err}; url={url}")))?;

    match parsed.scheme() {
        "sqlite" => connect_sqlite(url),
        "mysql" => connect_mysql(url),
        "cql" => connect_cql(url).await,
        scheme => Err(Error::invalid_connection_url(format!(
            "unsupported database; scheme={scheme}; url={url}"
        ))),
    }
}

#[cfg(feature = "sqlite")]
fn connect_sqlite(url: &str) -> Result<Arc<dyn Connection>> {
    let driver = quarry_driver_sqlite::Sqlite::new(url)?;
    Ok(Arc::new(driver.connect()?))
}

#[cfg(not(feature = "sqlite"))]
fn connect_sqlite(_url: &str) -> Result<Arc<dyn Connection>> {
    Err(Error::invalid_connection_url("`sqlite` feature not enabled"))
}

#[cfg(feature = "mysql")]
fn connect_mysql(url: &str) -> Result<Arc<dyn Connection>> {
    Ok(Arc::new(quarry_driver_mysql::MySQL::new(url)?))
}

#[cfg(not(feature = "mysql"))]
fn connect_mysql(_url: &str) -> Result<Arc<dyn Connection>> {
    Err(Error::invalid_connection_url("`mysql` feature not enabled"))
}

#[cfg(feature = "cql")]
async fn connect_cql(url: &str) -> Result<Arc<dyn Connection>> {
    Ok(Arc::new(quarry_driver_cql::Cql::connect(url).await?))
}

#[cfg(not(feature = "cql"))]
async fn connect_cql(_url: &str) -> Result<Arc<dyn Connection>> {
    Err(Error::invalid_connection_url("`cql` feature not enabled"))
}
