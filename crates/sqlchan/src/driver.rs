use crate::{Error, Result};

pub use sqlchan_core::driver::{Capability, Connection, Dialect, Driver, StorageTypes};

use url::Url;

/// Picks the built-in driver for a database URL by its scheme.
pub fn from_url(url: &str) -> Result<Box<dyn Driver>> {
    let parsed =
        Url::parse(url).map_err(|e| Error::invalid_config(format!("invalid url `{url}`: {e}")))?;

    match parsed.scheme() {
        "postgresql" | "postgres" => connect_postgresql(url),
        "sqlite" => connect_sqlite(url),
        scheme => Err(Error::invalid_config(format!(
            "unsupported database; scheme={scheme}; url={url}"
        ))),
    }
}

#[cfg(feature = "postgresql")]
fn connect_postgresql(url: &str) -> Result<Box<dyn Driver>> {
    let driver = sqlchan_driver_postgresql::PostgreSQL::from_url(url)?;
    Ok(Box::new(driver))
}

#[cfg(not(feature = "postgresql"))]
fn connect_postgresql(_url: &str) -> Result<Box<dyn Driver>> {
    Err(Error::invalid_config("`postgresql` feature not enabled"))
}

#[cfg(feature = "sqlite")]
fn connect_sqlite(url: &str) -> Result<Box<dyn Driver>> {
    let driver = sqlchan_driver_sqlite::Sqlite::new(url)?;
    Ok(Box::new(driver))
}

#[cfg(not(feature = "sqlite"))]
fn connect_sqlite(_url: &str) -> Result<Box<dyn Driver>> {
    Err(Error::invalid_config("`sqlite` feature not enabled"))
}
