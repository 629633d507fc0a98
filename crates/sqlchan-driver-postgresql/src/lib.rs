mod statement_cache;
use statement_cache::StatementCache;

mod value;
pub(crate) use value::Value;

use postgres::{types::ToSql, Client, Config, NoTls};
use sqlchan_core::{
    driver::{Capability, Driver},
    stmt, Error, Result,
};
use std::error::Error as _;
use url::Url;

#[derive(Debug)]
pub struct PostgreSQL {
    config: Config,
}

impl PostgreSQL {
    /// Create a driver from an already built [`postgres::Config`].
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Create a driver from a connection string.
    ///
    /// Connections are opened lazily by [`Driver::connect`].
    pub fn from_url(url: &str) -> Result<Self> {
        let url = Url::parse(url)
            .map_err(|e| Error::invalid_config(format!("invalid url `{url}`: {e}")))?;

        if !matches!(url.scheme(), "postgresql" | "postgres") {
            return Err(Error::invalid_config(format!(
                "connection URL does not have a `postgresql` scheme; url={url}"
            )));
        }

        let host = url.host_str().ok_or_else(|| {
            Error::invalid_config(format!("missing host in connection URL; url={url}"))
        })?;

        let dbname = url.path().trim_start_matches('/');
        if dbname.is_empty() {
            return Err(Error::invalid_config(format!(
                "no database specified - missing path in connection URL; url={url}"
            )));
        }

        let mut config = Config::new();
        config.host(host);
        config.dbname(dbname);

        if let Some(port) = url.port() {
            config.port(port);
        }

        if !url.username().is_empty() {
            config.user(url.username());
        }

        if let Some(password) = url.password() {
            config.password(password);
        }

        Ok(Self::new(config))
    }
}

impl From<Config> for PostgreSQL {
    fn from(config: Config) -> Self {
        Self { config }
    }
}

impl Driver for PostgreSQL {
    fn capability(&self) -> &'static Capability {
        &Capability::POSTGRESQL
    }

    fn connect(&self) -> Result<Box<dyn sqlchan_core::driver::Connection>> {
        log::info!(
            "connecting to PostgreSQL database {:?} on {:?}",
            self.config.get_dbname(),
            self.config.get_hosts()
        );

        let client = self.config.connect(NoTls).map_err(Error::connection)?;
        Ok(Box::new(Connection::new(client)))
    }
}

/// Name of the server-side cursor backing the open read.
const CURSOR: &str = "sqlchan_read";

/// Statements run while a read is open are isolated by this savepoint, so a
/// failing one does not abort the read's transaction.
const SAVEPOINT: &str = "sqlchan_statement";

pub struct Connection {
    client: Client,
    statements: StatementCache,

    /// Column types of the open read
    read: Option<Vec<stmt::Type>>,
}

impl Connection {
    /// Wraps an already connected client.
    pub fn new(client: Client) -> Self {
        Self {
            client,
            statements: StatementCache::new(),
            read: None,
        }
    }

    fn prepare(&mut self, sql: &str) -> Result<postgres::Statement> {
        self.statements
            .prepare(&mut self.client, sql)
            .map_err(error)
    }

    fn execute_prepared(&mut self, sql: &str, params: &[stmt::Value]) -> Result<u64> {
        let statement = self.prepare(sql)?;

        let params = params.iter().cloned().map(Value::from).collect::<Vec<_>>();
        let args = params
            .iter()
            .map(|param| param as &(dyn ToSql + Sync))
            .collect::<Vec<_>>();

        self.client.execute(&statement, &args).map_err(error)
    }

    /// Ends the read's transaction. `COMMIT` rolls back a transaction that
    /// already failed.
    fn end_read(&mut self) -> Result<()> {
        if self.read.take().is_some() {
            self.client.batch_execute("COMMIT").map_err(error)?;
        }
        Ok(())
    }
}

impl std::fmt::Debug for Connection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Connection")
            .field("closed", &self.client.is_closed())
            .field("statements", &self.statements.len())
            .field("reading", &self.read.is_some())
            .finish()
    }
}

impl sqlchan_core::driver::Connection for Connection {
    fn capability(&self) -> &'static Capability {
        &Capability::POSTGRESQL
    }

    fn execute(&mut self, sql: &str, params: &[stmt::Value]) -> Result<u64> {
        if self.read.is_none() {
            return self.execute_prepared(sql, params);
        }

        self.client
            .batch_execute(&format!("SAVEPOINT {SAVEPOINT}"))
            .map_err(error)?;

        match self.execute_prepared(sql, params) {
            Ok(count) => {
                self.client
                    .batch_execute(&format!("RELEASE SAVEPOINT {SAVEPOINT}"))
                    .map_err(error)?;
                Ok(count)
            }
            Err(err) => {
                self.client
                    .batch_execute(&format!("ROLLBACK TO SAVEPOINT {SAVEPOINT}"))
                    .map_err(error)?;
                Err(err)
            }
        }
    }

    fn query(&mut self, sql: &str, params: &[stmt::Value], ret: &[stmt::Type]) -> Result<()> {
        if self.read.is_some() {
            return Err(Error::query_in_progress());
        }

        let width = self.prepare(sql)?.columns().len();
        if width < ret.len() {
            return Err(Error::marshal(format!(
                "statement returns {width} columns, {} expected",
                ret.len()
            )));
        }

        // The cursor lives until the end of this transaction.
        self.client.batch_execute("BEGIN").map_err(error)?;
        self.read = Some(ret.to_vec());

        let declare = format!("DECLARE {CURSOR} NO SCROLL CURSOR FOR {sql}");
        if let Err(err) = self.execute_prepared(&declare, params) {
            if let Err(end) = self.end_read() {
                log::warn!("failed to end read: {end}");
            }
            return Err(err);
        }

        log::debug!("opened cursor for {sql}");
        Ok(())
    }

    fn fetch(&mut self) -> Result<Option<Vec<stmt::Value>>> {
        let Some(ret) = self.read.clone() else {
            return Ok(None);
        };

        // Not cached: the row description depends on the cursor open at
        // prepare time.
        let mut rows = self
            .client
            .query(format!("FETCH FORWARD 1 FROM {CURSOR}").as_str(), &[])
            .map_err(error)?;

        let Some(row) = rows.pop() else {
            self.end_read()?;
            return Ok(None);
        };

        row.columns()
            .iter()
            .zip(&ret)
            .enumerate()
            .map(|(index, (column, ty))| Ok(Value::from_sql(&row, index, column, ty)?.into_inner()))
            .collect::<Result<Vec<_>>>()
            .map(Some)
    }

    fn close_query(&mut self) -> Result<()> {
        self.end_read()
    }

    fn table_exists(&mut self, name: &str) -> Result<bool> {
        let statement = self.prepare(
            "SELECT 1 FROM pg_catalog.pg_tables WHERE schemaname = current_schema() AND tablename = $1",
        )?;

        let rows = self.client.query(&statement, &[&name]).map_err(error)?;
        Ok(!rows.is_empty())
    }

    fn close(&mut self) -> Result<()> {
        let result = self.end_read();
        self.statements.clear();
        result
    }
}

/// Classifies a client error. Errors reported by the server fail only the
/// statement; a closed socket or an I/O failure loses the connection.
pub(crate) fn error(err: postgres::Error) -> Error {
    let io = err
        .source()
        .is_some_and(|source| source.is::<std::io::Error>());

    if err.is_closed() || (err.as_db_error().is_none() && io) {
        Error::connection(err)
    } else {
        Error::execution(err)
    }
}
