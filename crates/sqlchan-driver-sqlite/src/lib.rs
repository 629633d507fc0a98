mod value;
pub(crate) use value::Value;

mod worker;
use worker::Command;

use rusqlite::{Connection as RusqliteConnection, ErrorCode};
use sqlchan_core::{
    driver::{Capability, Driver},
    stmt, Error, Result,
};
use std::{
    path::{Path, PathBuf},
    sync::mpsc::{self, SyncSender},
    thread::{self, JoinHandle},
};
use url::Url;

#[derive(Debug)]
pub enum Sqlite {
    File(PathBuf),
    InMemory,
}

impl Sqlite {
    /// Create a new SQLite driver with an arbitrary connection URL
    pub fn new(url: impl Into<String>) -> Result<Self> {
        let url_str = url.into();
        let url = Url::parse(&url_str)
            .map_err(|e| Error::invalid_config(format!("invalid url `{url_str}`: {e}")))?;

        if url.scheme() != "sqlite" {
            return Err(Error::invalid_config(format!(
                "connection URL does not have a `sqlite` scheme; url={url_str}"
            )));
        }

        if url.path() == ":memory:" {
            Ok(Self::InMemory)
        } else {
            Ok(Self::File(PathBuf::from(url.path())))
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
}

impl Driver for Sqlite {
    fn capability(&self) -> &'static Capability {
        &Capability::SQLITE
    }

    fn connect(&self) -> Result<Box<dyn sqlchan_core::driver::Connection>> {
        let connection = match self {
            Sqlite::File(path) => Connection::open(path)?,
            Sqlite::InMemory => Connection::in_memory()?,
        };
        Ok(Box::new(connection))
    }
}

/// Handle to a SQLite connection served by its own thread.
#[derive(Debug)]
pub struct Connection {
    commands: Option<SyncSender<Command>>,
    worker: Option<JoinHandle<()>>,
}

impl Connection {
    pub fn in_memory() -> Result<Self> {
        let connection = RusqliteConnection::open_in_memory().map_err(Error::connection)?;
        Self::spawn(connection)
    }

    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        log::info!("opening SQLite database {}", path.display());

        let connection = RusqliteConnection::open(path).map_err(Error::connection)?;
        Self::spawn(connection)
    }

    fn spawn(connection: RusqliteConnection) -> Result<Self> {
        let (commands, receiver) = mpsc::sync_channel(0);

        let worker = thread::Builder::new()
            .name("sqlchan-sqlite".to_string())
            .spawn(move || worker::run(connection, receiver))
            .map_err(Error::connection)?;

        Ok(Self {
            commands: Some(commands),
            worker: Some(worker),
        })
    }

    /// Sends a command and waits for its reply.
    fn request<T>(&self, command: impl FnOnce(mpsc::Sender<Result<T>>) -> Command) -> Result<T> {
        let stopped = || Error::connection("SQLite connection thread has stopped");

        let (reply, response) = mpsc::channel();
        self.commands
            .as_ref()
            .ok_or_else(stopped)?
            .send(command(reply))
            .map_err(|_| stopped())?;

        response.recv().map_err(|_| stopped())?
    }
}

impl sqlchan_core::driver::Connection for Connection {
    fn capability(&self) -> &'static Capability {
        &Capability::SQLITE
    }

    fn execute(&mut self, sql: &str, params: &[stmt::Value]) -> Result<u64> {
        self.request(|reply| Command::Execute {
            sql: sql.to_string(),
            params: params.to_vec(),
            reply,
        })
    }

    fn query(&mut self, sql: &str, params: &[stmt::Value], ret: &[stmt::Type]) -> Result<()> {
        self.request(|reply| Command::Query {
            sql: sql.to_string(),
            params: params.to_vec(),
            ret: ret.to_vec(),
            reply,
        })
    }

    fn fetch(&mut self) -> Result<Option<Vec<stmt::Value>>> {
        self.request(|reply| Command::Fetch { reply })
    }

    fn close_query(&mut self) -> Result<()> {
        self.request(|reply| Command::CloseQuery { reply })
    }

    fn table_exists(&mut self, name: &str) -> Result<bool> {
        self.request(|reply| Command::TableExists {
            name: name.to_string(),
            reply,
        })
    }

    fn close(&mut self) -> Result<()> {
        // Dropping the sender ends the thread, releasing any open read.
        self.commands = None;

        match self.worker.take() {
            Some(worker) => worker
                .join()
                .map_err(|_| Error::connection("SQLite connection thread panicked")),
            None => Ok(()),
        }
    }
}

/// Classifies a SQLite error: failures of the database file itself are
/// connection errors, everything else fails only the statement.
pub(crate) fn error(err: rusqlite::Error) -> Error {
    match err {
        rusqlite::Error::ToSqlConversionFailure(err) => Error::marshal(err.to_string()),
        err => match err.sqlite_error_code() {
            Some(
                ErrorCode::CannotOpen
                | ErrorCode::NotADatabase
                | ErrorCode::DatabaseCorrupt
                | ErrorCode::SystemIoFailure,
            ) => Error::connection(err),
            _ => Error::execution(err),
        },
    }
}
