mod capability;
pub use capability::{Capability, Dialect, StorageTypes};

use crate::{stmt, Result};

use std::fmt::Debug;

/// A database backend: knows its capabilities and how to open connections.
pub trait Driver: Debug + Send + Sync + 'static {
    /// Describes the backend's storage types and SQL dialect.
    fn capability(&self) -> &'static Capability;

    /// Opens a new connection.
    fn connect(&self) -> Result<Box<dyn Connection>>;
}

/// A single open connection.
///
/// Statements are plain SQL text in the backend's dialect with positional
/// placeholders. Drivers are free to cache prepared statements keyed by the
/// SQL text.
///
/// A connection has at most one open read. Rows are pulled from it one at a
/// time with [`fetch`](Connection::fetch), so the backend cursor is only
/// advanced as far as the caller consumes. Other statements may run while a
/// read is open.
pub trait Connection: Debug + Send + 'static {
    fn capability(&self) -> &'static Capability;

    /// Executes a statement that returns no rows, returning the number of
    /// rows affected.
    fn execute(&mut self, sql: &str, params: &[stmt::Value]) -> Result<u64>;

    /// Opens a read over the rows of a statement. Each row will be decoded
    /// into `ret`, one type per column.
    fn query(&mut self, sql: &str, params: &[stmt::Value], ret: &[stmt::Type]) -> Result<()>;

    /// Returns the next row of the open read. Once the rows are exhausted
    /// the read is released and `None` is returned, as it is when no read
    /// is open.
    fn fetch(&mut self) -> Result<Option<Vec<stmt::Value>>>;

    /// Releases the open read and its remaining rows. A no-op without one.
    fn close_query(&mut self) -> Result<()>;

    /// Returns `true` if a table with this name exists.
    fn table_exists(&mut self, name: &str) -> Result<bool>;

    /// Releases the connection, including any open read. Called once;
    /// further use is a caller bug.
    fn close(&mut self) -> Result<()> {
        self.close_query()
    }
}
