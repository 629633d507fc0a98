//! The thread owning a SQLite connection.
//!
//! A read keeps its statement stepped only as far as rows are fetched. The
//! statement borrows the connection, so both live on this thread and the
//! [`Connection`](crate::Connection) handle talks to it over channels.

use crate::{error, Value};

use rusqlite::Connection as RusqliteConnection;
use sqlchan_core::{stmt, Error, Result};
use std::sync::mpsc::{Receiver, Sender};

type Reply<T> = Sender<Result<T>>;

pub(crate) enum Command {
    Execute {
        sql: String,
        params: Vec<stmt::Value>,
        reply: Reply<u64>,
    },
    Query {
        sql: String,
        params: Vec<stmt::Value>,
        ret: Vec<stmt::Type>,
        reply: Reply<()>,
    },
    Fetch {
        reply: Reply<Option<Vec<stmt::Value>>>,
    },
    CloseQuery {
        reply: Reply<()>,
    },
    TableExists {
        name: String,
        reply: Reply<bool>,
    },
}

/// Serves commands until every handle is dropped.
pub(crate) fn run(connection: RusqliteConnection, commands: Receiver<Command>) {
    while let Ok(command) = commands.recv() {
        match command {
            Command::Query {
                sql,
                params,
                ret,
                reply,
            } => {
                if !read(&connection, &sql, &params, &ret, reply, &commands) {
                    break;
                }
            }
            Command::Fetch { reply } => {
                let _ = reply.send(Ok(None));
            }
            Command::CloseQuery { reply } => {
                let _ = reply.send(Ok(()));
            }
            command => serve(&connection, command),
        }
    }

    connection.flush_prepared_statement_cache();
    log::debug!("SQLite connection closed");
}

/// Commands that do not touch an open read.
fn serve(connection: &RusqliteConnection, command: Command) {
    match command {
        Command::Execute { sql, params, reply } => {
            let _ = reply.send(execute(connection, &sql, &params));
        }
        Command::TableExists { name, reply } => {
            let _ = reply.send(table_exists(connection, &name));
        }
        Command::Query { reply, .. } => {
            let _ = reply.send(Err(Error::query_in_progress()));
        }
        Command::Fetch { reply } => {
            let _ = reply.send(Ok(None));
        }
        Command::CloseQuery { reply } => {
            let _ = reply.send(Ok(()));
        }
    }
}

/// Runs a read to completion or release. Returns `false` once the handle is
/// gone.
fn read(
    connection: &RusqliteConnection,
    sql: &str,
    params: &[stmt::Value],
    ret: &[stmt::Type],
    reply: Reply<()>,
    commands: &Receiver<Command>,
) -> bool {
    let mut stmt = match connection.prepare_cached(sql) {
        Ok(stmt) => stmt,
        Err(err) => {
            let _ = reply.send(Err(error(err)));
            return true;
        }
    };

    let width = stmt.column_count();
    if width < ret.len() {
        let _ = reply.send(Err(Error::marshal(format!(
            "statement returns {width} columns, {} expected",
            ret.len()
        ))));
        return true;
    }

    let params = params.iter().cloned().map(Value::from).collect::<Vec<_>>();
    let mut rows = match stmt.query(rusqlite::params_from_iter(params.iter())) {
        Ok(rows) => rows,
        Err(err) => {
            let _ = reply.send(Err(error(err)));
            return true;
        }
    };

    let _ = reply.send(Ok(()));

    while let Ok(command) = commands.recv() {
        match command {
            Command::Fetch { reply } => {
                let row = match rows.next() {
                    Ok(Some(row)) => ret
                        .iter()
                        .enumerate()
                        .map(|(index, ty)| Value::from_sql(row, index, ty).map(Value::into_inner))
                        .collect::<Result<Vec<_>>>()
                        .map(Some),
                    Ok(None) => Ok(None),
                    Err(err) => Err(error(err)),
                };

                let done = !matches!(row, Ok(Some(_)));
                let _ = reply.send(row);

                if done {
                    return true;
                }
            }
            Command::CloseQuery { reply } => {
                let _ = reply.send(Ok(()));
                return true;
            }
            command => serve(connection, command),
        }
    }

    false
}

fn execute(connection: &RusqliteConnection, sql: &str, params: &[stmt::Value]) -> Result<u64> {
    let mut stmt = connection.prepare_cached(sql).map_err(error)?;

    let params = params.iter().cloned().map(Value::from).collect::<Vec<_>>();
    let count = stmt
        .execute(rusqlite::params_from_iter(params.iter()))
        .map_err(error)?;

    Ok(count as u64)
}

fn table_exists(connection: &RusqliteConnection, name: &str) -> Result<bool> {
    let mut stmt = connection
        .prepare_cached("SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1")
        .map_err(error)?;

    stmt.exists([name]).map_err(error)
}
