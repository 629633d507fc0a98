use crate::ExecLog;

use sqlchan_core::{
    driver::{Capability, Connection, Driver},
    stmt::{Type, Value},
    Error, Result,
};
use std::{
    collections::{HashSet, VecDeque},
    sync::{Arc, Mutex},
};

/// A driver that executes nothing: it logs every statement and answers
/// queries with canned rows, in order. Rows are handed out one per `fetch`.
#[derive(Debug, Clone)]
pub struct MockDriver {
    capability: &'static Capability,
    state: Arc<Mutex<State>>,
    log: ExecLog,
}

#[derive(Debug, Default)]
struct State {
    tables: HashSet<String>,
    replies: VecDeque<Vec<Vec<Value>>>,
    failures: VecDeque<Error>,

    /// Reads opened and not yet released, across connections
    open_reads: usize,
}

#[derive(Debug)]
struct MockConnection {
    capability: &'static Capability,
    state: Arc<Mutex<State>>,
    log: ExecLog,

    /// Rows of the open read not fetched yet
    read: Option<VecDeque<Vec<Value>>>,
}

impl MockDriver {
    /// A PostgreSQL flavored mock, the only backend with functions and
    /// procedures.
    pub fn new() -> MockDriver {
        MockDriver::with_capability(&Capability::POSTGRESQL)
    }

    pub fn with_capability(capability: &'static Capability) -> MockDriver {
        MockDriver {
            capability,
            state: Arc::default(),
            log: ExecLog::default(),
        }
    }

    pub fn log(&self) -> ExecLog {
        self.log.clone()
    }

    /// Makes `table_exists` report this table.
    pub fn table(&self, name: &str) -> &Self {
        self.state.lock().unwrap().tables.insert(name.to_string());
        self
    }

    /// Rows returned by the next query.
    pub fn reply(&self, rows: Vec<Vec<Value>>) -> &Self {
        self.state.lock().unwrap().replies.push_back(rows);
        self
    }

    /// Error returned by the next statement or fetch.
    pub fn fail(&self, error: Error) -> &Self {
        self.state.lock().unwrap().failures.push_back(error);
        self
    }

    /// Number of reads still holding rows.
    pub fn open_reads(&self) -> usize {
        self.state.lock().unwrap().open_reads
    }
}

impl Default for MockDriver {
    fn default() -> Self {
        MockDriver::new()
    }
}

impl Driver for MockDriver {
    fn capability(&self) -> &'static Capability {
        self.capability
    }

    fn connect(&self) -> Result<Box<dyn Connection>> {
        Ok(Box::new(MockConnection {
            capability: self.capability,
            state: self.state.clone(),
            log: self.log.clone(),
            read: None,
        }))
    }
}

impl MockConnection {
    fn next_failure(&self) -> Result<()> {
        match self.state.lock().unwrap().failures.pop_front() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn release(&mut self) {
        if self.read.take().is_some() {
            self.state.lock().unwrap().open_reads -= 1;
        }
    }
}

impl Connection for MockConnection {
    fn capability(&self) -> &'static Capability {
        self.capability
    }

    fn execute(&mut self, sql: &str, params: &[Value]) -> Result<u64> {
        self.log.push(sql, params);
        self.next_failure()?;

        if let Some(name) = sql
            .strip_prefix("CREATE TABLE ")
            .map(|rest| rest.trim_start_matches("IF NOT EXISTS "))
            .and_then(|rest| rest.split('"').nth(1))
        {
            self.state.lock().unwrap().tables.insert(name.to_string());
        }

        Ok(1)
    }

    fn query(&mut self, sql: &str, params: &[Value], ret: &[Type]) -> Result<()> {
        self.log.push(sql, params);

        if self.read.is_some() {
            return Err(Error::query_in_progress());
        }

        self.next_failure()?;

        let mut state = self.state.lock().unwrap();
        let rows = state.replies.pop_front().unwrap_or_default();

        for row in &rows {
            assert!(
                row.len() >= ret.len(),
                "canned row {row:?} is narrower than {ret:?}"
            );
        }

        state.open_reads += 1;
        self.read = Some(rows.into());
        Ok(())
    }

    fn fetch(&mut self) -> Result<Option<Vec<Value>>> {
        let Some(read) = &mut self.read else {
            return Ok(None);
        };

        let row = read.pop_front();
        self.next_failure()?;

        if row.is_none() {
            self.release();
        }
        Ok(row)
    }

    fn close_query(&mut self) -> Result<()> {
        self.release();
        Ok(())
    }

    fn table_exists(&mut self, name: &str) -> Result<bool> {
        self.next_failure()?;
        Ok(self.state.lock().unwrap().tables.contains(name))
    }
}
