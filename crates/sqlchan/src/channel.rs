use crate::{
    create, driver,
    marshal,
    message::{Control, Data, Message, Query},
    stream::Stream,
    Config, Error, Result,
};

use sqlchan_core::{
    driver::{Connection, Driver},
    Schema,
};
use sqlchan_sql::{CompiledStatement, Compiler, Sql, Template};
use std::{collections::HashMap, sync::Arc};

/// Channel lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    Closed,
    Active,

    /// The connection failed. Only `close` is accepted.
    Error,
}

/// Persists posted messages into a SQL database and streams rows back.
///
/// Calls are synchronous: `post` runs a statement to completion and
/// `process` emits at most one message per call.
#[derive(Debug)]
pub struct Channel {
    schema: Arc<Schema>,

    /// Driver given at construction, otherwise picked from the URL at open
    driver: Option<Box<dyn Driver>>,

    state: State,

    session: Option<Session>,
}

/// Everything bound to one open connection.
#[derive(Debug)]
struct Session {
    connection: Box<dyn Connection>,

    /// One statement per message type, compiled at open
    statements: HashMap<i32, CompiledStatement>,

    default_template: Template,

    /// The open read, until its `EndOfData` is emitted
    stream: Option<Stream>,
}

impl Channel {
    pub fn new(schema: impl Into<Arc<Schema>>) -> Channel {
        Channel {
            schema: schema.into(),
            driver: None,
            state: State::Closed,
            session: None,
        }
    }

    /// Channel using `driver` instead of the one named by the config URL.
    pub fn with_driver(schema: impl Into<Arc<Schema>>, driver: impl Driver) -> Channel {
        Channel {
            driver: Some(Box::new(driver)),
            ..Channel::new(schema)
        }
    }

    pub fn schema(&self) -> &Arc<Schema> {
        &self.schema
    }

    pub fn state(&self) -> State {
        self.state
    }

    /// Returns `true` while rows of a read remain to be emitted.
    pub fn is_streaming(&self) -> bool {
        self.session
            .as_ref()
            .is_some_and(|session| session.stream.is_some())
    }

    /// Connects, compiles a statement per message type and applies the
    /// create mode.
    pub fn open(&mut self, config: &Config) -> Result<()> {
        if self.state != State::Closed {
            return Err(Error::channel_state("already open"));
        }

        log::info!("opening channel; url={}", config.url);

        let mut connection = match &self.driver {
            Some(driver) => driver.connect()?,
            None => driver::from_url(&config.url)?.connect()?,
        };

        let statements = self
            .compile(connection.capability(), config.default_template)
            .and_then(|statements| {
                create::resolve(connection.as_mut(), &self.schema, config)?;
                Ok(statements)
            });

        let statements = match statements {
            Ok(statements) => statements,
            Err(err) => {
                if let Err(close) = connection.close() {
                    log::warn!("failed to close connection: {close}");
                }
                return Err(err);
            }
        };

        self.session = Some(Session {
            connection,
            statements,
            default_template: config.default_template,
            stream: None,
        });
        self.state = State::Active;

        log::info!("channel open; {} message types", self.schema.messages().count());
        Ok(())
    }

    fn compile(
        &self,
        capability: &sqlchan_core::driver::Capability,
        default_template: Template,
    ) -> Result<HashMap<i32, CompiledStatement>> {
        let compiler = Compiler::new(&self.schema, capability, default_template);

        self.schema
            .messages()
            .filter(|message| {
                if message.msgid == 0 {
                    log::debug!("message `{}` has no msgid, skipping", message.name);
                }
                message.msgid != 0
            })
            .map(|message| {
                compiler
                    .compile(message)
                    .map(|stmt| (message.msgid, stmt))
                    .map_err(|e| e.context(format!("message `{}`", message.name)))
            })
            .collect()
    }

    /// Executes the statement of a data message, or starts the read of a
    /// query control message.
    pub fn post(&mut self, message: &Message) -> Result<()> {
        let result = match message {
            Message::Data(data) => self.post_data(data),
            Message::Control(Control::Query(query)) => self.post_query(query),
            Message::Control(control) => Err(Error::unknown_message(control.msgid())),
        };

        self.check(result)
    }

    fn post_data(&mut self, data: &Data) -> Result<()> {
        let schema = self.schema.clone();
        let session = self.session()?;

        let stmt = session
            .statements
            .get(&data.msgid)
            .ok_or_else(|| Error::unknown_message(data.msgid))?;

        let Some(sql) = stmt.sql.text() else {
            return Ok(());
        };

        let message = schema
            .message(data.msgid)
            .ok_or_else(|| Error::unknown_message(data.msgid))?;

        let capability = session.connection.capability();
        let params = marshal::params(stmt, message, Some(data), capability)?;

        match &stmt.output {
            None => {
                let count = session.connection.execute(sql, &params)?;
                log::trace!("message {} (seq {}): {count} rows affected", data.msgid, data.seq);
                Ok(())
            }
            Some(output) => {
                if session.stream.is_some() {
                    return Err(Error::query_in_progress());
                }

                session.connection.query(sql, &params, &output.columns)?;
                session.stream = Some(Stream::new(output.clone()));
                Ok(())
            }
        }
    }

    fn post_query(&mut self, query: &Query) -> Result<()> {
        let schema = self.schema.clone();
        let session = self.session()?;

        if session.stream.is_some() {
            return Err(Error::query_in_progress());
        }

        let message = schema
            .message(query.message)
            .ok_or_else(|| Error::unknown_message(query.message))?;

        let capability = session.connection.capability();
        let stmt = Compiler::new(&schema, capability, session.default_template)
            .compile_query(message, &query.expression)?;

        let (Sql::Generated(sql), Some(output)) = (&stmt.sql, &stmt.output) else {
            return Err(sqlchan_core::err!("query on `{}` compiled to no select", message.name));
        };

        let params = marshal::params(&stmt, message, None, capability)?;
        session.connection.query(sql, &params, &output.columns)?;
        session.stream = Some(Stream::new(output.clone()));
        Ok(())
    }

    /// Emits the next row of the current read, then a single `EndOfData`.
    /// Returns `None` when no read is pending.
    pub fn process(&mut self) -> Result<Option<Message>> {
        let result = self.process_next();
        self.check(result)
    }

    fn process_next(&mut self) -> Result<Option<Message>> {
        let schema = self.schema.clone();
        let session = self.session()?;

        let Some(stream) = session.stream.as_mut() else {
            return Ok(None);
        };

        match stream.next(&schema, session.connection.as_mut()) {
            Some(result) => result.map(Some),
            None => {
                session.stream = None;
                Ok(Some(Message::Control(Control::EndOfData)))
            }
        }
    }

    /// Drops any pending rows and the connection. Closing a closed channel
    /// is a no-op.
    pub fn close(&mut self) -> Result<()> {
        self.state = State::Closed;

        let Some(mut session) = self.session.take() else {
            return Ok(());
        };

        if let Some(stream) = session.stream.take() {
            log::debug!("dropping unfinished read: {stream:?}");

            if let Err(err) = session.connection.close_query() {
                log::warn!("failed to release read: {err}");
            }
        }

        log::info!("closing channel");
        session.connection.close()
    }

    fn session(&mut self) -> Result<&mut Session> {
        match self.state {
            State::Active => {}
            State::Closed => return Err(Error::channel_state("closed")),
            State::Error => return Err(Error::channel_state("failed")),
        }

        self.session
            .as_mut()
            .ok_or_else(|| Error::channel_state("closed"))
    }

    /// Connection errors leave the channel unusable until reopened.
    fn check<T>(&mut self, result: Result<T>) -> Result<T> {
        if let Err(err) = &result {
            if err.is_connection() && self.state == State::Active {
                log::error!("connection failed: {err}");
                self.state = State::Error;
            }
        }
        result
    }
}
