//! A message channel backed by a SQL database.
//!
//! Each message type of the schema compiles to one statement at open:
//! `insert` stores the message in its table, `select`, `function` and
//! `procedure` return rows that the channel emits one per [`Channel::process`]
//! call, terminated by [`Control::EndOfData`]. A [`Query`] control message
//! reads back the rows of a message's table filtered by predicates.
//!
//! [`Heartbeat`] wraps a channel and posts a message into it after a period
//! of inactivity.

mod channel;
pub use channel::{Channel, State};

pub mod config;
pub use config::{Config, CreateMode, HeartbeatConfig};

mod create;

pub mod driver;

mod heartbeat;
pub use heartbeat::Heartbeat;

mod marshal;

pub mod message;
pub use message::{Control, Data, Message, Operator, Predicate, PredicateValue, Query};

mod stream;

pub use sqlchan_core::{data, schema, Error, Result, Schema, SEQ_COLUMN};
pub use sqlchan_sql::{IndexKind, Template};
