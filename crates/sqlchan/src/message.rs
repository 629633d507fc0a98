//! Messages exchanged with the channel.

pub use sqlchan_sql::{Operator, Predicate, PredicateValue};

/// A message posted to or produced by the channel.
#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    /// Application message described by the schema
    Data(Data),

    /// Channel control message
    Control(Control),
}

/// An encoded application message.
#[derive(Debug, Clone, PartialEq)]
pub struct Data {
    pub msgid: i32,

    /// Sequence number assigned by the framework
    pub seq: i64,

    /// Message body in the schema's binary layout
    pub data: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Control {
    /// Request to stream the rows of a message's table
    Query(Query),

    /// Terminates the rows of a read
    EndOfData,
}

/// Reads back the rows stored for `message` matching every predicate.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Query {
    /// Message id whose table is read
    pub message: i32,

    /// Predicates combined with `AND`, empty for all rows
    pub expression: Vec<Predicate>,
}

impl Message {
    pub fn data(msgid: i32, seq: i64, data: Vec<u8>) -> Message {
        Message::Data(Data { msgid, seq, data })
    }

    pub fn query(message: i32, expression: Vec<Predicate>) -> Message {
        Message::Control(Control::Query(Query {
            message,
            expression,
        }))
    }

    pub fn is_end_of_data(&self) -> bool {
        matches!(self, Message::Control(Control::EndOfData))
    }

    /// The data message, `None` for control messages.
    pub fn as_data(&self) -> Option<&Data> {
        match self {
            Message::Data(data) => Some(data),
            Message::Control(_) => None,
        }
    }
}

impl Control {
    pub const QUERY_MSGID: i32 = 40;
    pub const END_OF_DATA_MSGID: i32 = 50;

    pub fn msgid(&self) -> i32 {
        match self {
            Control::Query(_) => Self::QUERY_MSGID,
            Control::EndOfData => Self::END_OF_DATA_MSGID,
        }
    }
}

impl From<Data> for Message {
    fn from(value: Data) -> Self {
        Message::Data(value)
    }
}

impl From<Query> for Message {
    fn from(value: Query) -> Self {
        Message::Control(Control::Query(value))
    }
}
