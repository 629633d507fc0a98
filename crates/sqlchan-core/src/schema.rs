mod builder;
pub use builder::{Builder, FieldBuilder, MessageBuilder};

pub mod db;

mod field;
pub use field::Field;

mod message;
pub use message::Message;

mod options;
pub use options::Options;

mod ty;
pub use ty::{FieldType, TimeResolution};

use indexmap::IndexMap;
use std::collections::HashMap;

/// A parsed message schema: the set of message types a channel can carry.
#[derive(Debug, Default, Clone)]
pub struct Schema {
    /// Messages keyed by name, in declaration order.
    messages: IndexMap<String, Message>,

    /// Message id to position in `messages`. Messages without an id (0) are
    /// not registered here.
    by_id: HashMap<i32, usize>,
}

impl Schema {
    pub fn builder() -> Builder {
        Builder::default()
    }

    /// Returns the message declared with the given id.
    pub fn message(&self, msgid: i32) -> Option<&Message> {
        let index = *self.by_id.get(&msgid)?;
        self.messages.get_index(index).map(|(_, message)| message)
    }

    /// Returns the message declared with the given name.
    pub fn message_by_name(&self, name: &str) -> Option<&Message> {
        self.messages.get(name)
    }

    /// Iterates over all messages in declaration order.
    pub fn messages(&self) -> impl Iterator<Item = &Message> {
        self.messages.values()
    }
}
