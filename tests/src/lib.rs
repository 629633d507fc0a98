pub mod exec_log;
pub use exec_log::{ExecLog, Statement};

pub mod mock_driver;
pub use mock_driver::MockDriver;

#[cfg(feature = "postgresql")]
pub mod postgresql;

pub use std_util::*;

use indexmap::IndexMap;
use sqlchan::{data, schema, Channel, Message};
use sqlchan_core::stmt::Value;

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Calls `process` until the read ends. Panics unless exactly one
/// `EndOfData` terminates the data messages.
pub fn drain(channel: &mut Channel) -> Vec<Message> {
    let mut messages = vec![];

    loop {
        match assert_ok!(channel.process()) {
            Some(message) if message.is_end_of_data() => break,
            Some(message) => messages.push(message),
            None => panic!("stream ended without EndOfData"),
        }
    }

    assert!(
        assert_ok!(channel.process()).is_none(),
        "message after EndOfData"
    );
    messages
}

/// Drains a read and decodes every data message as `message`.
pub fn drain_rows(channel: &mut Channel, message: &schema::Message) -> Vec<IndexMap<String, Value>> {
    drain(channel)
        .iter()
        .map(|m| {
            let data = m.as_data().expect("data message");
            assert_eq!(data.msgid, message.msgid);
            assert_ok!(data::decode(message, &data.data))
        })
        .collect()
}

/// Encodes a data message from field values.
pub fn data_message<'a>(
    message: &schema::Message,
    seq: i64,
    fields: impl IntoIterator<Item = (&'a str, Value)>,
) -> Message {
    Message::data(message.msgid, seq, assert_ok!(data::encode(message, fields)))
}
