//! Binary message layout.
//!
//! A message is a fixed-size block of little-endian fields laid out in
//! declaration order, followed by a variable tail. Strings and lists live in
//! the tail and are referenced from the fixed part by an 8-byte offset
//! pointer:
//!
//! ```text
//! +-------------------+------------------------+-----------+
//! | offset: u32       | size: u24              | entity: u8|
//! +-------------------+------------------------+-----------+
//! ```
//!
//! `offset` is relative to the pointer's own position. For strings `size`
//! counts the terminating NUL and `entity` is 1. An empty string is an all
//! zero pointer.

pub mod decimal128;

mod view;
pub use view::MessageView;

mod writer;
pub use writer::MessageWriter;

use crate::{schema::Message, stmt::Value, Error, Result};

use indexmap::IndexMap;

/// Encodes field values into a message body. Optional fields that are not
/// listed stay absent.
pub fn encode<'a>(
    message: &Message,
    values: impl IntoIterator<Item = (&'a str, Value)>,
) -> Result<Vec<u8>> {
    let mut writer = MessageWriter::new(message);

    for (name, value) in values {
        let field = message.field(name).ok_or_else(|| {
            Error::marshal(format!("message `{}` has no field `{name}`", message.name))
        })?;
        writer.set(field, value)?;
    }

    Ok(writer.finish())
}

/// Decodes a message body into field values, skipping the presence bitmap
/// and absent optional fields.
pub fn decode(message: &Message, data: &[u8]) -> Result<IndexMap<String, Value>> {
    let view = MessageView::new(message, data)?;
    let mut ret = IndexMap::new();

    for (_, field) in message.data_fields() {
        if view.is_present(field)? {
            ret.insert(field.name.clone(), view.get(field)?);
        }
    }

    Ok(ret)
}

pub(crate) const STRING_ENTITY: u8 = 1;
pub(crate) const MAX_POINTER_SIZE: usize = 0x00ff_ffff;
