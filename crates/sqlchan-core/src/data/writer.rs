use super::{decimal128, MAX_POINTER_SIZE, STRING_ENTITY};
use crate::{
    schema::{Field, FieldType, Message},
    stmt::Value,
    Error, Result,
};

use rust_decimal::Decimal;

/// Builds an encoded message one field at a time.
///
/// Fields not written stay zeroed. Writing an optional field sets its
/// presence bit.
#[derive(Debug)]
pub struct MessageWriter<'a> {
    message: &'a Message,
    buf: Vec<u8>,
}

impl<'a> MessageWriter<'a> {
    pub fn new(message: &'a Message) -> MessageWriter<'a> {
        MessageWriter {
            message,
            buf: vec![0; message.size],
        }
    }

    /// Writes a field's logical value, narrowing integers when they fit.
    pub fn set(&mut self, field: &Field, value: Value) -> Result<()> {
        self.set_value(field, value)
            .map_err(|e| e.context(format!("field `{}`", field.name)))?;

        if let Some(bit) = field.bit {
            self.set_pmap_bit(bit);
        }

        Ok(())
    }

    fn set_value(&mut self, field: &Field, value: Value) -> Result<()> {
        let at = field.offset;

        match &field.ty {
            FieldType::Int8 => self.put(at, &i8::try_from(value)?.to_le_bytes()),
            FieldType::Int16 => self.put(at, &i16::try_from(value)?.to_le_bytes()),
            FieldType::Int32 => self.put(at, &i32::try_from(value)?.to_le_bytes()),
            FieldType::Int64 => self.put(at, &i64::try_from(value)?.to_le_bytes()),
            FieldType::UInt8 => self.put(at, &u8::try_from(value)?.to_le_bytes()),
            FieldType::UInt16 => self.put(at, &u16::try_from(value)?.to_le_bytes()),
            FieldType::UInt32 => self.put(at, &u32::try_from(value)?.to_le_bytes()),
            FieldType::UInt64 => self.put(at, &u64::try_from(value)?.to_le_bytes()),
            FieldType::Double => self.put(at, &f64::try_from(value)?.to_le_bytes()),
            FieldType::Decimal128 => {
                self.put(at, &decimal128::encode(Decimal::try_from(value)?))
            }
            FieldType::Bytes { size, string } => {
                let bytes = if *string {
                    String::try_from(value)?.into_bytes()
                } else {
                    Vec::<u8>::try_from(value)?
                };
                if bytes.len() > *size {
                    return Err(Error::marshal(format!(
                        "{} bytes do not fit a {size}-byte field",
                        bytes.len()
                    )));
                }
                self.buf[at..at + size].fill(0);
                self.put(at, &bytes)
            }
            FieldType::String => self.put_string(at, &String::try_from(value)?),
            FieldType::TimePoint(_) => self.put(at, &i64::try_from(value)?.to_le_bytes()),
            FieldType::List(_) => Err(Error::unsupported_feature("list fields cannot be written")),
        }
    }

    /// Sets a presence bit. No-op for messages without a bitmap.
    pub fn set_pmap_bit(&mut self, bit: u32) {
        if let Some(field) = self.message.pmap_field() {
            let byte = field.offset + (bit / 8) as usize;
            if byte < field.offset + field.size() {
                self.buf[byte] |= 1 << (bit % 8);
            }
        }
    }

    /// Returns the encoded message: the fixed part followed by the tail.
    pub fn finish(self) -> Vec<u8> {
        self.buf
    }

    fn put(&mut self, at: usize, bytes: &[u8]) -> Result<()> {
        self.buf[at..at + bytes.len()].copy_from_slice(bytes);
        Ok(())
    }

    fn put_string(&mut self, at: usize, value: &str) -> Result<()> {
        if value.is_empty() {
            return self.put(at, &[0; 8]);
        }

        let size = value.len() + 1;
        if size > MAX_POINTER_SIZE {
            return Err(Error::marshal(format!(
                "string of {} bytes exceeds the offset pointer limit",
                value.len()
            )));
        }

        let offset = (self.buf.len() - at) as u32;
        let packed = size as u32 | (u32::from(STRING_ENTITY) << 24);

        self.buf.extend_from_slice(value.as_bytes());
        self.buf.push(0);

        self.put(at, &offset.to_le_bytes())?;
        self.put(at + 4, &packed.to_le_bytes())
    }
}
