use super::decimal128;
use crate::{
    schema::{Field, FieldType, Message},
    stmt::Value,
    Error, Result,
};

/// Read access to the fields of an encoded message.
#[derive(Debug, Clone, Copy)]
pub struct MessageView<'a> {
    message: &'a Message,
    data: &'a [u8],
}

impl<'a> MessageView<'a> {
    pub fn new(message: &'a Message, data: &'a [u8]) -> Result<MessageView<'a>> {
        if data.len() < message.size {
            return Err(Error::marshal(format!(
                "message `{}` is {} bytes, got {}",
                message.name,
                message.size,
                data.len()
            )));
        }

        Ok(MessageView { message, data })
    }

    pub fn message(&self) -> &'a Message {
        self.message
    }

    /// Value of the presence bitmap, `None` if the message has none.
    pub fn pmap(&self) -> Result<Option<u64>> {
        let Some(field) = self.message.pmap_field() else {
            return Ok(None);
        };

        let bytes = self.slice(field.offset, field.size())?;
        let mut buf = [0u8; 8];
        buf[..bytes.len()].copy_from_slice(bytes);
        Ok(Some(u64::from_le_bytes(buf)))
    }

    /// Returns `false` for an optional field whose presence bit is clear.
    pub fn is_present(&self, field: &Field) -> Result<bool> {
        match (field.bit, self.pmap()?) {
            (Some(bit), Some(pmap)) => Ok(pmap & (1 << bit) != 0),
            _ => Ok(true),
        }
    }

    /// Reads a field's logical value.
    pub fn get(&self, field: &Field) -> Result<Value> {
        let at = field.offset;

        Ok(match &field.ty {
            FieldType::Int8 => Value::I8(i8::from_le_bytes(self.array(at)?)),
            FieldType::Int16 => Value::I16(i16::from_le_bytes(self.array(at)?)),
            FieldType::Int32 => Value::I32(i32::from_le_bytes(self.array(at)?)),
            FieldType::Int64 => Value::I64(i64::from_le_bytes(self.array(at)?)),
            FieldType::UInt8 => Value::U8(u8::from_le_bytes(self.array(at)?)),
            FieldType::UInt16 => Value::U16(u16::from_le_bytes(self.array(at)?)),
            FieldType::UInt32 => Value::U32(u32::from_le_bytes(self.array(at)?)),
            FieldType::UInt64 => Value::U64(u64::from_le_bytes(self.array(at)?)),
            FieldType::Double => Value::F64(f64::from_le_bytes(self.array(at)?)),
            FieldType::Decimal128 => Value::Decimal(decimal128::decode(self.array(at)?)?),
            FieldType::Bytes { size, string: true } => {
                let bytes = self.slice(at, *size)?;
                let end = bytes.iter().position(|b| *b == 0).unwrap_or(bytes.len());
                Value::String(utf8(&bytes[..end], field)?)
            }
            FieldType::Bytes {
                size,
                string: false,
            } => Value::Bytes(self.slice(at, *size)?.to_vec()),
            FieldType::String => Value::String(self.string(field)?),
            FieldType::TimePoint(_) => Value::I64(i64::from_le_bytes(self.array(at)?)),
            FieldType::List(_) => {
                return Err(Error::unsupported_feature(format!(
                    "list field `{}` cannot be read",
                    field.name
                )))
            }
        })
    }

    fn string(&self, field: &Field) -> Result<String> {
        let pointer = field.offset;
        let offset = u32::from_le_bytes(self.array(pointer)?) as usize;
        let size = (u32::from_le_bytes(self.array(pointer + 4)?) & 0x00ff_ffff) as usize;

        if size == 0 {
            return Ok(String::new());
        }

        let bytes = self.slice(pointer + offset, size)?;
        let bytes = match bytes.split_last() {
            Some((0, rest)) => rest,
            _ => bytes,
        };

        utf8(bytes, field)
    }

    fn array<const N: usize>(&self, at: usize) -> Result<[u8; N]> {
        let mut buf = [0u8; N];
        buf.copy_from_slice(self.slice(at, N)?);
        Ok(buf)
    }

    fn slice(&self, at: usize, len: usize) -> Result<&'a [u8]> {
        at.checked_add(len)
            .and_then(|end| self.data.get(at..end))
            .ok_or_else(|| {
                Error::marshal(format!(
                    "out of bounds read of {len} bytes at {at} in message `{}` ({} bytes)",
                    self.message.name,
                    self.data.len()
                ))
            })
    }
}

fn utf8(bytes: &[u8], field: &Field) -> Result<String> {
    String::from_utf8(bytes.to_vec())
        .map_err(|e| Error::marshal(format!("field `{}` is not valid UTF-8: {e}", field.name)))
}
