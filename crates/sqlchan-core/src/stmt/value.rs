use super::Type;
use crate::{Error, Result};

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;

/// A value as it crosses the SQL boundary: bound as a statement parameter,
/// read back from a result column, or held as a field's logical value.
#[derive(Debug, Default, Clone, PartialEq)]
pub enum Value {
    /// SQL NULL
    #[default]
    Null,

    /// Signed 8-bit integer
    I8(i8),

    /// Signed 16-bit integer
    I16(i16),

    /// Signed 32-bit integer
    I32(i32),

    /// Signed 64-bit integer
    I64(i64),

    /// Unsigned 8-bit integer
    U8(u8),

    /// Unsigned 16-bit integer
    U16(u16),

    /// Unsigned 32-bit integer
    U32(u32),

    /// Unsigned 64-bit integer
    U64(u64),

    /// IEEE double
    F64(f64),

    /// Exact decimal number
    Decimal(Decimal),

    /// Text
    String(String),

    /// Raw bytes
    Bytes(Vec<u8>),

    /// Date and time without a time zone, UTC by convention
    Timestamp(NaiveDateTime),

    /// Civil date
    Date(NaiveDate),
}

impl Value {
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Returns the type of the value, `None` for NULL.
    pub fn infer_ty(&self) -> Option<Type> {
        Some(match self {
            Value::Null => return None,
            Value::I8(_) => Type::I8,
            Value::I16(_) => Type::I16,
            Value::I32(_) => Type::I32,
            Value::I64(_) => Type::I64,
            Value::U8(_) => Type::U8,
            Value::U16(_) => Type::U16,
            Value::U32(_) => Type::U32,
            Value::U64(_) => Type::U64,
            Value::F64(_) => Type::F64,
            Value::Decimal(_) => Type::Decimal,
            Value::String(_) => Type::String,
            Value::Bytes(_) => Type::Bytes,
            Value::Timestamp(_) => Type::Timestamp,
            Value::Date(_) => Type::Date,
        })
    }

    /// Returns the string if this is a `String` value.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(v) => Some(v),
            _ => None,
        }
    }

    /// Widens any integer value to `i128`, the common domain for range checks.
    pub fn as_i128(&self) -> Option<i128> {
        Some(match *self {
            Value::I8(v) => v.into(),
            Value::I16(v) => v.into(),
            Value::I32(v) => v.into(),
            Value::I64(v) => v.into(),
            Value::U8(v) => v.into(),
            Value::U16(v) => v.into(),
            Value::U32(v) => v.into(),
            Value::U64(v) => v.into(),
            _ => return None,
        })
    }
}

macro_rules! impl_integer {
    ( $( $variant:ident => $t:ty ),+ ) => {
        $(
            impl From<$t> for Value {
                fn from(value: $t) -> Self {
                    Value::$variant(value)
                }
            }

            impl TryFrom<Value> for $t {
                type Error = Error;

                fn try_from(value: Value) -> Result<Self> {
                    if let Value::$variant(v) = value {
                        return Ok(v);
                    }

                    match value {
                        // Integer columns come back at the backend's width.
                        // Narrow them when the value fits.
                        ref v if v.as_i128().is_some() => v
                            .as_i128()
                            .and_then(|n| <$t>::try_from(n).ok())
                            .ok_or_else(|| Error::type_conversion(v, stringify!($t))),
                        // Exact decimals with a zero fraction, e.g. u64 read
                        // back from a NUMERIC column.
                        Value::Decimal(d) if d.fract().is_zero() => {
                            use rust_decimal::prelude::ToPrimitive;
                            d.to_i128()
                                .and_then(|n| <$t>::try_from(n).ok())
                                .ok_or_else(|| Error::type_conversion(&Value::Decimal(d), stringify!($t)))
                        }
                        Value::String(ref s) => s
                            .trim()
                            .parse::<$t>()
                            .map_err(|_| Error::type_conversion(&value, stringify!($t))),
                        other => Err(Error::type_conversion(&other, stringify!($t))),
                    }
                }
            }
        )+
    };
}

impl_integer!(
    I8 => i8,
    I16 => i16,
    I32 => i32,
    I64 => i64,
    U8 => u8,
    U16 => u16,
    U32 => u32,
    U64 => u64
);

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::F64(value)
    }
}

impl TryFrom<Value> for f64 {
    type Error = Error;

    fn try_from(value: Value) -> Result<Self> {
        use rust_decimal::prelude::ToPrimitive;

        match value {
            Value::F64(v) => Ok(v),
            Value::Decimal(d) => d
                .to_f64()
                .ok_or_else(|| Error::type_conversion(&Value::Decimal(d), "f64")),
            // Integer columns holding whole doubles, e.g. REAL affinity
            // storing 100.0 as 100 in SQLite.
            ref v if v.as_i128().is_some() => Ok(v.as_i128().unwrap_or_default() as f64),
            Value::String(ref s) => s
                .trim()
                .parse()
                .map_err(|_| Error::type_conversion(&value, "f64")),
            other => Err(Error::type_conversion(&other, "f64")),
        }
    }
}

impl From<Decimal> for Value {
    fn from(value: Decimal) -> Self {
        Value::Decimal(value)
    }
}

impl TryFrom<Value> for Decimal {
    type Error = Error;

    fn try_from(value: Value) -> Result<Self> {
        match value {
            Value::Decimal(v) => Ok(v),
            Value::String(ref s) => s
                .trim()
                .parse()
                .map_err(|_| Error::type_conversion(&value, "decimal")),
            ref v if v.as_i128().is_some() => v
                .as_i128()
                .and_then(|n| Decimal::try_from_i128_with_scale(n, 0).ok())
                .ok_or_else(|| Error::type_conversion(v, "decimal")),
            Value::F64(v) => {
                Decimal::try_from(v).map_err(|_| Error::type_conversion(&value, "decimal"))
            }
            other => Err(Error::type_conversion(&other, "decimal")),
        }
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_string())
    }
}

impl TryFrom<Value> for String {
    type Error = Error;

    fn try_from(value: Value) -> Result<Self> {
        match value {
            Value::String(v) => Ok(v),
            Value::Bytes(v) => {
                String::from_utf8(v).map_err(|e| Error::marshal(format!("invalid UTF-8 text: {e}")))
            }
            other => Err(Error::type_conversion(&other, "String")),
        }
    }
}

impl From<Vec<u8>> for Value {
    fn from(value: Vec<u8>) -> Self {
        Value::Bytes(value)
    }
}

impl TryFrom<Value> for Vec<u8> {
    type Error = Error;

    fn try_from(value: Value) -> Result<Self> {
        match value {
            Value::Bytes(v) => Ok(v),
            Value::String(v) => Ok(v.into_bytes()),
            other => Err(Error::type_conversion(&other, "bytes")),
        }
    }
}

impl From<NaiveDateTime> for Value {
    fn from(value: NaiveDateTime) -> Self {
        Value::Timestamp(value)
    }
}

impl From<NaiveDate> for Value {
    fn from(value: NaiveDate) -> Self {
        Value::Date(value)
    }
}

impl<T> From<Option<T>> for Value
where
    Value: From<T>,
{
    fn from(value: Option<T>) -> Self {
        value.map(Value::from).unwrap_or(Value::Null)
    }
}
