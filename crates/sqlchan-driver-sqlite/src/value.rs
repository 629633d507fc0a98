use chrono::{DateTime, NaiveDate, NaiveDateTime};
use rusqlite::{
    types::{ToSql, ToSqlOutput, Value as SqlValue, ValueRef},
    Row,
};
use rust_decimal::Decimal;
use sqlchan_core::{
    stmt::{self, Value as CoreValue},
    Error, Result,
};

#[derive(Debug)]
pub struct Value(CoreValue);

impl From<CoreValue> for Value {
    fn from(value: CoreValue) -> Self {
        Self(value)
    }
}

impl Value {
    /// Converts this SQLite driver value into the core value.
    pub fn into_inner(self) -> CoreValue {
        self.0
    }

    /// Converts a SQLite value within a row to a core value.
    ///
    /// SQLite columns have no fixed type, so the storage class of the value
    /// is combined with the expected type: text holds decimals and
    /// datetimes, integers hold booleans and epoch seconds.
    pub fn from_sql(row: &Row, index: usize, ty: &stmt::Type) -> Result<Self> {
        let value = row.get_ref(index).map_err(crate::error)?;

        let core_value = match value {
            ValueRef::Null => CoreValue::Null,
            ValueRef::Integer(value) => match ty {
                stmt::Type::F64 => CoreValue::F64(value as f64),
                stmt::Type::Decimal => CoreValue::Decimal(Decimal::from(value)),
                stmt::Type::String => CoreValue::String(value.to_string()),
                stmt::Type::Timestamp => CoreValue::Timestamp(
                    DateTime::from_timestamp(value, 0)
                        .ok_or_else(|| {
                            Error::marshal(format!("epoch seconds {value} out of range"))
                        })?
                        .naive_utc(),
                ),
                _ => CoreValue::I64(value),
            },
            ValueRef::Real(value) => match ty {
                stmt::Type::Decimal => CoreValue::Decimal(
                    Decimal::try_from(value)
                        .map_err(|e| Error::marshal(format!("{value} as decimal: {e}")))?,
                ),
                _ => CoreValue::F64(value),
            },
            ValueRef::Text(bytes) => {
                let text = std::str::from_utf8(bytes)
                    .map_err(|e| Error::marshal(format!("column {index} is not UTF-8: {e}")))?;

                match ty {
                    stmt::Type::Decimal => CoreValue::Decimal(text.parse().map_err(|e| {
                        Error::marshal(format!("`{text}` is not a decimal: {e}"))
                    })?),
                    stmt::Type::Timestamp => CoreValue::Timestamp(parse_datetime(text)?),
                    stmt::Type::Date => CoreValue::Date(
                        NaiveDate::parse_from_str(text, "%Y-%m-%d").map_err(|e| {
                            Error::marshal(format!("`{text}` is not a date: {e}"))
                        })?,
                    ),
                    stmt::Type::Bytes => CoreValue::Bytes(bytes.to_vec()),
                    _ => CoreValue::String(text.to_string()),
                }
            }
            ValueRef::Blob(bytes) => match ty {
                stmt::Type::String => CoreValue::String(
                    String::from_utf8(bytes.to_vec())
                        .map_err(|e| Error::marshal(format!("column {index} is not UTF-8: {e}")))?,
                ),
                _ => CoreValue::Bytes(bytes.to_vec()),
            },
        };

        Ok(Value(core_value))
    }
}

fn parse_datetime(text: &str) -> Result<NaiveDateTime> {
    ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"]
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(text, format).ok())
        .ok_or_else(|| Error::marshal(format!("`{text}` is not a datetime")))
}

impl ToSql for Value {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        use stmt::Value;

        match &self.0 {
            Value::I8(v) => Ok(ToSqlOutput::Owned(SqlValue::Integer(*v as i64))),
            Value::I16(v) => Ok(ToSqlOutput::Owned(SqlValue::Integer(*v as i64))),
            Value::I32(v) => Ok(ToSqlOutput::Owned(SqlValue::Integer(*v as i64))),
            Value::I64(v) => Ok(ToSqlOutput::Owned(SqlValue::Integer(*v))),
            Value::U8(v) => Ok(ToSqlOutput::Owned(SqlValue::Integer(*v as i64))),
            Value::U16(v) => Ok(ToSqlOutput::Owned(SqlValue::Integer(*v as i64))),
            Value::U32(v) => Ok(ToSqlOutput::Owned(SqlValue::Integer(*v as i64))),
            Value::U64(v) => i64::try_from(*v)
                .map(|v| ToSqlOutput::Owned(SqlValue::Integer(v)))
                .map_err(|_| {
                    rusqlite::Error::ToSqlConversionFailure(Box::new(Error::marshal(format!(
                        "{v} does not fit a 64-bit signed integer column"
                    ))))
                }),
            Value::F64(v) => Ok(ToSqlOutput::Owned(SqlValue::Real(*v))),
            Value::Decimal(v) => Ok(ToSqlOutput::Owned(SqlValue::Text(v.to_string()))),
            Value::String(v) => Ok(ToSqlOutput::Borrowed(ValueRef::Text(v.as_bytes()))),
            Value::Bytes(v) => Ok(ToSqlOutput::Borrowed(ValueRef::Blob(&v[..]))),
            Value::Timestamp(v) => v.to_sql(),
            Value::Date(v) => v.to_sql(),
            Value::Null => Ok(ToSqlOutput::Owned(SqlValue::Null)),
        }
    }
}
