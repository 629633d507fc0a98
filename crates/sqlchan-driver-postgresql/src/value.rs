use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use postgres::{Column, Row};
use postgres_types::{accepts, private::BytesMut, to_sql_checked, IsNull, ToSql, Type};
use rust_decimal::{prelude::ToPrimitive, Decimal};
use sqlchan_core::{
    stmt::{self, Value as CoreValue},
    Error, Result,
};

type BoxError = Box<dyn std::error::Error + Sync + Send>;

#[derive(Debug)]
pub struct Value(CoreValue);

impl From<CoreValue> for Value {
    fn from(value: CoreValue) -> Self {
        Self(value)
    }
}

impl Value {
    pub fn into_inner(self) -> CoreValue {
        self.0
    }

    /// Converts a PostgreSQL value within a row to a core value.
    ///
    /// The column's server type picks the decoder; the expected type only
    /// matters where the server type alone is ambiguous.
    pub fn from_sql(row: &Row, index: usize, column: &Column, ty: &stmt::Type) -> Result<Self> {
        // NOTE: the inner representation of the PostgreSQL type enum is not
        // accessible, so each type is matched by hand.
        let pg_ty = column.type_();

        let value = if *pg_ty == Type::INT2 {
            get::<i16>(row, index)?.map(CoreValue::I16)
        } else if *pg_ty == Type::INT4 {
            get::<i32>(row, index)?.map(CoreValue::I32)
        } else if *pg_ty == Type::INT8 {
            get::<i64>(row, index)?.map(CoreValue::I64)
        } else if *pg_ty == Type::FLOAT4 {
            get::<f32>(row, index)?.map(|v| CoreValue::F64(v as f64))
        } else if *pg_ty == Type::FLOAT8 {
            get::<f64>(row, index)?.map(CoreValue::F64)
        } else if *pg_ty == Type::NUMERIC {
            get::<Decimal>(row, index)?.map(|v| match ty {
                stmt::Type::String => CoreValue::String(v.to_string()),
                stmt::Type::F64 => v.to_f64().map_or(CoreValue::Decimal(v), CoreValue::F64),
                _ => CoreValue::Decimal(v),
            })
        } else if *pg_ty == Type::TEXT
            || *pg_ty == Type::VARCHAR
            || *pg_ty == Type::BPCHAR
            || *pg_ty == Type::NAME
        {
            match get::<String>(row, index)? {
                Some(v) if *ty == stmt::Type::Decimal => Some(CoreValue::Decimal(
                    v.parse()
                        .map_err(|e| Error::marshal(format!("`{v}` is not a decimal: {e}")))?,
                )),
                Some(v) => Some(CoreValue::String(v)),
                None => None,
            }
        } else if *pg_ty == Type::BYTEA {
            get::<Vec<u8>>(row, index)?.map(CoreValue::Bytes)
        } else if *pg_ty == Type::TIMESTAMP {
            get::<NaiveDateTime>(row, index)?.map(CoreValue::Timestamp)
        } else if *pg_ty == Type::TIMESTAMPTZ {
            get::<DateTime<Utc>>(row, index)?.map(|v| CoreValue::Timestamp(v.naive_utc()))
        } else if *pg_ty == Type::DATE {
            get::<NaiveDate>(row, index)?.map(CoreValue::Date)
        } else if *pg_ty == Type::BOOL {
            get::<bool>(row, index)?.map(|v| CoreValue::I8(v as i8))
        } else {
            return Err(Error::marshal(format!(
                "column `{}` has unsupported type `{pg_ty}`",
                column.name()
            )));
        };

        Ok(Value(value.unwrap_or(CoreValue::Null)))
    }
}

fn get<'a, T>(row: &'a Row, index: usize) -> Result<Option<T>>
where
    T: postgres::types::FromSql<'a>,
{
    row.try_get::<usize, Option<T>>(index)
        .map_err(|e| Error::marshal(format!("column {index}: {e}")))
}

fn out_of_range(value: impl std::fmt::Display, ty: &Type) -> BoxError {
    format!("value {value} is out of range for column type `{ty}`").into()
}

fn integer_to_sql(value: i128, ty: &Type, out: &mut BytesMut) -> Result<IsNull, BoxError> {
    match *ty {
        Type::INT2 => i16::try_from(value)
            .map_err(|_| out_of_range(value, ty))?
            .to_sql(ty, out),
        Type::INT4 => i32::try_from(value)
            .map_err(|_| out_of_range(value, ty))?
            .to_sql(ty, out),
        Type::INT8 => i64::try_from(value)
            .map_err(|_| out_of_range(value, ty))?
            .to_sql(ty, out),
        Type::NUMERIC => Decimal::try_from_i128_with_scale(value, 0)
            .map_err(|_| out_of_range(value, ty))?
            .to_sql(ty, out),
        Type::FLOAT8 => (value as f64).to_sql(ty, out),
        Type::FLOAT4 => (value as f32).to_sql(ty, out),
        _ => value.to_string().to_sql(ty, out),
    }
}

impl ToSql for Value {
    fn to_sql(&self, ty: &Type, out: &mut BytesMut) -> Result<IsNull, BoxError>
    where
        Self: Sized,
    {
        match &self.0 {
            stmt::Value::Null => Ok(IsNull::Yes),
            value @ (stmt::Value::I8(_)
            | stmt::Value::I16(_)
            | stmt::Value::I32(_)
            | stmt::Value::I64(_)
            | stmt::Value::U8(_)
            | stmt::Value::U16(_)
            | stmt::Value::U32(_)
            | stmt::Value::U64(_)) => {
                let value = value
                    .as_i128()
                    .ok_or_else(|| out_of_range(format!("{value:?}"), ty))?;
                integer_to_sql(value, ty, out)
            }
            stmt::Value::F64(value) => match *ty {
                Type::FLOAT8 => value.to_sql(ty, out),
                Type::FLOAT4 => (*value as f32).to_sql(ty, out),
                Type::NUMERIC => Decimal::try_from(*value)
                    .map_err(|_| out_of_range(value, ty))?
                    .to_sql(ty, out),
                _ => value.to_string().to_sql(ty, out),
            },
            stmt::Value::Decimal(value) => match *ty {
                Type::NUMERIC => value.to_sql(ty, out),
                Type::FLOAT8 => value
                    .to_f64()
                    .ok_or_else(|| out_of_range(value, ty))?
                    .to_sql(ty, out),
                _ => value.to_string().to_sql(ty, out),
            },
            stmt::Value::String(value) => match *ty {
                Type::BYTEA => value.as_bytes().to_sql(ty, out),
                _ => value.to_sql(ty, out),
            },
            stmt::Value::Bytes(value) => match *ty {
                Type::BYTEA => value.to_sql(ty, out),
                _ => std::str::from_utf8(value)?.to_sql(ty, out),
            },
            stmt::Value::Timestamp(value) => match *ty {
                Type::TIMESTAMPTZ => value.and_utc().to_sql(ty, out),
                Type::DATE => value.date().to_sql(ty, out),
                Type::TIMESTAMP => value.to_sql(ty, out),
                _ => value.to_string().to_sql(ty, out),
            },
            stmt::Value::Date(value) => match *ty {
                Type::DATE => value.to_sql(ty, out),
                Type::TIMESTAMP => value.and_time(NaiveTime::MIN).to_sql(ty, out),
                Type::TIMESTAMPTZ => value.and_time(NaiveTime::MIN).and_utc().to_sql(ty, out),
                _ => value.to_string().to_sql(ty, out),
            },
        }
    }

    accepts!(
        INT2,
        INT4,
        INT8,
        FLOAT4,
        FLOAT8,
        NUMERIC,
        TEXT,
        VARCHAR,
        BPCHAR,
        NAME,
        BYTEA,
        TIMESTAMP,
        TIMESTAMPTZ,
        DATE
    );
    to_sql_checked!();
}
