//! Conversion between message fields and SQL values.
//!
//! Binding widens a field to the type its column has on the backend and
//! truncates time points to the backend's datetime precision. Extraction
//! narrows column values back into the field, range checked.

use crate::{message::Data, Error, Result};

use chrono::{NaiveDateTime, NaiveTime, SubsecRound};
use sqlchan_core::{
    data::{MessageView, MessageWriter},
    driver::Capability,
    err,
    schema::{Field, FieldType, Message, TimeResolution},
    stmt::{Type, Value},
};
use sqlchan_sql::{stmt::Param, CompiledStatement, Output};

/// Parameters of a compiled statement for one posted message. Statements
/// whose parameters are all known at compile time take no message.
pub(crate) fn params(
    stmt: &CompiledStatement,
    message: &Message,
    data: Option<&Data>,
    capability: &Capability,
) -> Result<Vec<Value>> {
    let view = data
        .map(|data| MessageView::new(message, &data.data))
        .transpose()?;

    let no_message = || err!("statement for `{}` binds no message", message.name);

    stmt.params
        .iter()
        .map(|param| match param {
            Param::Seq => Ok(Value::I64(data.ok_or_else(no_message)?.seq)),
            Param::Field(index) => {
                let view = view.as_ref().ok_or_else(no_message)?;
                let field = field_at(message, *index)?;

                bind(view, field, capability).map_err(|e| {
                    e.context(format!("message `{}` field `{}`", message.name, field.name))
                })
            }
            Param::Present(index) => {
                let view = view.as_ref().ok_or_else(no_message)?;
                let field = field_at(message, *index)?;

                Ok(Value::I64(view.is_present(field)?.into()))
            }
            Param::Value(value) => Ok(value.clone()),
        })
        .collect()
}

fn field_at(message: &Message, index: usize) -> Result<&Field> {
    message.fields.get(index).ok_or_else(|| {
        Error::marshal(format!("message `{}` has no field #{index}", message.name))
    })
}

/// Reads a field into the value bound to its column. Optional fields with a
/// clear presence bit bind NULL.
pub(crate) fn bind(view: &MessageView<'_>, field: &Field, capability: &Capability) -> Result<Value> {
    if !view.is_present(field)? {
        return Ok(Value::Null);
    }

    let value = view.get(field)?;
    let ty = Type::from_field(&field.ty, capability)?;

    let bound = match (&field.ty, value) {
        (FieldType::TimePoint(TimeResolution::Day), Value::I64(days)) => {
            Value::Date(TimeResolution::to_date(days)?)
        }
        (FieldType::TimePoint(resolution), Value::I64(count)) => Value::Timestamp(truncate(
            resolution.to_datetime(count)?,
            capability,
        )),
        (_, value) => convert(value, ty)?,
    };

    Ok(bound)
}

/// Drops sub-second digits the backend does not store.
fn truncate(value: NaiveDateTime, capability: &Capability) -> NaiveDateTime {
    value.trunc_subsecs(u16::from(capability.storage_types.datetime_precision))
}

fn convert(value: Value, ty: Type) -> Result<Value> {
    Ok(match ty {
        Type::I8 => Value::I8(value.try_into()?),
        Type::I16 => Value::I16(value.try_into()?),
        Type::I32 => Value::I32(value.try_into()?),
        Type::I64 => Value::I64(value.try_into()?),
        Type::U8 => Value::U8(value.try_into()?),
        Type::U16 => Value::U16(value.try_into()?),
        Type::U32 => Value::U32(value.try_into()?),
        Type::U64 => Value::U64(value.try_into()?),
        Type::F64 => Value::F64(value.try_into()?),
        Type::Decimal => Value::Decimal(value.try_into()?),
        // Decimals on backends without NUMERIC are stored as their text.
        Type::String => match value {
            Value::Decimal(value) => Value::String(value.to_string()),
            value => Value::String(value.try_into()?),
        },
        Type::Bytes => Value::Bytes(value.try_into()?),
        Type::Timestamp | Type::Date => value,
    })
}

/// Builds an output message from a returned row. Returns the sequence number
/// (zero when the output has no sequence column) and the encoded body.
pub(crate) fn extract(message: &Message, output: &Output, row: Vec<Value>) -> Result<(i64, Vec<u8>)> {
    let mut values = row.into_iter();

    let seq = if output.with_seq {
        match values.next() {
            Some(Value::Null) | None => 0,
            Some(value) => i64::try_from(value).map_err(|e| e.context("sequence column"))?,
        }
    } else {
        0
    };

    let mut writer = MessageWriter::new(message);

    for field in &message.fields {
        let value = values.next().ok_or_else(|| {
            Error::marshal(format!(
                "row has no column for field `{}` of `{}`",
                field.name, message.name
            ))
        })?;

        extract_field(&mut writer, message, field, value)
            .map_err(|e| e.context(format!("message `{}`", message.name)))?;
    }

    Ok((seq, writer.finish()))
}

fn extract_field(
    writer: &mut MessageWriter<'_>,
    message: &Message,
    field: &Field,
    value: Value,
) -> Result<()> {
    if field.pmap {
        // Presence of optional fields follows the NULL-ness of their
        // columns, whatever the stored bitmap says.
        let stored = match value {
            Value::Null => 0,
            value => u64::try_from(value)?,
        };
        return writer.set(field, Value::U64(stored & !optional_mask(message)));
    }

    let value = match (&field.ty, value) {
        (_, Value::Null) if field.optional => return Ok(()),
        (_, Value::Null) => {
            return Err(Error::marshal(format!(
                "NULL in required field `{}`",
                field.name
            )))
        }
        (FieldType::TimePoint(resolution), value) => Value::I64(time_point(*resolution, value)?),
        (_, value) => value,
    };

    writer.set(field, value)
}

/// Count of `resolution` units since the epoch for a datetime column value.
fn time_point(resolution: TimeResolution, value: Value) -> Result<i64> {
    let datetime = match value {
        Value::Timestamp(value) => value,
        Value::Date(value) => value.and_time(NaiveTime::MIN),
        // Integer columns hold epoch seconds.
        Value::I64(secs) => TimeResolution::Second.to_datetime(secs)?,
        other => return Err(Error::type_conversion(&other, "time point")),
    };

    resolution.from_datetime(datetime)
}

fn optional_mask(message: &Message) -> u64 {
    message
        .fields
        .iter()
        .filter_map(|field| field.bit)
        .fold(0, |mask, bit| mask | (1 << bit))
}
