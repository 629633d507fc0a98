//! Compiles a structured filter into a parameterized `WHERE` clause.

use crate::{
    stmt::{Condition, Filter, Param},
    Serializer,
};

use rust_decimal::Decimal;
use sqlchan_core::{
    driver::Capability,
    schema::{Field, FieldType, Message, TimeResolution},
    stmt::{self, Value},
    Error, Result,
};
use std::{fmt, str::FromStr};

/// Comparison operator of a predicate. Discriminants are the wire codes of
/// the control message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i8)]
pub enum Operator {
    Eq = 0,
    Ne = 1,
    Gt = 2,
    Ge = 3,
    Lt = 4,
    Le = 5,
}

/// Operand of a predicate.
#[derive(Debug, Clone, PartialEq)]
pub enum PredicateValue {
    I(i64),
    F(f64),
    S(String),
}

/// `<field> <op> <value>`
#[derive(Debug, Clone, PartialEq)]
pub struct Predicate {
    pub field: String,
    pub op: Operator,
    pub value: PredicateValue,
}

/// A compiled `WHERE` clause body, without the keyword. Placeholders are
/// numbered from 1.
#[derive(Debug, Clone, PartialEq)]
pub struct Where {
    pub sql: String,
    pub values: Vec<Value>,
}

impl Predicate {
    pub fn new(field: impl Into<String>, op: Operator, value: impl Into<PredicateValue>) -> Predicate {
        Predicate {
            field: field.into(),
            op,
            value: value.into(),
        }
    }
}

/// Resolves predicates against a message type, converting each operand into
/// the value bound for the field's column.
pub fn filter(expression: &[Predicate], message: &Message, capability: &Capability) -> Result<Filter> {
    let mut conditions = Vec::with_capacity(expression.len());

    for predicate in expression {
        let field = message.field(&predicate.field).ok_or_else(|| {
            Error::query_compile(format!(
                "no such field `{}` in message `{}`",
                predicate.field, message.name
            ))
        })?;

        let value = operand(field, &predicate.value, capability)?;

        conditions.push(Condition {
            numeric: is_text_decimal(field, capability),
            ..Condition::new(field.column_name(), predicate.op, Param::Value(value))
        });
    }

    Ok(Filter { conditions })
}

/// Compiles predicates into `WHERE` clause text plus the values bound to its
/// placeholders, in order. An empty expression compiles to empty text.
pub fn compile(expression: &[Predicate], message: &Message, capability: &Capability) -> Result<Where> {
    let filter = filter(expression, message, capability)?;

    let mut params = vec![];
    let sql = Serializer::for_capability(capability).serialize_filter(&filter, &mut params);

    let values = params
        .into_iter()
        .map(|param| match param {
            Param::Value(value) => value,
            _ => Value::Null,
        })
        .collect();

    Ok(Where { sql, values })
}

fn operand(field: &Field, value: &PredicateValue, capability: &Capability) -> Result<Value> {
    let ty = stmt::Type::from_field(&field.ty, capability)
        .map_err(|e| Error::query_compile(format!("field `{}`: {e}", field.name)))?;

    let incompatible = || {
        Error::query_compile(format!(
            "{value} is not comparable with field `{}` of type {:?}",
            field.name, field.ty
        ))
    };

    let ret = match (&field.ty, value) {
        (field_ty, PredicateValue::I(v)) if is_integer(field_ty) => match ty {
            stmt::Type::Decimal => Value::Decimal(Decimal::from(*v)),
            stmt::Type::U64 if *v >= 0 => Value::U64(*v as u64),
            _ => Value::I64(*v),
        },
        (FieldType::Double, PredicateValue::I(v)) => Value::F64(*v as f64),
        (FieldType::Double, PredicateValue::F(v)) => Value::F64(*v),
        (FieldType::Decimal128, value) => {
            let decimal = match value {
                PredicateValue::I(v) => Decimal::from(*v),
                PredicateValue::F(v) => Decimal::try_from(*v).map_err(|_| incompatible())?,
                PredicateValue::S(v) => Decimal::from_str(v).map_err(|_| incompatible())?,
            };
            match ty {
                stmt::Type::Decimal => Value::Decimal(decimal),
                _ => Value::String(decimal.to_string()),
            }
        }
        (FieldType::String | FieldType::Bytes { string: true, .. }, PredicateValue::S(v)) => {
            Value::String(v.clone())
        }
        (FieldType::Bytes { string: false, .. }, PredicateValue::S(v)) => {
            Value::Bytes(v.as_bytes().to_vec())
        }
        (FieldType::TimePoint(TimeResolution::Day), PredicateValue::I(v)) => {
            Value::Date(TimeResolution::to_date(*v).map_err(|_| incompatible())?)
        }
        (FieldType::TimePoint(resolution), PredicateValue::I(v)) => {
            use chrono::SubsecRound;

            let datetime = resolution.to_datetime(*v).map_err(|_| incompatible())?;
            Value::Timestamp(datetime.trunc_subsecs(u16::from(capability.storage_types.datetime_precision)))
        }
        _ => return Err(incompatible()),
    };

    Ok(ret)
}

/// Decimals on backends without a decimal type are stored as text, which
/// orders lexicographically.
pub(crate) fn is_text_decimal(field: &Field, capability: &Capability) -> bool {
    matches!(field.ty, FieldType::Decimal128) && !capability.storage_types.decimal
}

fn is_integer(ty: &FieldType) -> bool {
    matches!(
        ty,
        FieldType::Int8
            | FieldType::Int16
            | FieldType::Int32
            | FieldType::Int64
            | FieldType::UInt8
            | FieldType::UInt16
            | FieldType::UInt32
            | FieldType::UInt64
    )
}

impl Operator {
    pub fn as_sql(self) -> &'static str {
        match self {
            Operator::Eq => "=",
            Operator::Ne => "<>",
            Operator::Gt => ">",
            Operator::Ge => ">=",
            Operator::Lt => "<",
            Operator::Le => "<=",
        }
    }
}

impl TryFrom<i8> for Operator {
    type Error = Error;

    fn try_from(code: i8) -> Result<Self> {
        Ok(match code {
            0 => Operator::Eq,
            1 => Operator::Ne,
            2 => Operator::Gt,
            3 => Operator::Ge,
            4 => Operator::Lt,
            5 => Operator::Le,
            _ => return Err(Error::query_compile(format!("unknown operator code {code}"))),
        })
    }
}

impl FromStr for Operator {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Ok(match s.to_ascii_uppercase().as_str() {
            "EQ" => Operator::Eq,
            "NE" => Operator::Ne,
            "GT" => Operator::Gt,
            "GE" => Operator::Ge,
            "LT" => Operator::Lt,
            "LE" => Operator::Le,
            _ => return Err(Error::query_compile(format!("unknown operator `{s}`"))),
        })
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Operator::Eq => "EQ",
            Operator::Ne => "NE",
            Operator::Gt => "GT",
            Operator::Ge => "GE",
            Operator::Lt => "LT",
            Operator::Le => "LE",
        })
    }
}

impl fmt::Display for PredicateValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PredicateValue::I(v) => write!(f, "integer {v}"),
            PredicateValue::F(v) => write!(f, "float {v}"),
            PredicateValue::S(v) => write!(f, "string {v:?}"),
        }
    }
}

impl From<i64> for PredicateValue {
    fn from(value: i64) -> Self {
        PredicateValue::I(value)
    }
}

impl From<i32> for PredicateValue {
    fn from(value: i32) -> Self {
        PredicateValue::I(value.into())
    }
}

impl From<f64> for PredicateValue {
    fn from(value: f64) -> Self {
        PredicateValue::F(value)
    }
}

impl From<String> for PredicateValue {
    fn from(value: String) -> Self {
        PredicateValue::S(value)
    }
}

impl From<&str> for PredicateValue {
    fn from(value: &str) -> Self {
        PredicateValue::S(value.to_string())
    }
}
