use crate::{
    driver::Capability,
    schema::{FieldType, TimeResolution},
    Result,
};

/// The type of a [`Value`](super::Value) at the SQL boundary.
///
/// This is the type a field is bound as and the type drivers are asked to
/// decode a result column into. It differs from the field's declared type
/// whenever the backend has no matching column type: unsigned integers are
/// widened, decimals may travel as text, time points become datetimes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Type {
    I8,
    I16,
    I32,
    I64,
    U8,
    U16,
    U32,
    U64,
    F64,
    Decimal,
    String,
    Bytes,
    Timestamp,
    Date,
}

impl Type {
    /// Maps a declared field type to the type it crosses the SQL boundary as
    /// on a backend with the given capability.
    pub fn from_field(ty: &FieldType, db: &Capability) -> Result<Type> {
        let storage = &db.storage_types;

        Ok(match ty {
            FieldType::Int8 => Type::I8,
            FieldType::Int16 => Type::I16,
            FieldType::Int32 => Type::I32,
            FieldType::Int64 => Type::I64,
            FieldType::UInt8 if storage.unsigned_integers => Type::U8,
            FieldType::UInt16 if storage.unsigned_integers => Type::U16,
            FieldType::UInt32 if storage.unsigned_integers => Type::U32,
            FieldType::UInt64 if storage.unsigned_integers => Type::U64,
            // Widen to the next signed width, which holds every value.
            FieldType::UInt8 => Type::I16,
            FieldType::UInt16 => Type::I32,
            FieldType::UInt32 => Type::I64,
            // No wider integer exists: go through NUMERIC when available,
            // otherwise values above i64::MAX are rejected at bind time.
            FieldType::UInt64 if storage.decimal => Type::Decimal,
            FieldType::UInt64 => Type::I64,
            FieldType::Double => Type::F64,
            FieldType::Decimal128 if storage.decimal => Type::Decimal,
            FieldType::Decimal128 => Type::String,
            FieldType::Bytes { string: true, .. } => Type::String,
            FieldType::Bytes { string: false, .. } => Type::Bytes,
            FieldType::String => Type::String,
            FieldType::TimePoint(TimeResolution::Day) => Type::Date,
            FieldType::TimePoint(_) => Type::Timestamp,
            FieldType::List(_) => {
                return Err(crate::Error::unsupported_feature(
                    "list fields have no column mapping",
                ))
            }
        })
    }

    pub fn is_integer(self) -> bool {
        matches!(
            self,
            Type::I8
                | Type::I16
                | Type::I32
                | Type::I64
                | Type::U8
                | Type::U16
                | Type::U32
                | Type::U64
        )
    }
}
