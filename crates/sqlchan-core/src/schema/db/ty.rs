use crate::{
    driver,
    schema::{FieldType, TimeResolution},
    Error, Result,
};

/// Database-level storage types: how a column is declared in `CREATE TABLE`.
///
/// A message field maps to a `db::Type` through [`Type::from_field`]. The
/// mapping depends on the backend's [`driver::StorageTypes`]: SQLite has no
/// unsigned or decimal columns, MySQL has no unbounded indexed text, and so
/// on. The serializer then renders the storage type in the backend's dialect.
#[derive(Debug, Clone, PartialEq)]
pub enum Type {
    /// A signed integer of `n` bytes
    Integer(u8),

    /// An unsigned integer of `n` bytes
    UnsignedInteger(u8),

    /// Double precision float
    Double,

    /// Unconstrained text type
    Text,

    /// Text type with an explicit maximum length
    VarChar(u64),

    /// Decimal number with optional precision and scale.
    /// - `None`: Arbitrary-precision decimal
    /// - `Some((precision, scale))`: Fixed precision and scale
    Numeric(Option<(u32, u32)>),

    /// Unconstrained binary type
    Blob,

    /// Binary type of at most `n` bytes
    Binary(u64),

    /// An instant in time with fractional seconds precision (0-9 digits).
    Timestamp(u8),

    /// A civil date in the Gregorian calendar.
    Date,

    /// User-specified type from the `sql.column-type` option, emitted as-is
    Custom(String),
}

impl Type {
    /// Maps a declared field type to the storage type of its column.
    ///
    /// `hint` is an explicit column type and always wins.
    pub fn from_field(
        ty: &FieldType,
        hint: Option<&str>,
        db: &driver::Capability,
    ) -> Result<Type> {
        if let Some(hint) = hint {
            return Ok(Type::Custom(hint.to_string()));
        }

        let storage = &db.storage_types;

        let ty = match ty {
            FieldType::Int8 => Type::Integer(1),
            FieldType::Int16 => Type::Integer(2),
            FieldType::Int32 => Type::Integer(4),
            FieldType::Int64 => Type::Integer(8),
            FieldType::UInt8 | FieldType::UInt16 | FieldType::UInt32 | FieldType::UInt64
                if storage.unsigned_integers =>
            {
                Type::UnsignedInteger(ty.size() as u8)
            }
            FieldType::UInt8 => Type::Integer(2),
            FieldType::UInt16 => Type::Integer(4),
            FieldType::UInt32 => Type::Integer(8),
            FieldType::UInt64 if storage.decimal => Type::Numeric(Some((20, 0))),
            FieldType::UInt64 => Type::Integer(8),
            FieldType::Double => Type::Double,
            FieldType::Decimal128 if storage.decimal => Type::Numeric(None),
            FieldType::Decimal128 => storage.default_string_type.clone(),
            FieldType::Bytes { string: true, size } => match storage.varchar {
                Some(max) if *size as u64 <= max => Type::VarChar(*size as u64),
                _ => storage.default_string_type.clone(),
            },
            FieldType::Bytes { string: false, size } => Type::Binary(*size as u64),
            FieldType::String => storage.default_string_type.clone(),
            FieldType::TimePoint(TimeResolution::Day) => Type::Date,
            FieldType::TimePoint(resolution) => Type::Timestamp(
                resolution
                    .fraction_digits()
                    .min(storage.datetime_precision),
            ),
            FieldType::List(_) => {
                return Err(Error::unsupported_feature(
                    "list fields have no column mapping",
                ))
            }
        };

        ty.verify(db)?;
        Ok(ty)
    }

    /// Storage type of the sequence number column.
    pub fn seq() -> Type {
        Type::Integer(8)
    }

    pub(crate) fn verify(&self, db: &driver::Capability) -> Result<()> {
        match *self {
            Type::VarChar(size) => match db.storage_types.varchar {
                Some(max) if size > max => Err(Error::unsupported_feature(format!(
                    "VARCHAR({}) exceeds database maximum of {}",
                    size, max
                ))),
                None => Err(Error::unsupported_feature(
                    "VARCHAR type is not supported by this database",
                )),
                _ => Ok(()),
            },
            Type::UnsignedInteger(_) if !db.storage_types.unsigned_integers => Err(
                Error::unsupported_feature("unsigned integer columns are not supported"),
            ),
            _ => Ok(()),
        }
    }
}
