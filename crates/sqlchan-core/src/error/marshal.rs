use super::Error;

/// Error when a field value cannot be converted to or from a SQL value.
///
/// Raised before anything reaches the backend, so the failing message is
/// never partially applied.
#[derive(Debug)]
pub(super) struct MarshalError {
    message: Box<str>,
}

impl std::error::Error for MarshalError {}

impl core::fmt::Display for MarshalError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(f, "marshal error: {}", self.message)
    }
}

impl Error {
    /// Creates a marshal error.
    pub fn marshal(message: impl Into<String>) -> Error {
        Error::from(super::ErrorKind::Marshal(MarshalError {
            message: message.into().into(),
        }))
    }

    /// Creates a marshal error for a value that does not fit the target type.
    pub fn type_conversion(value: &crate::stmt::Value, to_type: &'static str) -> Error {
        Error::marshal(format!("cannot convert {value:?} to {to_type}"))
    }

    /// Returns `true` if this error is a marshal error.
    pub fn is_marshal(&self) -> bool {
        matches!(self.kind(), super::ErrorKind::Marshal(_))
    }
}
