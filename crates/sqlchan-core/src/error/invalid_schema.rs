use super::Error;

/// Error when a message schema cannot be used by the adapter.
///
/// This occurs when:
/// - two messages share a name or message id
/// - a presence bitmap is misplaced, optional or not an unsigned integer
/// - an optional field is declared without a presence bitmap
/// - a `sql.*` option references an unknown message or has an invalid value
///
/// These errors are caught while building the schema or opening the channel.
#[derive(Debug)]
pub(super) struct InvalidSchema {
    message: Box<str>,
}

impl std::error::Error for InvalidSchema {}

impl core::fmt::Display for InvalidSchema {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(f, "invalid schema: {}", self.message)
    }
}

impl Error {
    /// Creates an invalid schema error.
    pub fn invalid_schema(message: impl Into<String>) -> Error {
        Error::from(super::ErrorKind::InvalidSchema(InvalidSchema {
            message: message.into().into(),
        }))
    }

    /// Returns `true` if this error is an invalid schema error.
    pub fn is_invalid_schema(&self) -> bool {
        matches!(self.kind(), super::ErrorKind::InvalidSchema(_))
    }
}
