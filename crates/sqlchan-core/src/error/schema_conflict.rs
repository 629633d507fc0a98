use super::Error;

/// Error when the backend schema conflicts with the create mode, e.g. a table
/// already exists while the channel was asked to always create it.
#[derive(Debug)]
pub(super) struct SchemaConflictError {
    table: Box<str>,
    reason: Box<str>,
}

impl std::error::Error for SchemaConflictError {}

impl core::fmt::Display for SchemaConflictError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(f, "schema conflict on table `{}`: {}", self.table, self.reason)
    }
}

impl Error {
    /// Creates a schema conflict error.
    pub fn schema_conflict(table: impl Into<String>, reason: impl Into<String>) -> Error {
        Error::from(super::ErrorKind::SchemaConflict(SchemaConflictError {
            table: table.into().into(),
            reason: reason.into().into(),
        }))
    }

    /// Returns `true` if this error is a schema conflict error.
    pub fn is_schema_conflict(&self) -> bool {
        matches!(self.kind(), super::ErrorKind::SchemaConflict(_))
    }
}
