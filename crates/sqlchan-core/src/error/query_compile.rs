use super::Error;

/// Error when a query expression cannot be compiled against a message type.
#[derive(Debug)]
pub(super) struct QueryCompileError {
    message: Box<str>,
}

impl std::error::Error for QueryCompileError {}

impl core::fmt::Display for QueryCompileError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(f, "invalid query: {}", self.message)
    }
}

impl Error {
    /// Creates a query compile error. The query is reported to the caller and
    /// never executed.
    pub fn query_compile(message: impl Into<String>) -> Error {
        Error::from(super::ErrorKind::QueryCompile(QueryCompileError {
            message: message.into().into(),
        }))
    }

    /// Returns `true` if this error is a query compile error.
    pub fn is_query_compile(&self) -> bool {
        matches!(self.kind(), super::ErrorKind::QueryCompile(_))
    }
}
