use super::Error;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Error reported by the backend while executing a statement.
#[derive(Debug)]
pub(super) struct ExecutionError {
    pub(super) inner: BoxError,
}

impl std::error::Error for ExecutionError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.inner.source()
    }
}

impl core::fmt::Display for ExecutionError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        // Display the driver error and walk its source chain
        write!(f, "execution failed: {}", self.inner)?;
        let mut source = self.inner.source();
        while let Some(err) = source {
            write!(f, ": {}", err)?;
            source = err.source();
        }
        Ok(())
    }
}

impl Error {
    /// Creates an error from a backend rejecting a statement (constraint
    /// violation, type coercion failure, missing table, ...).
    ///
    /// The driver error text is preserved verbatim.
    pub fn execution(err: impl Into<BoxError>) -> Error {
        Error::from(super::ErrorKind::Execution(ExecutionError { inner: err.into() }))
    }

    /// Returns `true` if this error is an execution error.
    pub fn is_execution(&self) -> bool {
        matches!(self.kind(), super::ErrorKind::Execution(_))
    }
}
