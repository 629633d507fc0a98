use super::Error;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Error from the driver or transport. Fatal to the channel.
#[derive(Debug)]
pub(super) struct ConnectionError {
    pub(super) inner: BoxError,
}

impl std::error::Error for ConnectionError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.inner.source()
    }
}

impl core::fmt::Display for ConnectionError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(f, "connection failed: {}", self.inner)?;
        let mut source = self.inner.source();
        while let Some(err) = source {
            write!(f, ": {}", err)?;
            source = err.source();
        }
        Ok(())
    }
}

impl Error {
    /// Creates a connection error.
    pub fn connection(err: impl Into<BoxError>) -> Error {
        Error::from(super::ErrorKind::Connection(ConnectionError { inner: err.into() }))
    }

    /// Returns `true` if this error is a connection error.
    pub fn is_connection(&self) -> bool {
        matches!(self.kind(), super::ErrorKind::Connection(_))
    }
}
