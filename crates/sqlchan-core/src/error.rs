mod adhoc;
mod channel_state;
mod connection;
mod execution;
mod invalid_config;
mod invalid_schema;
mod marshal;
mod query_compile;
mod query_in_progress;
mod schema_conflict;
mod unknown_message;
mod unsupported_feature;

use adhoc::AdhocError;
use channel_state::ChannelStateError;
use connection::ConnectionError;
use execution::ExecutionError;
use invalid_config::InvalidConfig;
use invalid_schema::InvalidSchema;
use marshal::MarshalError;
use query_compile::QueryCompileError;
use query_in_progress::QueryInProgress;
use schema_conflict::SchemaConflictError;
use std::sync::Arc;
use unknown_message::UnknownMessage;
use unsupported_feature::UnsupportedFeature;

/// Return early with an ad-hoc error built from format arguments.
#[macro_export]
macro_rules! bail {
    ($($arg:tt)*) => {
        return Err($crate::Error::from_args(format_args!($($arg)*)))
    };
}

/// Build an ad-hoc error from format arguments.
#[macro_export]
macro_rules! err {
    ($($arg:tt)*) => {
        $crate::Error::from_args(format_args!($($arg)*))
    };
}

/// An error that can occur while compiling, binding or executing statements.
///
/// The error is one word wide. Its kind tells the caller how far the failure
/// reaches:
///
/// * marshal and query-compile errors abort the current message only;
/// * execution errors abort the current statement only;
/// * schema-conflict, invalid-schema and invalid-config errors fail `open`;
/// * connection errors are fatal to the channel.
#[derive(Clone)]
pub struct Error {
    inner: Option<Arc<ErrorInner>>,
}

#[derive(Debug)]
struct ErrorInner {
    kind: ErrorKind,
    cause: Option<Error>,
}

impl Error {
    /// Adds context to this error.
    ///
    /// Context is displayed in reverse order: the most recently added context is shown first,
    /// followed by earlier context, ending with the root cause.
    #[inline(always)]
    pub fn context(self, consequent: impl IntoError) -> Error {
        self.context_impl(consequent.into_error())
    }

    #[inline(never)]
    #[cold]
    fn context_impl(self, consequent: Error) -> Error {
        let mut err = consequent;
        if err.inner.is_none() {
            err = Error::from(ErrorKind::Unknown);
        }
        match err.inner.as_mut().and_then(Arc::get_mut) {
            Some(inner) if inner.cause.is_none() => {
                inner.cause = Some(self);
                err
            }
            // The consequent is shared or already chained; keep the root
            // cause rather than dropping it.
            _ => self,
        }
    }

    fn chain(&self) -> impl Iterator<Item = &Error> {
        let mut err = self;
        core::iter::once(err).chain(core::iter::from_fn(move || {
            err = err.inner.as_ref().and_then(|inner| inner.cause.as_ref())?;
            Some(err)
        }))
    }

    /// Returns the kind of the first error in the chain that is not ad-hoc
    /// context.
    fn kind(&self) -> &ErrorKind {
        self.chain()
            .map(Error::own_kind)
            .find(|kind| !matches!(kind, ErrorKind::Adhoc(_) | ErrorKind::Unknown))
            .unwrap_or_else(|| self.own_kind())
    }

    fn own_kind(&self) -> &ErrorKind {
        self.inner
            .as_ref()
            .map(|inner| &inner.kind)
            .unwrap_or(&ErrorKind::Unknown)
    }

    /// Returns `true` if the channel can keep serving after this error.
    pub fn is_recoverable(&self) -> bool {
        !self.is_connection()
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self.own_kind() {
            ErrorKind::Execution(err) => Some(err),
            ErrorKind::Connection(err) => Some(err),
            _ => self
                .inner
                .as_ref()
                .and_then(|inner| inner.cause.as_ref())
                .map(|cause| cause as &(dyn std::error::Error + 'static)),
        }
    }
}

impl core::fmt::Display for Error {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        let mut it = self.chain().peekable();
        while let Some(err) = it.next() {
            core::fmt::Display::fmt(err.own_kind(), f)?;
            if it.peek().is_some() {
                f.write_str(": ")?;
            }
        }
        Ok(())
    }
}

impl core::fmt::Debug for Error {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        if !f.alternate() {
            core::fmt::Display::fmt(self, f)
        } else {
            let Some(ref inner) = self.inner else {
                return f.debug_struct("Error").field("kind", &"None").finish();
            };
            f.debug_struct("Error")
                .field("kind", &inner.kind)
                .field("cause", &inner.cause)
                .finish()
        }
    }
}

#[derive(Debug)]
enum ErrorKind {
    Adhoc(AdhocError),
    Marshal(MarshalError),
    QueryCompile(QueryCompileError),
    SchemaConflict(SchemaConflictError),
    Execution(ExecutionError),
    Connection(ConnectionError),
    InvalidSchema(InvalidSchema),
    InvalidConfig(InvalidConfig),
    UnsupportedFeature(UnsupportedFeature),
    UnknownMessage(UnknownMessage),
    QueryInProgress(QueryInProgress),
    ChannelState(ChannelStateError),
    Unknown,
}

impl core::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        use self::ErrorKind::*;

        match self {
            Adhoc(err) => core::fmt::Display::fmt(err, f),
            Marshal(err) => core::fmt::Display::fmt(err, f),
            QueryCompile(err) => core::fmt::Display::fmt(err, f),
            SchemaConflict(err) => core::fmt::Display::fmt(err, f),
            Execution(err) => core::fmt::Display::fmt(err, f),
            Connection(err) => core::fmt::Display::fmt(err, f),
            InvalidSchema(err) => core::fmt::Display::fmt(err, f),
            InvalidConfig(err) => core::fmt::Display::fmt(err, f),
            UnsupportedFeature(err) => core::fmt::Display::fmt(err, f),
            UnknownMessage(err) => core::fmt::Display::fmt(err, f),
            QueryInProgress(err) => core::fmt::Display::fmt(err, f),
            ChannelState(err) => core::fmt::Display::fmt(err, f),
            Unknown => f.write_str("unknown sqlchan error"),
        }
    }
}

impl From<ErrorKind> for Error {
    fn from(kind: ErrorKind) -> Error {
        Error {
            inner: Some(Arc::new(ErrorInner { kind, cause: None })),
        }
    }
}

/// Trait for types that can be converted into an Error.
pub trait IntoError {
    /// Converts this type into an Error.
    fn into_error(self) -> Error;
}

impl IntoError for Error {
    #[inline(always)]
    fn into_error(self) -> Error {
        self
    }
}

impl IntoError for &str {
    fn into_error(self) -> Error {
        Error::from_args(format_args!("{self}"))
    }
}

impl IntoError for String {
    fn into_error(self) -> Error {
        Error::from_args(format_args!("{self}"))
    }
}
