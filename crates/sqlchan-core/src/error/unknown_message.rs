use super::Error;

#[derive(Debug)]
pub(super) struct UnknownMessage {
    msgid: i32,
}

impl std::error::Error for UnknownMessage {}

impl core::fmt::Display for UnknownMessage {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(f, "message {} not found in schema", self.msgid)
    }
}

impl Error {
    /// Creates an error for a message id the schema does not declare.
    pub fn unknown_message(msgid: i32) -> Error {
        Error::from(super::ErrorKind::UnknownMessage(UnknownMessage { msgid }))
    }

    /// Returns `true` if this error is an unknown message error.
    pub fn is_unknown_message(&self) -> bool {
        matches!(self.kind(), super::ErrorKind::UnknownMessage(_))
    }
}
