use super::Error;

/// Error when the channel is asked to work while closed or failed.
#[derive(Debug)]
pub(super) struct ChannelStateError {
    state: &'static str,
}

impl std::error::Error for ChannelStateError {}

impl core::fmt::Display for ChannelStateError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(f, "channel is {}", self.state)
    }
}

impl Error {
    /// Creates an error for an operation attempted in the given channel state.
    pub fn channel_state(state: &'static str) -> Error {
        Error::from(super::ErrorKind::ChannelState(ChannelStateError { state }))
    }

    /// Returns `true` if this error reports an unusable channel state.
    pub fn is_channel_state(&self) -> bool {
        matches!(self.kind(), super::ErrorKind::ChannelState(_))
    }
}
