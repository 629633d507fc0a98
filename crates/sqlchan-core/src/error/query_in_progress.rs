use super::Error;

/// Error when a read is started while the previous result stream is still
/// being drained.
#[derive(Debug)]
pub(super) struct QueryInProgress;

impl std::error::Error for QueryInProgress {}

impl core::fmt::Display for QueryInProgress {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        f.write_str("previous query is not finished, can not start new")
    }
}

impl Error {
    pub fn query_in_progress() -> Error {
        Error::from(super::ErrorKind::QueryInProgress(QueryInProgress))
    }

    pub fn is_query_in_progress(&self) -> bool {
        matches!(self.kind(), super::ErrorKind::QueryInProgress(_))
    }
}
