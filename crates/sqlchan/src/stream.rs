use crate::{marshal, message::Message, Result};

use sqlchan_core::{driver::Connection, Error, Schema};
use sqlchan_sql::Output;

/// The open read of a channel. Rows are pulled from the connection one per
/// `process` call.
#[derive(Debug)]
pub(crate) struct Stream {
    output: Output,
    done: bool,
}

impl Stream {
    pub(crate) fn new(output: Output) -> Stream {
        log::debug!("streaming rows as message {}", output.msgid);
        Stream { output, done: false }
    }

    /// Fetches and decodes the next row. `None` once the read is exhausted.
    ///
    /// A failed fetch or decode releases the read, so the next call ends it.
    pub(crate) fn next(
        &mut self,
        schema: &Schema,
        connection: &mut dyn Connection,
    ) -> Option<Result<Message>> {
        if self.done {
            return None;
        }

        let row = match connection.fetch() {
            Ok(Some(row)) => row,
            Ok(None) => {
                self.done = true;
                return None;
            }
            Err(err) => return Some(Err(self.release(connection, err))),
        };

        let result = schema
            .message(self.output.msgid)
            .ok_or_else(|| Error::unknown_message(self.output.msgid))
            .and_then(|message| marshal::extract(message, &self.output, row))
            .map(|(seq, data)| Message::data(self.output.msgid, seq, data));

        Some(result.map_err(|err| self.release(connection, err)))
    }

    fn release(&mut self, connection: &mut dyn Connection, err: Error) -> Error {
        log::warn!(
            "failed to read row of message {}, dropping the rest: {err}",
            self.output.msgid
        );

        self.done = true;

        if !err.is_connection() {
            if let Err(close) = connection.close_query() {
                log::warn!("failed to release read: {close}");
            }
        }

        err
    }
}
