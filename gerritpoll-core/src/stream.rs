//! Incremental parser for the Gerrit query response stream
//!
//! A query response is a sequence of whitespace/newline-separated JSON
//! objects with no array wrapper: zero or more data rows followed by one
//! stats object (`{"type":"stats","rowCount":N,...}`). The stream decodes
//! one value at a time from an incrementally-filled buffer and stops at the
//! stats sentinel without ever touching bytes past it.

use serde_json::Value;
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncReadExt};

use crate::models::{GerritPatchSet, PatchSetRow};

/// Field that marks the terminal stats record of a query response.
const STATS_FIELD: &str = "rowCount";

const READ_CHUNK_SIZE: usize = 8192;

/// Errors raised while reading the query response stream.
#[derive(Debug, Error)]
pub enum StreamError {
    /// Reading from the session stream failed.
    #[error("i/o error reading query response: {0}")]
    Io(#[from] std::io::Error),

    /// The stream contained bytes that are not valid JSON.
    #[error("invalid JSON in query response: {source}")]
    InvalidJson {
        /// Underlying decode error
        source: serde_json::Error,
    },

    /// A data row was missing a required field or carried an empty value.
    #[error("malformed patch set record: {0}")]
    MalformedRecord(String),

    /// The stream ended in the middle of a JSON value.
    #[error("query response ended mid-record")]
    TruncatedStream,
}

/// Result type for stream operations.
pub type StreamResult<T> = Result<T, StreamError>;

/// Lazy, finite, non-restartable sequence of patch sets decoded from a
/// query response stream.
///
/// The sequence ends successfully at the stats record or at a clean end of
/// input; any malformed record fails the whole stream.
#[derive(Debug)]
pub struct RecordStream<R> {
    reader: R,
    buf: Vec<u8>,
    pos: usize,
    eof: bool,
    finished: bool,
}

impl<R: AsyncRead + Unpin> RecordStream<R> {
    /// Wraps a response stream.
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            buf: Vec::new(),
            pos: 0,
            eof: false,
            finished: false,
        }
    }

    /// Decodes the next patch set, or `None` once the sequence has ended.
    ///
    /// # Errors
    ///
    /// Returns a [`StreamError`] on I/O failure, invalid JSON, a malformed
    /// data row, or a stream truncated mid-value. After an error the stream
    /// is in an unspecified position and must not be used further.
    pub async fn next_patch_set(&mut self) -> StreamResult<Option<GerritPatchSet>> {
        if self.finished {
            return Ok(None);
        }

        loop {
            if let Some(value) = self.decode_buffered()? {
                if value.get(STATS_FIELD).is_some() {
                    // Terminal stats record: discard it, end the sequence.
                    self.finished = true;
                    return Ok(None);
                }

                let row: PatchSetRow = serde_json::from_value(value)
                    .map_err(|e| StreamError::MalformedRecord(e.to_string()))?;
                let patch_set =
                    GerritPatchSet::try_from(row).map_err(StreamError::MalformedRecord)?;
                return Ok(Some(patch_set));
            }

            if self.eof {
                if self.rest_is_whitespace() {
                    self.finished = true;
                    return Ok(None);
                }
                return Err(StreamError::TruncatedStream);
            }

            self.fill_buffer().await?;
        }
    }

    /// Tries to decode one JSON value from the buffered bytes.
    ///
    /// `None` means more input is needed: the buffer holds only whitespace
    /// or a value prefix.
    fn decode_buffered(&mut self) -> StreamResult<Option<Value>> {
        let mut values =
            serde_json::Deserializer::from_slice(&self.buf[self.pos..]).into_iter::<Value>();

        match values.next() {
            Some(Ok(value)) => {
                self.pos += values.byte_offset();
                Ok(Some(value))
            }
            Some(Err(e)) if e.is_eof() => Ok(None),
            Some(Err(e)) => Err(StreamError::InvalidJson { source: e }),
            None => Ok(None),
        }
    }

    fn rest_is_whitespace(&self) -> bool {
        self.buf[self.pos..].iter().all(u8::is_ascii_whitespace)
    }

    async fn fill_buffer(&mut self) -> StreamResult<()> {
        // Drop the consumed prefix before growing the buffer again.
        if self.pos > 0 {
            self.buf.drain(..self.pos);
            self.pos = 0;
        }

        let mut chunk = [0u8; READ_CHUNK_SIZE];
        let n = self.reader.read(&mut chunk).await?;
        if n == 0 {
            self.eof = true;
        } else {
            self.buf.extend_from_slice(&chunk[..n]);
        }
        Ok(())
    }
}
