//! Newline-delimited JSON framing.
//!
//! The transport only frames. It does not interpret the decoded values.

use crate::error::TransportError;
use serde::Serialize;
use serde_json::Value;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{trace, warn};

/// Reads one JSON value per line.
///
/// Blank lines are skipped. Lines that fail to decode, including lines that
/// are not UTF-8, are logged and skipped.
pub struct LineReader<R> {
    reader: R,
    buf: Vec<u8>,
    closed: bool,
}

impl<R: AsyncBufRead + Unpin> LineReader<R> {
    pub const fn new(reader: R) -> Self {
        Self {
            reader,
            buf: Vec::new(),
            closed: false,
        }
    }

    /// Next decoded value, or `None` at end of input or after [`close`](Self::close).
    ///
    /// Cancel safe: a partially read line stays buffered for the next call.
    pub async fn recv(&mut self) -> Result<Option<Value>, TransportError> {
        loop {
            if self.closed {
                return Ok(None);
            }
            let read = self.reader.read_until(b'\n', &mut self.buf).await?;
            if read == 0 && self.buf.is_empty() {
                self.closed = true;
                return Ok(None);
            }

            let line = std::mem::take(&mut self.buf);
            let line = line.trim_ascii();
            if line.is_empty() {
                continue;
            }

            match serde_json::from_slice::<Value>(line) {
                Ok(value) => {
                    trace!(bytes = line.len(), "Received message");
                    return Ok(Some(value));
                }
                Err(e) => warn!(error = %e, bytes = line.len(), "Discarding malformed message"),
            }
        }
    }

    /// Stop yielding values. Unread input is ignored.
    pub fn close(&mut self) {
        self.closed = true;
    }

    pub const fn is_closed(&self) -> bool {
        self.closed
    }
}

/// Writes one JSON value per line, flushing after each.
pub struct LineWriter<W> {
    writer: W,
    closed: bool,
}

impl<W: AsyncWrite + Unpin> LineWriter<W> {
    pub const fn new(writer: W) -> Self {
        Self {
            writer,
            closed: false,
        }
    }

    /// Encode `message` on a single line and flush it.
    pub async fn send<T: Serialize + ?Sized>(&mut self, message: &T) -> Result<(), TransportError> {
        if self.closed {
            return Err(TransportError::Closed);
        }
        // serde_json escapes control characters, so the encoding holds no raw newline
        let mut line = serde_json::to_vec(message)?;
        line.push(b'\n');

        self.writer.write_all(&line).await?;
        self.writer.flush().await?;
        Ok(())
    }

    /// Flush and shut down the stream. Lines already written stay written.
    pub async fn close(&mut self) -> Result<(), TransportError> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        self.writer.flush().await?;
        self.writer.shutdown().await?;
        Ok(())
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_reader_skips_blank_and_malformed_lines() {
        let input = "\n{\"kind\":\"enumerate-tools\"}\n   \nnot json\n{\"id\":2}\n";
        let mut reader = LineReader::new(input.as_bytes());

        assert_eq!(
            reader.recv().await.unwrap(),
            Some(json!({ "kind": "enumerate-tools" }))
        );
        assert_eq!(reader.recv().await.unwrap(), Some(json!({ "id": 2 })));
        assert_eq!(reader.recv().await.unwrap(), None);
        assert!(reader.is_closed());
    }

    #[tokio::test]
    async fn test_reader_skips_invalid_utf8() {
        let mut input = b"{\"id\":1}\n".to_vec();
        input.extend_from_slice(b"\xff\xfe garbage\n");
        input.extend_from_slice(b"{\"id\":2}");
        let mut reader = LineReader::new(input.as_slice());

        assert_eq!(reader.recv().await.unwrap(), Some(json!({ "id": 1 })));
        assert_eq!(reader.recv().await.unwrap(), Some(json!({ "id": 2 })));
        assert_eq!(reader.recv().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_reader_handles_split_reads() {
        let mock = tokio_test::io::Builder::new()
            .read(b"{\"id\":")
            .read(b"1}\n{\"id\"")
            .read(b":2}\n")
            .build();
        let mut reader = LineReader::new(tokio::io::BufReader::new(mock));

        assert_eq!(reader.recv().await.unwrap(), Some(json!({ "id": 1 })));
        assert_eq!(reader.recv().await.unwrap(), Some(json!({ "id": 2 })));
        assert_eq!(reader.recv().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_reader_close_stops_processing() {
        let mut reader = LineReader::new("{\"id\":1}\n{\"id\":2}\n".as_bytes());
        assert!(reader.recv().await.unwrap().is_some());
        reader.close();
        assert_eq!(reader.recv().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_writer_emits_single_lines() {
        let mut writer = LineWriter::new(Vec::new());
        writer.send(&json!({ "text": "a\nb" })).await.unwrap();
        writer.send(&json!({ "n": 1 })).await.unwrap();
        writer.close().await.unwrap();

        let output = String::from_utf8(writer.into_inner()).unwrap();
        let lines: Vec<_> = output.lines().collect();
        assert_eq!(lines, vec![r#"{"text":"a\nb"}"#, r#"{"n":1}"#]);
    }

    #[tokio::test]
    async fn test_writer_rejects_after_close() {
        let mut writer = LineWriter::new(Vec::new());
        writer.close().await.unwrap();
        assert!(matches!(
            writer.send(&json!({})).await,
            Err(TransportError::Closed)
        ));
    }
}
