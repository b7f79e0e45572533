use bytes::BytesMut;

use super::{Chunks, ChunksError};

const DATA_PREFIX: &[u8] = b"data:";

#[derive(Debug, PartialEq, Eq)]
pub enum Error {
    ChunksError(ChunksError),
    /// A data line that is not valid UTF-8. The line has been consumed,
    /// reading can continue.
    InvalidUtf8(String),
}

/// A type for reading `data:` payloads from a line-framed chunk stream.
///
/// Each line carries at most one payload. Lines may be split across
/// chunks, so bytes are buffered until a line feed arrives.
pub struct DataLines {
    buf: BytesMut,
    chunks: Chunks,
    eof: bool,
}

impl DataLines {
    #[inline]
    pub fn new(chunks: Chunks) -> Self {
        Self {
            buf: BytesMut::new(),
            chunks,
            eof: false,
        }
    }

    pub async fn next_data(&mut self) -> Result<Option<String>, Error> {
        loop {
            // Drain complete lines before pulling more data.
            while let Some(line) = self.take_line() {
                if let Some(data) = parse_line(&line)? {
                    return Ok(Some(data));
                }
            }

            if self.eof {
                // The body may end without a trailing line feed.
                if self.buf.is_empty() {
                    return Ok(None);
                }
                let line = self.buf.split();
                return parse_line(trim_cr(&line));
            }

            match self.chunks.next_chunk().await.map_err(Error::ChunksError)? {
                Some(bytes) => self.buf.extend_from_slice(&bytes),
                None => self.eof = true,
            }
        }
    }

    fn take_line(&mut self) -> Option<BytesMut> {
        let eol_idx = self.buf.iter().position(|b| *b == b'\n')?;
        let mut line = self.buf.split_to(eol_idx + 1);
        let len = trim_cr(&line[..eol_idx]).len();
        line.truncate(len);
        Some(line)
    }
}

#[inline]
fn trim_cr(line: &[u8]) -> &[u8] {
    line.strip_suffix(b"\r").unwrap_or(line)
}

// field = "data" colon [ space ] *any-char
fn parse_line(line: &[u8]) -> Result<Option<String>, Error> {
    let Some(value) = line.strip_prefix(DATA_PREFIX) else {
        // Blank lines, comments and other fields carry no payload.
        return Ok(None);
    };
    let value = value.strip_prefix(b" ").unwrap_or(value);
    match std::str::from_utf8(value) {
        Ok(data) => Ok(Some(data.to_owned())),
        Err(_) => Err(Error::InvalidUtf8(
            String::from_utf8_lossy(value).into_owned(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use bytes::Bytes;

    use super::*;

    fn data_lines(chunks: &[&'static [u8]]) -> DataLines {
        let chunks = chunks
            .iter()
            .copied()
            .map(Bytes::from_static)
            .collect::<Vec<_>>();
        DataLines::new(Chunks::from_vec_deque(chunks.into()))
    }

    #[tokio::test]
    async fn test_normal_lines() {
        let mut lines = data_lines(&[b"data: hello\n\n", b"data: bye\n\n"]);
        assert_eq!(lines.next_data().await.unwrap().unwrap(), "hello");
        assert_eq!(lines.next_data().await.unwrap().unwrap(), "bye");
        assert_eq!(lines.next_data().await.unwrap(), None);
        assert_eq!(lines.next_data().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_multiple_lines_in_one_chunk() {
        let mut lines =
            data_lines(&[b"data:{\"content\":\"a\"}\ndata:[DONE]\n"]);
        assert_eq!(
            lines.next_data().await.unwrap().unwrap(),
            "{\"content\":\"a\"}"
        );
        assert_eq!(lines.next_data().await.unwrap().unwrap(), "[DONE]");
        assert_eq!(lines.next_data().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_quirk_streaming() {
        let mut lines = data_lines(&[b"da", b"ta:", b" hel", b"lo\r", b"\n"]);
        assert_eq!(lines.next_data().await.unwrap().unwrap(), "hello");
        assert_eq!(lines.next_data().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_only_one_space_is_stripped() {
        let mut lines = data_lines(&[b"data:  padded\n"]);
        assert_eq!(lines.next_data().await.unwrap().unwrap(), " padded");
    }

    #[tokio::test]
    async fn test_trailing_line_without_line_feed() {
        let mut lines = data_lines(&[b"data: one\n", b"data: two"]);
        assert_eq!(lines.next_data().await.unwrap().unwrap(), "one");
        assert_eq!(lines.next_data().await.unwrap().unwrap(), "two");
        assert_eq!(lines.next_data().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_other_lines_are_skipped() {
        let mut lines = data_lines(&[
            b": keep-alive\n",
            b"event: message\n",
            b"xxxxxx\n\n",
            b"data: payload\n",
            b"id: 7",
        ]);
        assert_eq!(lines.next_data().await.unwrap().unwrap(), "payload");
        assert_eq!(lines.next_data().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_invalid_utf8_is_recoverable() {
        let mut lines = data_lines(&[b"data: \xff\xfe\n", b"data: ok\n"]);
        assert!(matches!(
            lines.next_data().await,
            Err(Error::InvalidUtf8(_))
        ));
        assert_eq!(lines.next_data().await.unwrap().unwrap(), "ok");
    }

    #[tokio::test]
    async fn test_utf8_split_across_chunks() {
        // "é" is 0xC3 0xA9.
        let mut lines = data_lines(&[b"data: caf\xc3", b"\xa9\n"]);
        assert_eq!(lines.next_data().await.unwrap().unwrap(), "café");
    }

    #[tokio::test]
    async fn test_chunk_error() {
        let chunks = Chunks::from_results(
            vec![
                Ok(Bytes::from_static(b"data: partial")),
                Err(ChunksError("connection reset".to_owned())),
            ]
            .into(),
        );
        let mut lines = DataLines::new(chunks);
        assert_eq!(
            lines.next_data().await.unwrap_err(),
            Error::ChunksError(ChunksError("connection reset".to_owned()))
        );
    }
}
