use std::fmt;
use std::io;

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::headers::Headers;

/// Separates the start-line, each header line, and the body.
pub const CRLF: &str = "\r\n";

/// The only protocol version this server speaks.
pub const HTTP_VERSION: &str = "HTTP/1.1";

/// The parts every HTTP message shares: a start-line, header fields and a body.
///
/// [`Request`](crate::request::Request) and [`Response`](crate::response::Response)
/// each own one and add their own view of the start-line on top.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    version: String,
    start_line: String,
    headers: Headers,
    body: Vec<u8>,
}

impl Message {
    pub fn new() -> Self {
        Self {
            version: String::from(HTTP_VERSION),
            start_line: String::new(),
            headers: Headers::new(),
            body: Vec::new(),
        }
    }

    /// Reads one message line by line: the start-line, header lines up to the
    /// first empty line, then exactly `Content-Length` bytes of body.
    ///
    /// Returns `Ok(None)` if the stream ends before any byte of a start-line
    /// arrives, which is how a persistent connection ends normally.
    pub async fn read_from<R: AsyncBufRead + Unpin>(
        reader: &mut R,
    ) -> Result<Option<Self>, ParseError> {
        let start_line = match read_line(reader).await? {
            Some(line) => line,
            None => return Ok(None),
        };

        let mut message = Self::new();
        message.start_line = start_line;
        loop {
            let line = read_line(reader).await?.ok_or(ParseError::Incomplete)?;
            if line.is_empty() {
                break;
            }
            let (name, value) = split_header_line(&line)?;
            message.headers.set(name, value);
        }

        if let Some(len) = message.content_length() {
            let mut body = Vec::new();
            (&mut *reader).take(len as u64).read_to_end(&mut body).await?;
            if body.len() != len {
                return Err(ParseError::Incomplete);
            }
            message.body = body;
        }
        Ok(Some(message))
    }

    /// Parses a message that was read in one chunk. The header section must be
    /// complete, and so must the body if a `Content-Length` is declared.
    pub fn from_bytes(src: &[u8]) -> Result<Self, ParseError> {
        let head_end = src
            .windows(4)
            .position(|w| w == b"\r\n\r\n")
            .ok_or(ParseError::Incomplete)?;
        let head = std::str::from_utf8(&src[..head_end]).map_err(|_| ParseError::InvalidUtf8)?;

        let mut lines = head.split(CRLF);
        let mut message = Self::new();
        message.start_line = lines.next().unwrap_or_default().to_owned();
        for line in lines {
            let (name, value) = split_header_line(line)?;
            message.headers.set(name, value);
        }

        let rest = &src[head_end + 4..];
        if let Some(len) = message.content_length() {
            let body = rest.get(..len).ok_or(ParseError::Incomplete)?;
            message.body = body.to_vec();
        }
        Ok(message)
    }

    /// Wire form: start-line, CRLF, header lines, CRLF, body.
    pub fn to_bytes(&self) -> Vec<u8> {
        let headers = self.headers.to_bytes();
        let mut out = Vec::with_capacity(
            self.start_line.len() + headers.len() + self.body.len() + 2 * CRLF.len(),
        );
        out.extend_from_slice(self.start_line.as_bytes());
        out.extend_from_slice(CRLF.as_bytes());
        out.extend_from_slice(&headers);
        out.extend_from_slice(CRLF.as_bytes());
        out.extend_from_slice(&self.body);
        out
    }

    pub async fn write_to<W: AsyncWrite + Unpin>(&self, dest: &mut W) -> io::Result<()> {
        dest.write_all(&self.to_bytes()).await?;
        dest.flush().await
    }

    /// The declared body length, if the header is present and a valid
    /// non-negative integer.
    pub fn content_length(&self) -> Option<usize> {
        self.headers.get("Content-Length")?.trim().parse().ok()
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn set_version<V: Into<String>>(&mut self, version: V) {
        self.version = version.into();
    }

    pub fn start_line(&self) -> &str {
        &self.start_line
    }

    pub fn set_start_line<S: Into<String>>(&mut self, start_line: S) {
        self.start_line = start_line.into();
    }

    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    pub fn headers_mut(&mut self) -> &mut Headers {
        &mut self.headers
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    pub fn set_body<B: Into<Vec<u8>>>(&mut self, body: B) {
        self.body = body.into();
    }
}

impl Default for Message {
    fn default() -> Self {
        Self::new()
    }
}

/// Reads up to and including the next `\n`, returning the line without its
/// terminator. `None` means the stream was already at its end.
async fn read_line<R: AsyncBufRead + Unpin>(reader: &mut R) -> Result<Option<String>, ParseError> {
    let mut buf = Vec::new();
    if reader.read_until(b'\n', &mut buf).await? == 0 {
        return Ok(None);
    }
    if buf.pop() != Some(b'\n') {
        return Err(ParseError::Incomplete);
    }
    if buf.last() == Some(&b'\r') {
        buf.pop();
    }
    String::from_utf8(buf)
        .map(Some)
        .map_err(|_| ParseError::InvalidUtf8)
}

fn split_header_line(line: &str) -> Result<(&str, &str), ParseError> {
    match line.split_once(": ") {
        Some((name, value)) if !name.is_empty() => Ok((name, value.trim_end())),
        _ => Err(ParseError::MalformedHeader(line.to_owned())),
    }
}

#[derive(Debug)]
pub enum ParseError {
    MalformedStartLine(String),
    MalformedHeader(String),
    InvalidUtf8,
    /// The stream ended in the middle of a message.
    Incomplete,
    Io(io::Error),
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MalformedStartLine(line) => write!(f, "malformed start-line: {:?}", line),
            Self::MalformedHeader(line) => write!(f, "malformed header line: {:?}", line),
            Self::InvalidUtf8 => write!(f, "message head was not valid UTF-8"),
            Self::Incomplete => write!(f, "stream ended in the middle of a message"),
            Self::Io(e) => write!(f, "error reading message: {}", e),
        }
    }
}

impl std::error::Error for ParseError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for ParseError {
    fn from(e: io::Error) -> Self {
        if e.kind() == io::ErrorKind::UnexpectedEof {
            Self::Incomplete
        } else {
            Self::Io(e)
        }
    }
}
