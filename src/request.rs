use std::fmt;

use tokio::io::{AsyncBufRead, AsyncRead, AsyncReadExt};

use crate::headers::Headers;
use crate::message::{Message, ParseError, HTTP_VERSION};

/// How many bytes [`Request::try_parse_bulk`] reads in its single read.
pub const BULK_READ_SIZE: usize = 1024;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    message: Message,
    method: Method,
    path: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Method {
    Get,
    Head,
    Post,
    Put,
    Patch,
    Delete,
    Options,
    Extension(String),
}

impl Request {
    pub fn new<P: Into<String>>(method: Method, path: P) -> Self {
        let path = path.into();
        let mut message = Message::new();
        message.set_start_line(format!("{} {} {}", method, path, HTTP_VERSION));
        Self {
            message,
            method,
            path,
        }
    }

    /// Reads the next request off a persistent connection, line by line.
    ///
    /// `Ok(None)` means the peer closed the stream between requests.
    pub async fn try_parse_from<R: AsyncBufRead + Unpin>(
        src: &mut R,
    ) -> Result<Option<Self>, ParseError> {
        match Message::read_from(src).await? {
            Some(message) => Self::from_message(message).map(Some),
            None => Ok(None),
        }
    }

    /// Reads at most [`BULK_READ_SIZE`] bytes in one go and parses them as a
    /// whole request. Anything past the declared body is dropped, so this is
    /// only usable when the connection carries a single request.
    pub async fn try_parse_bulk<R: AsyncRead + Unpin>(
        src: &mut R,
    ) -> Result<Option<Self>, ParseError> {
        let mut buf = vec![0; BULK_READ_SIZE];
        let n = src.read(&mut buf).await?;
        if n == 0 {
            return Ok(None);
        }
        Self::from_bytes(&buf[..n]).map(Some)
    }

    pub fn from_bytes(src: &[u8]) -> Result<Self, ParseError> {
        Self::from_message(Message::from_bytes(src)?)
    }

    /// Interprets the start-line as `METHOD SP PATH SP VERSION`.
    pub fn from_message(mut message: Message) -> Result<Self, ParseError> {
        let fields = message.start_line().split_whitespace().collect::<Vec<_>>();
        let (method, path, version) = match fields[..] {
            [method, path, version] => (Method::from(method), path.to_owned(), version.to_owned()),
            _ => {
                return Err(ParseError::MalformedStartLine(
                    message.start_line().to_owned(),
                ))
            }
        };
        message.set_version(version);
        Ok(Self {
            message,
            method,
            path,
        })
    }

    pub fn with_header<N: AsRef<str>, V: Into<String>>(&mut self, name: N, value: V) -> &mut Self {
        self.message.headers_mut().set(name, value);
        self
    }

    pub fn with_body<B: Into<Vec<u8>>>(&mut self, body: B) -> &mut Self {
        self.message.set_body(body);
        self
    }

    /// True if a `Connection` header lists the `close` token, in any casing.
    pub fn wants_close(&self) -> bool {
        self.headers()
            .get("Connection")
            .map(|v| v.split(',').any(|token| token.trim().eq_ignore_ascii_case("close")))
            .unwrap_or(false)
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn version(&self) -> &str {
        self.message.version()
    }

    pub fn start_line(&self) -> &str {
        self.message.start_line()
    }

    pub fn headers(&self) -> &Headers {
        self.message.headers()
    }

    pub fn body(&self) -> &[u8] {
        self.message.body()
    }

    pub fn message(&self) -> &Message {
        &self.message
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        self.message.to_bytes()
    }
}

impl From<&str> for Method {
    fn from(token: &str) -> Self {
        match token {
            "GET" => Self::Get,
            "HEAD" => Self::Head,
            "POST" => Self::Post,
            "PUT" => Self::Put,
            "PATCH" => Self::Patch,
            "DELETE" => Self::Delete,
            "OPTIONS" => Self::Options,
            other => Self::Extension(other.to_owned()),
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        match self {
            Self::Get => write!(f, "GET"),
            Self::Head => write!(f, "HEAD"),
            Self::Post => write!(f, "POST"),
            Self::Put => write!(f, "PUT"),
            Self::Patch => write!(f, "PATCH"),
            Self::Delete => write!(f, "DELETE"),
            Self::Options => write!(f, "OPTIONS"),
            Self::Extension(token) => write!(f, "{}", token),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::error::Error;

    use tokio::io::BufReader;

    use super::*;

    #[test]
    fn test_parse_request_line() -> Result<(), Box<dyn Error>> {
        let cases = [
            ("GET / HTTP/1.1", Method::Get, "/", "HTTP/1.1"),
            ("POST /api/v1/users HTTP/1.1", Method::Post, "/api/v1/users", "HTTP/1.1"),
            (
                "PATCH /api/v1/users/1 HTTP/1.0",
                Method::Patch,
                "/api/v1/users/1",
                "HTTP/1.0",
            ),
            (
                "PURGE /cache HTTP/1.1",
                Method::Extension(String::from("PURGE")),
                "/cache",
                "HTTP/1.1",
            ),
        ];
        for (start_line, method, path, version) in cases {
            let raw = format!("{}\r\n\r\n", start_line);
            let req = Request::from_bytes(raw.as_bytes())?;
            assert_eq!(req.method(), &method);
            assert_eq!(req.path(), path);
            assert_eq!(req.version(), version);
            assert_eq!(req.start_line(), start_line);
        }
        Ok(())
    }

    #[test]
    fn test_missing_version_is_malformed() {
        for start_line in ["GET /", "GET", "GET / HTTP/1.1 extra"] {
            let raw = format!("{}\r\n\r\n", start_line);
            assert!(
                matches!(
                    Request::from_bytes(raw.as_bytes()),
                    Err(ParseError::MalformedStartLine(_))
                ),
                "{}",
                start_line
            );
        }
    }

    #[tokio::test]
    async fn test_parse_incremental() -> Result<(), Box<dyn Error>> {
        let data = b"POST /files/new.txt HTTP/1.1\r\nHost: localhost:4221\r\nContent-Length: 5\r\n\r\nhello";
        let req = Request::try_parse_from(&mut BufReader::new(&data[..]))
            .await?
            .ok_or("expected a request")?;
        assert_eq!(req.method(), &Method::Post);
        assert_eq!(req.path(), "/files/new.txt");
        assert_eq!(req.headers().get("HOST"), Some("localhost:4221"));
        assert_eq!(req.body(), b"hello");
        Ok(())
    }

    #[tokio::test]
    async fn test_bulk_and_incremental_agree() -> Result<(), Box<dyn Error>> {
        let data = b"GET /user-agent HTTP/1.1\r\nUser-Agent: test-client/1.0\r\nAccept: */*\r\n\r\n";
        let incremental = Request::try_parse_from(&mut BufReader::new(&data[..]))
            .await?
            .ok_or("expected a request")?;
        let bulk = Request::try_parse_bulk(&mut &data[..])
            .await?
            .ok_or("expected a request")?;
        assert_eq!(incremental, bulk);
        Ok(())
    }

    #[tokio::test]
    async fn test_end_of_stream_is_not_an_error() -> Result<(), Box<dyn Error>> {
        let data: &[u8] = b"";
        assert!(Request::try_parse_from(&mut BufReader::new(data)).await?.is_none());
        assert!(Request::try_parse_bulk(&mut &data[..]).await?.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn test_serialize_then_parse() -> Result<(), Box<dyn Error>> {
        let mut req = Request::new(Method::Post, "/files/report.bin");
        req.with_header("Content-Type", "application/octet-stream")
            .with_header("Content-Length", "3")
            .with_body(vec![1, 2, 3]);
        let bytes = req.to_bytes();
        let parsed = Request::try_parse_from(&mut BufReader::new(&bytes[..]))
            .await?
            .ok_or("expected a request")?;
        assert_eq!(parsed, req);
        Ok(())
    }

    #[test]
    fn test_wants_close() -> Result<(), Box<dyn Error>> {
        let close = Request::from_bytes(b"GET / HTTP/1.1\r\nConnection: Close\r\n\r\n")?;
        assert!(close.wants_close());
        let listed = Request::from_bytes(b"GET / HTTP/1.1\r\nconnection: TE, close\r\n\r\n")?;
        assert!(listed.wants_close());
        let keep = Request::from_bytes(b"GET / HTTP/1.1\r\nConnection: keep-alive\r\n\r\n")?;
        assert!(!keep.wants_close());
        let absent = Request::from_bytes(b"GET / HTTP/1.1\r\n\r\n")?;
        assert!(!absent.wants_close());
        Ok(())
    }
}
