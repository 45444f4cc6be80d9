use tokio::io::AsyncWrite;

use crate::headers::Headers;
use crate::message::Message;

/// A response under construction.
///
/// Starts out as `500 Internal Server Error` and is shaped by handlers through
/// the chaining `with_*` methods; the last call for a field wins.
#[derive(Debug, Clone)]
pub struct Response {
    message: Message,
    status: Status,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Status {
    Continue,
    SwitchingProtocols,
    OK,
    Created,
    Accepted,
    NoContent,
    MovedPermanently,
    Found,
    NotModified,
    BadRequest,
    Unauthorized,
    Forbidden,
    NotFound,
    MethodNotAllowed,
    PayloadTooLarge,
    InternalServerError,
    NotImplemented,
    ServiceUnavailable,
}

impl Response {
    pub fn new() -> Self {
        let mut response = Self {
            message: Message::new(),
            status: Status::InternalServerError,
        };
        response.with_status(Status::InternalServerError);
        response
    }

    /// Sets the status and rewrites the status-line to match.
    pub fn with_status(&mut self, status: Status) -> &mut Self {
        self.status = status;
        let line = format!("{} {}", self.message.version(), status.as_str());
        self.message.set_start_line(line);
        self
    }

    pub fn with_header<N: AsRef<str>, V: Into<String>>(&mut self, name: N, value: V) -> &mut Self {
        self.message.headers_mut().set(name, value);
        self
    }

    pub fn with_headers<I, N, V>(&mut self, headers: I) -> &mut Self
    where
        I: IntoIterator<Item = (N, V)>,
        N: AsRef<str>,
        V: Into<String>,
    {
        for (name, value) in headers {
            self.message.headers_mut().set(name, value);
        }
        self
    }

    pub fn with_body<B: Into<Vec<u8>>>(&mut self, body: B) -> &mut Self {
        self.message.set_body(body);
        self
    }

    pub fn as_text(&mut self) -> &mut Self {
        self.with_header("Content-Type", "text/plain")
    }

    pub fn as_octet_stream(&mut self) -> &mut Self {
        self.with_header("Content-Type", "application/octet-stream")
    }

    pub fn status(&self) -> Status {
        self.status
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

    /// Finishes the response: `Content-Length` always matches the body, and a
    /// missing `Content-Type` becomes `text/plain`.
    pub fn into_message(mut self) -> Message {
        let len = self.message.body().len();
        let headers = self.message.headers_mut();
        if !headers.contains("Content-Type") {
            headers.set("Content-Type", "text/plain");
        }
        headers.set("Content-Length", len.to_string());
        self.message
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.into_message().to_bytes()
    }

    pub async fn try_write_to<W: AsyncWrite + Unpin>(self, dest: &mut W) -> anyhow::Result<()> {
        self.into_message().write_to(dest).await?;
        Ok(())
    }
}

impl Default for Response {
    fn default() -> Self {
        Self::new()
    }
}

impl Status {
    pub fn code(self) -> u16 {
        match self {
            Self::Continue => 100,
            Self::SwitchingProtocols => 101,
            Self::OK => 200,
            Self::Created => 201,
            Self::Accepted => 202,
            Self::NoContent => 204,
            Self::MovedPermanently => 301,
            Self::Found => 302,
            Self::NotModified => 304,
            Self::BadRequest => 400,
            Self::Unauthorized => 401,
            Self::Forbidden => 403,
            Self::NotFound => 404,
            Self::MethodNotAllowed => 405,
            Self::PayloadTooLarge => 413,
            Self::InternalServerError => 500,
            Self::NotImplemented => 501,
            Self::ServiceUnavailable => 503,
        }
    }

    pub fn reason(self) -> &'static str {
        match self {
            Self::Continue => "Continue",
            Self::SwitchingProtocols => "Switching Protocols",
            Self::OK => "OK",
            Self::Created => "Created",
            Self::Accepted => "Accepted",
            Self::NoContent => "No Content",
            Self::MovedPermanently => "Moved Permanently",
            Self::Found => "Found",
            Self::NotModified => "Not Modified",
            Self::BadRequest => "Bad Request",
            Self::Unauthorized => "Unauthorized",
            Self::Forbidden => "Forbidden",
            Self::NotFound => "Not Found",
            Self::MethodNotAllowed => "Method Not Allowed",
            Self::PayloadTooLarge => "Payload Too Large",
            Self::InternalServerError => "Internal Server Error",
            Self::NotImplemented => "Not Implemented",
            Self::ServiceUnavailable => "Service Unavailable",
        }
    }

    /// Code and reason phrase, e.g. `404 Not Found`.
    pub fn as_str(self) -> String {
        format!("{} {}", self.code(), self.reason())
    }
}

#[cfg(test)]
mod tests {
    use std::error::Error;

    use tokio::io::BufReader;

    use super::*;

    #[test]
    fn test_with_status() {
        let cases = [
            (Status::OK, "HTTP/1.1 200 OK"),
            (Status::Created, "HTTP/1.1 201 Created"),
            (Status::NotFound, "HTTP/1.1 404 Not Found"),
            (Status::MethodNotAllowed, "HTTP/1.1 405 Method Not Allowed"),
            (Status::InternalServerError, "HTTP/1.1 500 Internal Server Error"),
        ];
        for (status, expected) in cases {
            let mut response = Response::new();
            response.with_status(status);
            assert_eq!(response.start_line(), expected);
            assert_eq!(response.status(), status);
        }
    }

    #[test]
    fn test_defaults_to_internal_error() {
        let response = Response::new();
        assert_eq!(response.status(), Status::InternalServerError);
        assert_eq!(response.start_line(), "HTTP/1.1 500 Internal Server Error");
    }

    #[test]
    fn test_last_call_wins() {
        let mut response = Response::new();
        response
            .with_status(Status::NotFound)
            .with_headers([("Content-Type", "application/json"), ("X-Trace", "1")])
            .with_body("first")
            .with_status(Status::OK)
            .as_text()
            .with_body("second");
        assert_eq!(response.status(), Status::OK);
        assert_eq!(response.headers().get("content-type"), Some("text/plain"));
        assert_eq!(response.headers().len(), 2);
        assert_eq!(response.body(), b"second");
    }

    #[test]
    fn test_into_bytes_fills_in_framing_headers() {
        let mut response = Response::new();
        response.with_status(Status::OK);
        assert_eq!(
            response.into_bytes(),
            b"HTTP/1.1 200 OK\r\nContent-Type: text/plain\r\nContent-Length: 0\r\n\r\n".to_vec()
        );
    }

    #[test]
    fn test_into_bytes_corrects_content_length() {
        let mut response = Response::new();
        response
            .with_status(Status::OK)
            .as_octet_stream()
            .with_header("Content-Length", "99")
            .with_body("abc");
        assert_eq!(
            response.into_bytes(),
            b"HTTP/1.1 200 OK\r\nContent-Type: application/octet-stream\r\nContent-Length: 3\r\n\r\nabc"
                .to_vec()
        );
    }

    #[tokio::test]
    async fn test_write_then_parse() -> Result<(), Box<dyn Error>> {
        let mut response = Response::new();
        response
            .with_status(Status::OK)
            .with_header("Content-Encoding", "identity")
            .with_body("hello world");
        let expected = response.clone().into_message();

        let mut buffer = Vec::new();
        response.try_write_to(&mut buffer).await?;
        let parsed = Message::read_from(&mut BufReader::new(&buffer[..]))
            .await?
            .ok_or("expected a message")?;
        assert_eq!(parsed, expected);
        assert_eq!(parsed.body(), b"hello world");
        Ok(())
    }
}
