use crate::http::headers::Headers;
use crate::http::request::DEFAULT_VERSION;

/// An HTTP status code.
///
/// Any integer decoded from a status line is representable; only the codes in
/// the reason table get a dedicated phrase.
///
/// # Example
///
/// ```
/// # use jailhttp::http::response::StatusCode;
/// assert_eq!(StatusCode::NOT_FOUND.as_u16(), 404);
/// assert_eq!(StatusCode::NOT_FOUND.reason_phrase(), "Not Found");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StatusCode(u16);

impl StatusCode {
    /// 200 OK
    pub const OK: StatusCode = StatusCode(200);
    /// 400 Bad Request
    pub const BAD_REQUEST: StatusCode = StatusCode(400);
    /// 403 Forbidden
    pub const FORBIDDEN: StatusCode = StatusCode(403);
    /// 404 Not Found
    pub const NOT_FOUND: StatusCode = StatusCode(404);
    /// 500 Internal Server Error
    pub const INTERNAL_SERVER_ERROR: StatusCode = StatusCode(500);

    pub const fn new(code: u16) -> Self {
        StatusCode(code)
    }

    pub const fn as_u16(&self) -> u16 {
        self.0
    }

    /// Returns the reason phrase sent on the status line.
    ///
    /// Codes missing from the table are rendered as `OK`, whatever they are.
    ///
    /// ```
    /// # use jailhttp::http::response::StatusCode;
    /// assert_eq!(StatusCode::new(418).reason_phrase(), "OK");
    /// ```
    pub fn reason_phrase(&self) -> &'static str {
        match self.0 {
            200 => "OK",
            400 => "Bad Request",
            403 => "Forbidden",
            404 => "Not Found",
            500 => "Internal Server Error",
            _ => "OK",
        }
    }
}

impl From<u16> for StatusCode {
    fn from(code: u16) -> Self {
        StatusCode(code)
    }
}

/// Represents a complete HTTP response.
///
/// `Content-Length` does not need to be set by hand: encoding always writes
/// the exact body length.
#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    pub status: StatusCode,
    pub headers: Headers,
    pub body: Vec<u8>,
    pub version: String,
}

/// Builder for constructing HTTP responses in a fluent style.
///
/// # Example
///
/// ```
/// # use jailhttp::http::response::{ResponseBuilder, StatusCode};
/// let response = ResponseBuilder::new(StatusCode::OK)
///     .header("Content-Type", "text/html")
///     .body(b"<h1>hi</h1>".to_vec())
///     .build();
/// assert_eq!(response.version, "HTTP/1.0");
/// ```
pub struct ResponseBuilder {
    status: StatusCode,
    headers: Headers,
    body: Vec<u8>,
    version: String,
}

impl ResponseBuilder {
    pub fn new(status: StatusCode) -> Self {
        Self {
            status,
            headers: Headers::new(),
            body: Vec::new(),
            version: DEFAULT_VERSION.to_string(),
        }
    }

    /// Appends a header; order of calls is the order on the wire.
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key, value);
        self
    }

    pub fn body(mut self, body: Vec<u8>) -> Self {
        self.body = body;
        self
    }

    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    pub fn build(self) -> Response {
        Response {
            status: self.status,
            headers: self.headers,
            body: self.body,
            version: self.version,
        }
    }
}

impl Response {
    /// 200 OK carrying an HTML document.
    pub fn html(body: impl Into<Vec<u8>>) -> Self {
        ResponseBuilder::new(StatusCode::OK)
            .header("Content-Type", "text/html")
            .body(body.into())
            .build()
    }

    pub fn forbidden() -> Self {
        ResponseBuilder::new(StatusCode::FORBIDDEN)
            .body(b"<h1>403 Forbidden</h1>".to_vec())
            .build()
    }

    pub fn not_found() -> Self {
        ResponseBuilder::new(StatusCode::NOT_FOUND)
            .body(b"<h1>404 Not Found</h1>".to_vec())
            .build()
    }

    pub fn internal_error() -> Self {
        ResponseBuilder::new(StatusCode::INTERNAL_SERVER_ERROR)
            .body(b"<h1>500 Internal Server Error</h1>".to_vec())
            .build()
    }

    /// Debug response for a request head that failed to parse.
    ///
    /// Answers with 403 and echoes the offending bytes back inside a `<pre>`
    /// block. This is not a protocol-level error status; it exists so a client
    /// author can see what the server actually received.
    pub fn invalid_request_diagnostic(raw: &[u8]) -> Self {
        let mut body = b"HTTP request is invalid: <pre>".to_vec();
        body.extend_from_slice(raw);
        body.extend_from_slice(b"</pre>");

        ResponseBuilder::new(StatusCode::FORBIDDEN).body(body).build()
    }

    pub fn header(&self, key: &str) -> Option<&str> {
        self.headers.get(key)
    }
}
