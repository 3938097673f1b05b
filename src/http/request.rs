use std::collections::HashMap;
use std::fmt;

use crate::http::error::{HttpError, MalformedMessage};
use crate::http::headers::Headers;

/// The only scheme a URL may carry, including its trailing colon.
pub const PROTOCOL: &str = "http:";

pub const DEFAULT_PORT: u16 = 80;

pub const DEFAULT_VERSION: &str = "HTTP/1.0";

/// HTTP request methods.
///
/// Routing only distinguishes GET-style requests, but any token received on
/// the wire is kept so that it can be logged and re-encoded unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Method {
    /// GET - Retrieve a resource
    GET,
    /// POST - Create or submit data
    POST,
    /// PUT - Replace a resource
    PUT,
    /// DELETE - Delete a resource
    DELETE,
    /// HEAD - Like GET but without the response body
    HEAD,
    /// Any other method token
    Extension(String),
}

impl Method {
    /// Parses an HTTP method token. Matching is case-sensitive.
    ///
    /// ```
    /// # use jailhttp::http::request::Method;
    /// assert_eq!(Method::parse("GET"), Method::GET);
    /// assert_eq!(Method::parse("get"), Method::Extension("get".to_string()));
    /// ```
    pub fn parse(s: &str) -> Self {
        match s {
            "GET" => Method::GET,
            "POST" => Method::POST,
            "PUT" => Method::PUT,
            "DELETE" => Method::DELETE,
            "HEAD" => Method::HEAD,
            other => Method::Extension(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Method::GET => "GET",
            Method::POST => "POST",
            Method::PUT => "PUT",
            Method::DELETE => "DELETE",
            Method::HEAD => "HEAD",
            Method::Extension(token) => token,
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Query parameters. A key given without `=` maps to `None`.
pub type Params = HashMap<String, Option<String>>;

/// An HTTP request, either built from a URL or decoded from the wire.
///
/// `path` is always absolute. The raw query string is kept next to its
/// parsed form so the request target re-encodes byte for byte.
#[derive(Debug, Clone, PartialEq)]
pub struct Request {
    /// Scheme with its colon, always `"http:"`
    pub protocol: String,
    /// Host name without port
    pub hostname: String,
    pub port: u16,
    /// Absolute path without the query string (e.g. "/index.html")
    pub path: String,
    /// Everything after the first `?` of the target, if present
    pub query: Option<String>,
    pub params: Params,
    pub method: Method,
    pub headers: Headers,
    pub body: Vec<u8>,
    /// Protocol version (e.g. "HTTP/1.0")
    pub version: String,
}

impl Request {
    /// Builds a GET request for `url` with no headers and an empty body.
    ///
    /// # Errors
    ///
    /// - [`HttpError::InvalidUrl`] when the URL has no `//` or an empty host.
    /// - [`HttpError::UnsupportedProtocol`] for any scheme other than `http:`.
    /// - [`HttpError::InvalidPort`] when the port is not a `u16`.
    ///
    /// ```
    /// # use jailhttp::http::request::Request;
    /// let req = Request::from_url("http://example.com:8080/a/b.html?x=1").unwrap();
    /// assert_eq!(req.hostname, "example.com");
    /// assert_eq!(req.port, 8080);
    /// assert_eq!(req.path, "/a/b.html");
    /// assert_eq!(req.params["x"].as_deref(), Some("1"));
    /// ```
    pub fn from_url(url: &str) -> Result<Self, HttpError> {
        let (protocol, rest) = match url.split_once("//") {
            Some((protocol, rest)) if !rest.is_empty() => (protocol, rest),
            _ if url.split("//").next().is_some_and(|p| p.ends_with(':')) => {
                return Err(HttpError::InvalidUrl("no host"));
            }
            _ => return Err(HttpError::InvalidUrl("no protocol specified")),
        };

        if protocol != PROTOCOL {
            return Err(HttpError::UnsupportedProtocol(protocol.to_string()));
        }

        let (authority, target) = match rest.split_once('/') {
            Some((authority, suffix)) => (authority, format!("/{suffix}")),
            None => (rest, "/".to_string()),
        };

        let (hostname, port) = split_authority(authority)?;
        let (path, query) = split_target(&target);

        Ok(Self {
            protocol: protocol.to_string(),
            hostname: hostname.to_string(),
            port,
            path: path.to_string(),
            params: query.map(parse_query).unwrap_or_default(),
            query: query.map(str::to_string),
            method: Method::GET,
            headers: Headers::new(),
            body: Vec::new(),
            version: DEFAULT_VERSION.to_string(),
        })
    }

    /// Retrieves a header value by its exact name.
    pub fn header(&self, key: &str) -> Option<&str> {
        self.headers.get(key)
    }

    /// The announced body length; a missing `Content-Length` means 0.
    ///
    /// Only plain decimal digits are accepted.
    pub fn content_length(&self) -> Result<usize, MalformedMessage> {
        match self.header("Content-Length") {
            None => Ok(0),
            Some(value) if !value.is_empty() && value.bytes().all(|b| b.is_ascii_digit()) => {
                value.parse().map_err(|_| MalformedMessage::BadContentLength)
            }
            Some(_) => Err(MalformedMessage::BadContentLength),
        }
    }

    /// `hostname:port`, the value sent in the `Host` header.
    pub fn host(&self) -> String {
        format!("{}:{}", self.hostname, self.port)
    }

    /// The request's URL with the port always rendered.
    pub fn url(&self) -> String {
        format!("{}//{}{}", self.protocol, self.host(), self.target())
    }

    /// Path plus `?query` when a query string is present.
    pub fn target(&self) -> String {
        match &self.query {
            Some(query) => format!("{}?{}", self.path, query),
            None => self.path.clone(),
        }
    }
}

/// Builder for requests that start from a URL.
pub struct RequestBuilder {
    url: String,
    method: Method,
    version: Option<String>,
    headers: Headers,
    body: Vec<u8>,
}

impl RequestBuilder {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            method: Method::GET,
            version: None,
            headers: Headers::new(),
            body: Vec::new(),
        }
    }

    pub fn method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key, value);
        self
    }

    pub fn body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }

    pub fn build(self) -> Result<Request, HttpError> {
        let mut request = Request::from_url(&self.url)?;
        request.method = self.method;
        request.headers = self.headers;
        request.body = self.body;
        if let Some(version) = self.version {
            request.version = version;
        }
        Ok(request)
    }
}

fn split_authority(authority: &str) -> Result<(&str, u16), HttpError> {
    let (hostname, port) = match authority.split_once(':') {
        Some((hostname, port)) => {
            let port = port
                .parse()
                .map_err(|_| HttpError::InvalidPort(port.to_string()))?;
            (hostname, port)
        }
        None => (authority, DEFAULT_PORT),
    };

    if hostname.is_empty() {
        return Err(HttpError::InvalidUrl("no host"));
    }
    Ok((hostname, port))
}

fn split_target(target: &str) -> (&str, Option<&str>) {
    match target.split_once('?') {
        Some((path, query)) => (path, Some(query)),
        None => (target, None),
    }
}

/// Parses `a=1&b&c=2`. Later duplicates overwrite earlier ones.
pub fn parse_query(query: &str) -> Params {
    query
        .split('&')
        .map(|entry| match entry.split_once('=') {
            Some((key, value)) => (key.to_string(), Some(value.to_string())),
            None => (entry.to_string(), None),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_value_keeps_text_after_first_equals() {
        let params = parse_query("a=b=c");
        assert_eq!(params["a"].as_deref(), Some("b=c"));
    }

    #[test]
    fn query_last_duplicate_wins() {
        let params = parse_query("k=1&k=2");
        assert_eq!(params["k"].as_deref(), Some("2"));
    }

    #[test]
    fn content_length_rejects_signs() {
        let mut req = Request::from_url("http://x/").unwrap();
        req.headers.insert("Content-Length", "+5");
        assert_eq!(req.content_length(), Err(MalformedMessage::BadContentLength));
    }
}
