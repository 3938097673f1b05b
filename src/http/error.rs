use thiserror::Error;

/// Errors raised while building or decoding HTTP messages.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HttpError {
    /// The URL has no `//` authority part, or the authority is empty.
    #[error("invalid url: {0}")]
    InvalidUrl(&'static str),

    #[error("invalid protocol {0:?}: only HTTP is currently supported")]
    UnsupportedProtocol(String),

    #[error("invalid port {0:?}")]
    InvalidPort(String),

    #[error("malformed message: {0}")]
    Malformed(#[from] MalformedMessage),
}

/// The ways a raw byte sequence can fail to frame as an HTTP message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum MalformedMessage {
    #[error("no blank line terminates the header block")]
    MissingTerminator,

    #[error("header block is not valid UTF-8")]
    NotUtf8,

    #[error("bad request or status line")]
    BadStartLine,

    #[error("header line without \": \" separator")]
    BadHeaderLine,

    #[error("status code is not an integer")]
    BadStatusCode,

    #[error("request has no Host header")]
    MissingHost,

    #[error("Content-Length is not a decimal byte count")]
    BadContentLength,
}
