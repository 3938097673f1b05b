//! HTTP/1.0 message layer.
//!
//! # Architecture
//!
//! - **`headers`**: ordered, case-sensitive header map
//! - **`request`**: requests, methods and URL parsing
//! - **`response`**: responses, status codes and the reason table
//! - **`parser`**: decodes raw bytes into requests and responses
//! - **`writer`**: encodes messages and writes them without blocking
//! - **`connection`**: the incremental parse state of one connection
//! - **`error`**: error types
//!
//! # Connection State Machine
//!
//! ```text
//!        ┌──────────────────┐
//!        │  ReadingHeader   │ ← 1 byte per read until "\r\n\r\n"
//!        └──────┬───────────┘
//!               │ Content-Length > 0
//!               ▼
//!        ┌──────────────────┐
//!        │   ReadingBody    │ ← 4096 bytes per read until Content-Length
//!        └──────┬───────────┘
//!               │ body complete
//!               ▼
//!        ┌──────────────────┐
//!        │      Done        │ ← also reached straight from ReadingHeader
//!        └──────────────────┘   when there is no body or the head is invalid
//! ```
//!
//! # Example
//!
//! ```
//! use jailhttp::http::parser::decode_response;
//! use jailhttp::http::response::Response;
//! use jailhttp::http::writer::encode_response;
//!
//! let bytes = encode_response(&Response::html("<h1>hi</h1>"));
//! assert_eq!(
//!     bytes,
//!     b"HTTP/1.0 200 OK\r\nContent-Type: text/html\r\nContent-Length: 11\r\n\r\n<h1>hi</h1>"
//! );
//! assert_eq!(decode_response(&bytes).unwrap().body, b"<h1>hi</h1>");
//! ```

pub mod connection;
pub mod error;
pub mod headers;
pub mod parser;
pub mod request;
pub mod response;
pub mod writer;

pub use error::{HttpError, MalformedMessage};
pub use headers::Headers;
pub use request::{Method, Request};
pub use response::{Response, StatusCode};
