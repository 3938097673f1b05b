use std::io::{self, Write};

use crate::http::headers::Headers;
use crate::http::request::Request;
use crate::http::response::Response;

/// Serializes a request. `Host` is set to `hostname:port`, replacing any
/// value already present.
pub fn encode_request(req: &Request) -> Vec<u8> {
    let mut headers = req.headers.clone();
    headers.set("Host", req.host());

    let start_line = format!("{} {} {}", req.method, req.target(), req.version);
    encode_message(&start_line, &headers, &req.body)
}

/// Serializes a response. `Content-Length` is set to the body length,
/// replacing any value already present.
pub fn encode_response(resp: &Response) -> Vec<u8> {
    let mut headers = resp.headers.clone();
    headers.set("Content-Length", resp.body.len().to_string());

    let start_line = format!(
        "{} {} {}",
        resp.version,
        resp.status.as_u16(),
        resp.status.reason_phrase()
    );
    encode_message(&start_line, &headers, &resp.body)
}

fn encode_message(start_line: &str, headers: &Headers, body: &[u8]) -> Vec<u8> {
    let mut buf = Vec::with_capacity(start_line.len() + 64 + body.len());

    buf.extend_from_slice(start_line.as_bytes());
    buf.extend_from_slice(b"\r\n");

    buf.extend_from_slice(headers.to_string().as_bytes());

    // Header/body separator
    buf.extend_from_slice(b"\r\n");

    buf.extend_from_slice(body);

    buf
}

/// A serialized response plus how much of it has reached the peer.
///
/// Writing can stop at any point on a non-blocking socket and pick up where
/// it left off on the next writable notification.
#[derive(Debug)]
pub struct ResponseWriter {
    buffer: Vec<u8>,
    written: usize,
}

impl ResponseWriter {
    pub fn new(response: &Response) -> Self {
        Self {
            buffer: encode_response(response),
            written: 0,
        }
    }

    pub fn is_complete(&self) -> bool {
        self.written == self.buffer.len()
    }

    pub fn remaining(&self) -> usize {
        self.buffer.len() - self.written
    }

    /// Writes as much as `stream` accepts.
    ///
    /// Returns `Ok(true)` once everything is written and `Ok(false)` when the
    /// stream would block first.
    pub fn write_to<W: Write>(&mut self, stream: &mut W) -> io::Result<bool> {
        while !self.is_complete() {
            match stream.write(&self.buffer[self.written..]) {
                Ok(0) => {
                    return Err(io::Error::new(
                        io::ErrorKind::WriteZero,
                        "connection closed while writing",
                    ));
                }
                Ok(n) => self.written += n,
                Err(e) if e.kind() == io::ErrorKind::WouldBlock => return Ok(false),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        }

        stream.flush()?;
        Ok(true)
    }
}
