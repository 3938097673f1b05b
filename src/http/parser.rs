use crate::http::error::{HttpError, MalformedMessage};
use crate::http::headers::Headers;
use crate::http::request::{Method, Request};
use crate::http::response::{Response, StatusCode};

/// Blank line separating the header block from the body.
pub const HEADER_TERMINATOR: &[u8] = b"\r\n\r\n";

/// Decodes a request from raw bytes.
///
/// Everything after the first blank line is taken as the body, whatever its
/// length; body framing is the caller's job. The request is rebuilt from its
/// `Host` header and target, so a missing `Host` is an error.
pub fn decode_request(raw: &[u8]) -> Result<Request, HttpError> {
    let (head, body) = split_message(raw)?;
    let (start_line, headers) = parse_head(head)?;

    let mut parts = start_line.splitn(3, ' ');
    let method = parts.next().filter(|s| !s.is_empty());
    let target = parts.next().filter(|s| s.starts_with('/'));
    let version = parts.next().filter(|s| !s.is_empty());
    let (Some(method), Some(target), Some(version)) = (method, target, version) else {
        return Err(MalformedMessage::BadStartLine.into());
    };

    let host = headers.get("Host").ok_or(MalformedMessage::MissingHost)?;
    let mut request = Request::from_url(&format!("http://{host}{target}"))?;
    request.method = Method::parse(method);
    request.version = version.to_string();
    request.headers = headers;
    request.body = body.to_vec();

    Ok(request)
}

/// Decodes a response from raw bytes. The reason phrase is not kept.
pub fn decode_response(raw: &[u8]) -> Result<Response, HttpError> {
    let (head, body) = split_message(raw)?;
    let (status_line, headers) = parse_head(head)?;

    let mut parts = status_line.splitn(3, ' ');
    let version = parts
        .next()
        .filter(|s| !s.is_empty())
        .ok_or(MalformedMessage::BadStartLine)?;
    let code = parts
        .next()
        .ok_or(MalformedMessage::BadStartLine)?
        .parse::<u16>()
        .map_err(|_| MalformedMessage::BadStatusCode)?;

    Ok(Response {
        status: StatusCode::new(code),
        headers,
        body: body.to_vec(),
        version: version.to_string(),
    })
}

/// Position of the first `\r\n\r\n`, if any.
pub fn find_headers_end(buf: &[u8]) -> Option<usize> {
    buf.windows(HEADER_TERMINATOR.len())
        .position(|w| w == HEADER_TERMINATOR)
}

fn split_message(raw: &[u8]) -> Result<(&[u8], &[u8]), MalformedMessage> {
    let end = find_headers_end(raw).ok_or(MalformedMessage::MissingTerminator)?;
    Ok((&raw[..end], &raw[end + HEADER_TERMINATOR.len()..]))
}

/// Splits the head into its start line and header map.
fn parse_head(head: &[u8]) -> Result<(&str, Headers), MalformedMessage> {
    let text = std::str::from_utf8(head).map_err(|_| MalformedMessage::NotUtf8)?;

    let (start_line, header_text) = match text.split_once("\r\n") {
        Some((start_line, rest)) => (start_line, Some(rest)),
        None => (text, None),
    };

    let mut headers = Headers::new();
    for line in header_text.into_iter().flat_map(|t| t.split("\r\n")) {
        // Values may contain ": " themselves; only the first one separates.
        let (key, value) = line
            .split_once(": ")
            .ok_or(MalformedMessage::BadHeaderLine)?;
        headers.insert(key, value);
    }

    Ok((start_line, headers))
}
