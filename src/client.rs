//! Minimal blocking HTTP/1.0 client.
//!
//! One request per connection; the response ends when the server closes.

use std::io::{Read, Write};
use std::net::TcpStream;

use anyhow::{Context, Result, bail};
use tracing::info;

use crate::http::headers::Headers;
use crate::http::parser::decode_response;
use crate::http::request::Request;
use crate::http::response::Response;
use crate::http::writer::encode_request;

/// Redirects followed by [`fetch`] before giving up.
pub const MAX_REDIRECTS: usize = 10;

/// Sends a GET for `url` and returns the decoded response.
///
/// No redirect handling and no retries.
pub fn get(url: &str, headers: &Headers) -> Result<Response> {
    let mut request = Request::from_url(url)?;
    request.headers = headers.clone();

    let mut stream = TcpStream::connect((request.hostname.as_str(), request.port))
        .with_context(|| format!("connecting to {}", request.host()))?;

    stream
        .write_all(&encode_request(&request))
        .context("sending request")?;

    let mut raw = Vec::new();
    stream.read_to_end(&mut raw).context("reading response")?;

    Ok(decode_response(&raw)?)
}

/// Like [`get`], but follows `301`/`302` redirects up to [`MAX_REDIRECTS`].
pub fn fetch(url: &str) -> Result<Response> {
    let mut current = url.to_string();

    for _ in 0..=MAX_REDIRECTS {
        let response = get(&current, &Headers::new())?;
        if !matches!(response.status.as_u16(), 301 | 302) {
            return Ok(response);
        }

        let Some(location) = response.header("Location") else {
            bail!("redirect failed: no target specified");
        };
        let next = url::Url::parse(&current)
            .and_then(|base| base.join(location))
            .with_context(|| format!("invalid redirect target {location:?}"))?;

        info!(from = %current, to = %next, "Redirected");
        current = next.to_string();
    }

    bail!("too many redirects")
}
