use std::io::{self, Read};

use bytes::{BufMut, Bytes, BytesMut};

use crate::http::error::HttpError;
use crate::http::parser::{decode_request, HEADER_TERMINATOR};
use crate::http::request::Request;

/// Bytes read per call while looking for the end of the header block.
pub const HEADER_READ_SIZE: usize = 1;

/// Bytes read per call while collecting a body.
pub const BODY_READ_SIZE: usize = 4096;

/// Where a session is in reading its request.
///
/// The header buffer only exists before the headers are parsed, and the
/// parsed request only exists after.
#[derive(Debug)]
pub enum Phase {
    ReadingHeader { buffer: BytesMut },
    ReadingBody { request: Request, expected: usize },
    Done,
}

/// What a finished session hands over to be answered.
#[derive(Debug)]
pub enum Dispatch {
    Request(Request),
    /// The header block could not be decoded; `raw` is exactly what arrived.
    Malformed { raw: Bytes, error: HttpError },
}

/// Result of one read from the peer.
#[derive(Debug)]
pub enum ReadOutcome {
    Pending,
    Ready(Dispatch),
    /// The read returned zero bytes.
    PeerClosed,
}

/// Incremental request parser for one connection.
///
/// It does no I/O on its own beyond [`Session::read_from`]; the caller decides
/// when a read may happen.
#[derive(Debug)]
pub struct Session {
    phase: Phase,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    pub fn new() -> Self {
        Self {
            phase: Phase::ReadingHeader {
                buffer: BytesMut::with_capacity(512),
            },
        }
    }

    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    pub fn is_done(&self) -> bool {
        matches!(self.phase, Phase::Done)
    }

    /// Size of the next read for the current phase; 0 once done.
    pub fn read_size(&self) -> usize {
        match self.phase {
            Phase::ReadingHeader { .. } => HEADER_READ_SIZE,
            Phase::ReadingBody { .. } => BODY_READ_SIZE,
            Phase::Done => 0,
        }
    }

    /// Performs a single read of [`Session::read_size`] bytes and feeds it.
    ///
    /// `WouldBlock` and other I/O errors are returned unchanged.
    pub fn read_from<R: Read>(&mut self, reader: &mut R) -> io::Result<ReadOutcome> {
        match self.read_size() {
            0 => Ok(ReadOutcome::Pending),
            HEADER_READ_SIZE => {
                let mut byte = [0u8; HEADER_READ_SIZE];
                self.read_chunk(reader, &mut byte)
            }
            _ => {
                let mut chunk = [0u8; BODY_READ_SIZE];
                self.read_chunk(reader, &mut chunk)
            }
        }
    }

    fn read_chunk<R: Read>(&mut self, reader: &mut R, chunk: &mut [u8]) -> io::Result<ReadOutcome> {
        let n = reader.read(chunk)?;
        if n == 0 {
            return Ok(ReadOutcome::PeerClosed);
        }

        Ok(match self.feed(&chunk[..n]) {
            Some(dispatch) => ReadOutcome::Ready(dispatch),
            None => ReadOutcome::Pending,
        })
    }

    /// Advances the state machine with newly arrived bytes.
    ///
    /// Header bytes are taken one at a time so decoding only ever runs on a
    /// buffer ending in the blank line; anything after it counts as body.
    /// Returns the dispatch once the session reaches [`Phase::Done`]. Bytes fed
    /// after that are ignored.
    pub fn feed(&mut self, mut bytes: &[u8]) -> Option<Dispatch> {
        match &mut self.phase {
            Phase::ReadingHeader { buffer } => {
                while let Some((&byte, rest)) = bytes.split_first() {
                    buffer.put_u8(byte);
                    bytes = rest;
                    if buffer.ends_with(HEADER_TERMINATOR) {
                        let raw = std::mem::take(buffer).freeze();
                        return self.finish_header(raw, bytes);
                    }
                }
                None
            }
            Phase::ReadingBody { request, expected } => {
                // Bytes past `expected` stay in the body; there is no pipelining.
                request.body.extend_from_slice(bytes);
                if request.body.len() < *expected {
                    return None;
                }
                match std::mem::replace(&mut self.phase, Phase::Done) {
                    Phase::ReadingBody { request, .. } => Some(Dispatch::Request(request)),
                    _ => None,
                }
            }
            Phase::Done => None,
        }
    }

    fn finish_header(&mut self, raw: Bytes, rest: &[u8]) -> Option<Dispatch> {
        let parsed = decode_request(&raw).and_then(|request| {
            let expected = request.content_length()?;
            Ok((request, expected))
        });

        match parsed {
            Err(error) => {
                self.phase = Phase::Done;
                Some(Dispatch::Malformed { raw, error })
            }
            Ok((request, 0)) => {
                self.phase = Phase::Done;
                Some(Dispatch::Request(request))
            }
            Ok((request, expected)) => {
                self.phase = Phase::ReadingBody { request, expected };
                if rest.is_empty() {
                    None
                } else {
                    self.feed(rest)
                }
            }
        }
    }
}
