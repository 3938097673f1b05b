use std::io::{self, Cursor, Read};

use jailhttp::http::connection::{
    BODY_READ_SIZE, Dispatch, HEADER_READ_SIZE, Phase, ReadOutcome, Session,
};
use jailhttp::http::error::{HttpError, MalformedMessage};

fn feed_bytewise(session: &mut Session, raw: &[u8]) -> Option<Dispatch> {
    let mut result = None;
    for byte in raw {
        assert!(result.is_none(), "dispatched before the input ended");
        result = session.feed(std::slice::from_ref(byte));
    }
    result
}

fn expect_request(dispatch: Option<Dispatch>) -> jailhttp::http::Request {
    match dispatch {
        Some(Dispatch::Request(request)) => request,
        other => panic!("expected a request, got {other:?}"),
    }
}

#[test]
fn test_starts_reading_header() {
    let session = Session::new();
    assert!(matches!(session.phase(), Phase::ReadingHeader { .. }));
    assert_eq!(session.read_size(), HEADER_READ_SIZE);
}

#[test]
fn test_request_without_body_dispatches_on_terminator() {
    let mut session = Session::new();
    let request = expect_request(feed_bytewise(
        &mut session,
        b"GET /index.html HTTP/1.0\r\nHost: x\r\n\r\n",
    ));

    assert_eq!(request.path, "/index.html");
    assert!(session.is_done());
    assert_eq!(session.read_size(), 0);
}

#[test]
fn test_header_not_parsed_before_terminator() {
    let mut session = Session::new();
    assert!(session.feed(b"GET / HTTP/1.0\r\nHost: x\r\n\r").is_none());
    assert!(matches!(session.phase(), Phase::ReadingHeader { .. }));
    assert!(session.feed(b"\n").is_some());
}

#[test]
fn test_content_length_zero_skips_body_phase() {
    let mut session = Session::new();
    let request = expect_request(
        session.feed(b"POST /a.html HTTP/1.0\r\nHost: x\r\nContent-Length: 0\r\n\r\n"),
    );

    assert!(request.body.is_empty());
    assert!(session.is_done());
}

#[test]
fn test_body_collected_until_content_length() {
    let mut session = Session::new();
    assert!(
        session
            .feed(b"POST /a.html HTTP/1.0\r\nHost: x\r\nContent-Length: 10\r\n\r\n")
            .is_none()
    );

    match session.phase() {
        Phase::ReadingBody { request, expected } => {
            assert_eq!(*expected, 10);
            assert!(request.body.is_empty());
        }
        other => panic!("unexpected phase {other:?}"),
    }
    assert_eq!(session.read_size(), BODY_READ_SIZE);

    assert!(session.feed(b"hello").is_none());
    let request = expect_request(session.feed(b"world"));
    assert_eq!(request.body, b"helloworld".to_vec());
}

#[test]
fn test_body_bytes_in_same_chunk_as_header() {
    let mut session = Session::new();
    let request = expect_request(
        session.feed(b"POST / HTTP/1.0\r\nHost: x\r\nContent-Length: 3\r\n\r\nabc"),
    );
    assert_eq!(request.body, b"abc".to_vec());
}

#[test]
fn test_malformed_head_dispatches_raw_bytes() {
    let raw = b"NOT A REQUEST\r\n\r\n";
    let mut session = Session::new();

    match feed_bytewise(&mut session, raw) {
        Some(Dispatch::Malformed { raw: echoed, error }) => {
            assert_eq!(&echoed[..], raw);
            assert!(matches!(error, HttpError::Malformed(_)));
        }
        other => panic!("expected malformed dispatch, got {other:?}"),
    }
    assert!(session.is_done());
}

#[test]
fn test_missing_host_is_malformed() {
    let mut session = Session::new();
    match session.feed(b"GET / HTTP/1.0\r\n\r\n") {
        Some(Dispatch::Malformed { error, .. }) => {
            assert_eq!(error, HttpError::Malformed(MalformedMessage::MissingHost));
        }
        other => panic!("expected malformed dispatch, got {other:?}"),
    }

    let mut session = Session::new();
    match session.feed(b"GET / HTTP/1.0\r\nAccept: */*\r\n\r\n") {
        Some(Dispatch::Malformed { error, .. }) => {
            assert_eq!(error, HttpError::Malformed(MalformedMessage::MissingHost));
        }
        other => panic!("expected malformed dispatch, got {other:?}"),
    }
}

#[test]
fn test_bad_content_length_is_malformed() {
    let mut session = Session::new();
    match session.feed(b"POST / HTTP/1.0\r\nHost: x\r\nContent-Length: ten\r\n\r\n") {
        Some(Dispatch::Malformed { error, .. }) => {
            assert_eq!(
                error,
                HttpError::Malformed(MalformedMessage::BadContentLength)
            );
        }
        other => panic!("expected malformed dispatch, got {other:?}"),
    }
}

#[test]
fn test_bytes_after_done_are_ignored() {
    let mut session = Session::new();
    assert!(session.feed(b"GET / HTTP/1.0\r\nHost: x\r\n\r\n").is_some());
    assert!(session.feed(b"GET / HTTP/1.0\r\nHost: x\r\n\r\n").is_none());
}

/// Records the size of every read buffer it is handed.
struct Recording<R> {
    inner: R,
    sizes: Vec<usize>,
}

impl<R: Read> Read for Recording<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.sizes.push(buf.len());
        self.inner.read(buf)
    }
}

#[test]
fn test_read_sizes_follow_phase() {
    let mut raw = b"POST / HTTP/1.0\r\nHost: x\r\nContent-Length: 5000\r\n\r\n".to_vec();
    let header_len = raw.len();
    raw.extend(std::iter::repeat_n(b'z', 5000));

    let mut reader = Recording { inner: Cursor::new(raw), sizes: Vec::new() };
    let mut session = Session::new();

    let request = loop {
        match session.read_from(&mut reader).unwrap() {
            ReadOutcome::Pending => continue,
            ReadOutcome::Ready(dispatch) => break expect_request(Some(dispatch)),
            ReadOutcome::PeerClosed => panic!("closed early"),
        }
    };

    assert_eq!(request.body.len(), 5000);
    assert!(reader.sizes[..header_len].iter().all(|&n| n == HEADER_READ_SIZE));
    assert_eq!(&reader.sizes[header_len..], &[BODY_READ_SIZE, BODY_READ_SIZE]);
}

#[test]
fn test_zero_length_read_is_peer_closed() {
    let mut session = Session::new();
    let mut reader = Cursor::new(b"GET / HT".to_vec());

    for _ in 0..8 {
        assert!(matches!(
            session.read_from(&mut reader).unwrap(),
            ReadOutcome::Pending
        ));
    }
    assert!(matches!(
        session.read_from(&mut reader).unwrap(),
        ReadOutcome::PeerClosed
    ));
}
