use jailhttp::http::response::{Response, ResponseBuilder, StatusCode};
use jailhttp::http::writer::encode_response;

#[test]
fn test_status_code_as_u16() {
    assert_eq!(StatusCode::OK.as_u16(), 200);
    assert_eq!(StatusCode::BAD_REQUEST.as_u16(), 400);
    assert_eq!(StatusCode::FORBIDDEN.as_u16(), 403);
    assert_eq!(StatusCode::NOT_FOUND.as_u16(), 404);
    assert_eq!(StatusCode::INTERNAL_SERVER_ERROR.as_u16(), 500);
}

#[test]
fn test_status_code_reason_phrase() {
    assert_eq!(StatusCode::OK.reason_phrase(), "OK");
    assert_eq!(StatusCode::BAD_REQUEST.reason_phrase(), "Bad Request");
    assert_eq!(StatusCode::FORBIDDEN.reason_phrase(), "Forbidden");
    assert_eq!(StatusCode::NOT_FOUND.reason_phrase(), "Not Found");
    assert_eq!(
        StatusCode::INTERNAL_SERVER_ERROR.reason_phrase(),
        "Internal Server Error"
    );
}

#[test]
fn test_unknown_status_code_reason_is_ok() {
    assert_eq!(StatusCode::new(301).reason_phrase(), "OK");
    assert_eq!(StatusCode::from(503).reason_phrase(), "OK");
}

#[test]
fn test_response_builder_basic() {
    let response = ResponseBuilder::new(StatusCode::OK)
        .body(b"Hello, World!".to_vec())
        .build();

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body, b"Hello, World!".to_vec());
    assert_eq!(response.version, "HTTP/1.0");
    assert!(response.headers.is_empty());
}

#[test]
fn test_encode_html_response_exact_bytes() {
    let response = Response::html(b"<h1>hi</h1>".to_vec());
    assert_eq!(
        encode_response(&response),
        b"HTTP/1.0 200 OK\r\nContent-Type: text/html\r\nContent-Length: 11\r\n\r\n<h1>hi</h1>"
    );
}

#[test]
fn test_encode_not_found() {
    assert_eq!(
        encode_response(&Response::not_found()),
        b"HTTP/1.0 404 Not Found\r\nContent-Length: 22\r\n\r\n<h1>404 Not Found</h1>"
    );
}

#[test]
fn test_encode_overwrites_wrong_content_length() {
    let response = ResponseBuilder::new(StatusCode::FORBIDDEN)
        .header("Content-Length", "1000")
        .header("X-After", "1")
        .body(b"nope".to_vec())
        .build();

    assert_eq!(
        encode_response(&response),
        b"HTTP/1.0 403 Forbidden\r\nContent-Length: 4\r\nX-After: 1\r\n\r\nnope"
    );
}

#[test]
fn test_encode_empty_body() {
    let response = ResponseBuilder::new(StatusCode::OK).version("HTTP/1.1").build();
    assert_eq!(
        encode_response(&response),
        b"HTTP/1.1 200 OK\r\nContent-Length: 0\r\n\r\n"
    );
}

#[test]
fn test_invalid_request_diagnostic_echoes_raw_bytes() {
    let raw = b"BROKEN\r\n\r\n";
    let response = Response::invalid_request_diagnostic(raw);

    assert_eq!(response.status, StatusCode::FORBIDDEN);
    assert_eq!(
        response.body,
        b"HTTP request is invalid: <pre>BROKEN\r\n\r\n</pre>".to_vec()
    );
}
