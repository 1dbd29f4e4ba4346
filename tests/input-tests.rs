#![allow(missing_docs, unused_crate_dependencies)]

use std::io::{Read, Write};
use std::time::Duration;

use simple_http::Options;

#[allow(dead_code)]
mod support;

fn request_response(request: &[u8]) -> String {
    let (listening, mut client) = support::new_client_to_hello_world_server();

    client.write_all(request).unwrap();

    let mut content = String::new();
    client.read_to_string(&mut content).unwrap();
    drop(listening);
    content
}

#[test]
fn unparsable_request_line_test() {
    assert_eq!(
        request_response(b"qsd qsd qsd\r\n"),
        "HTTP/1.0 400 Bad Request\r\n\r\n"
    );
}

#[test]
fn bare_lf_is_no_terminator_test() {
    // LF alone never ends a line; the stream ends without CRLF
    let (listening, mut client) = support::new_client_to_hello_world_server();

    client.write_all(b"GET / HTTP/1.0\n\n").unwrap();
    client.shutdown(std::net::Shutdown::Write).unwrap();

    let mut content = String::new();
    client.read_to_string(&mut content).unwrap();
    assert_eq!(content, "HTTP/1.0 400 Bad Request\r\n\r\n");
    drop(listening);
}

#[test]
fn malformed_header_test() {
    assert_eq!(
        request_response(b"GET / HTTP/1.0\r\nNoColonHere\r\n\r\n"),
        "HTTP/1.0 400 Bad Request\r\n\r\n"
    );
    assert_eq!(
        request_response(b"GET / HTTP/1.0\r\n: novalue\r\n\r\n"),
        "HTTP/1.0 400 Bad Request\r\n\r\n"
    );
}

#[test]
fn malformed_uri_test() {
    assert_eq!(
        request_response(b"GET relative HTTP/1.0\r\n\r\n"),
        "HTTP/1.0 400 Bad Request\r\n\r\n"
    );
    assert_eq!(
        request_response(b"GET /a%2 HTTP/1.0\r\n\r\n"),
        "HTTP/1.0 400 Bad Request\r\n\r\n"
    );
}

#[test]
fn unsupported_version_test() {
    assert_eq!(
        request_response(b"GET / HTTP/2.0\r\n\r\n"),
        "HTTP/1.0 400 Bad Request\r\n\r\n"
    );
}

#[test]
fn bad_content_length_test() {
    assert_eq!(
        request_response(b"POST / HTTP/1.0\r\nContent-Length: 5x\r\n\r\nhello"),
        "HTTP/1.0 400 Bad Request\r\n\r\n"
    );
    assert_eq!(
        request_response(
            b"POST / HTTP/1.0\r\nContent-Length: 2\r\nContent-Length: 2\r\n\r\nhi"
        ),
        "HTTP/1.0 400 Bad Request\r\n\r\n"
    );
}

#[test]
fn simple_request_error_closes_silently_test() {
    // only GET exists in the simple-request form; the error response is
    // suppressed for HTTP/0.9
    let (listening, mut client) = support::new_client_to_hello_world_server();

    client.write_all(b"HEAD /\r\n").unwrap();

    let mut content = String::new();
    client.read_to_string(&mut content).unwrap();
    assert_eq!(content, "");
    drop(listening);
}

#[test]
fn oversized_request_line_test() {
    // fills the receive buffer without a CRLF in sight
    let listening = support::new_server_with_options(
        Options {
            request_buffer_length: 1024,
            ..Options::default()
        },
        simple_http::FnRequestHandler(
            |_: &mut simple_http::Request<'_, '_>,
             response: &mut simple_http::Response<'_, '_>| {
                response.write(b"hello world")?;
                response.end()?;
                Ok(())
            },
        ),
    );
    let mut client = support::create_client(listening.local_addr(), Some(Duration::from_secs(5)));

    // exactly the buffer capacity, so the server consumes every sent byte
    client.write_all(b"GET /".as_ref()).unwrap();
    client.write_all(&vec![b'a'; 1019]).unwrap();

    let mut content = String::new();
    client.read_to_string(&mut content).unwrap();
    assert_eq!(content, "HTTP/1.0 400 Bad Request\r\n\r\n");
    drop(listening);
}

#[test]
fn idle_connection_times_out_test() {
    let listening = support::new_server_with_options(
        Options {
            timeout: Duration::from_millis(200),
            ..Options::default()
        },
        simple_http::FnRequestHandler(
            |_: &mut simple_http::Request<'_, '_>,
             response: &mut simple_http::Response<'_, '_>| {
                response.write(b"hello world")?;
                response.end()?;
                Ok(())
            },
        ),
    );
    let mut client = support::create_client(listening.local_addr(), Some(Duration::from_secs(5)));

    // send nothing: the connection must be closed on us after the timeout
    let mut content = String::new();
    client.read_to_string(&mut content).unwrap();
    assert_eq!(content, "");
    drop(listening);
}

#[test]
fn extra_spaces_are_tolerated_test() {
    let (listening, mut client) = support::new_client_to_hello_world_server();

    client.write_all(b"GET   /   HTTP/1.0  \r\n\r\n").unwrap();

    let mut content = String::new();
    client.read_to_string(&mut content).unwrap();
    assert!(content.ends_with("hello world"), "content: {content}");
    drop(listening);
}
