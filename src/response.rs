use std::fmt;

use crate::common::{Headers, HttpVersion};
use crate::transport::ConnectionClosed;
use crate::writer::Writer;

/// Error from [`Response::write_head`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteHeadError {
    /// The status line has already been emitted.
    AlreadySent,
    /// The transport failed; the socket has been closed.
    ConnectionClosed,
}

impl std::error::Error for WriteHeadError {}

impl fmt::Display for WriteHeadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AlreadySent => f.write_str("status line already sent"),
            Self::ConnectionClosed => f.write_str("connection closed"),
        }
    }
}

/// The outgoing response the handler writes into.
///
/// The status line and the header block are emitted by
/// [`write_head`](Response::write_head), or implicitly as `200 OK` by the
/// first [`write`](Response::write). [`end`](Response::end) declares the
/// response complete and flushes; a handler that never ends its response is
/// treated as faulted by the connection.
///
/// The status line always carries `HTTP/1.0`, whatever the request version.
/// For an HTTP/0.9 request nothing but the raw body is emitted.
pub struct Response<'c, 'b> {
    http_version: HttpVersion,
    headers: Headers,
    output: &'c mut Writer<'b>,
    is_head_sent: bool,
    is_ended: bool,
}

impl fmt::Debug for Response<'_, '_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Response")
            .field("http_version", &self.http_version)
            .field("is_head_sent", &self.is_head_sent)
            .field("is_ended", &self.is_ended)
            .finish()
    }
}

impl<'c, 'b> Response<'c, 'b> {
    pub(crate) fn new(http_version: HttpVersion, output: &'c mut Writer<'b>) -> Self {
        Self {
            http_version,
            headers: Headers::new(),
            output,
            is_head_sent: false,
            is_ended: false,
        }
    }

    /// The response headers. Serialized with the status line; changes after
    /// the head went out have no effect.
    #[must_use]
    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    /// Mutable access to the response headers.
    pub fn headers_mut(&mut self) -> &mut Headers {
        &mut self.headers
    }

    /// Emits `HTTP/1.0 <code> <message>` and the header block. For an
    /// HTTP/0.9 request nothing is emitted, but the head counts as sent.
    ///
    /// # Errors
    ///
    /// - [`WriteHeadError::AlreadySent`] on the second call
    /// - [`WriteHeadError::ConnectionClosed`] after a transport failure
    pub fn write_head(&mut self, code: &str, message: &str) -> Result<(), WriteHeadError> {
        if self.is_head_sent {
            return Err(WriteHeadError::AlreadySent);
        }

        self.is_head_sent = true;

        if self.http_version == HttpVersion::Version0_9 {
            return Ok(());
        }

        self.output.write(b"HTTP/1.0 ")?;
        self.output.write(code.as_bytes())?;
        self.output.write(b" ")?;
        self.output.write(message.as_bytes())?;
        self.output.write(b"\r\n")?;

        self.write_headers()?;
        Ok(())
    }

    /// Writes body bytes, emitting a `200 OK` head first if none was sent.
    ///
    /// # Errors
    ///
    /// - [`ConnectionClosed`] after a transport failure
    pub fn write(&mut self, data: &[u8]) -> Result<(), ConnectionClosed> {
        if !self.is_head_sent {
            self.write_head("200", "OK").map_err(|_| ConnectionClosed)?;
        }

        self.output.write(data)
    }

    /// Declares the response complete and flushes. Idempotent.
    ///
    /// # Errors
    ///
    /// - [`ConnectionClosed`] after a transport failure
    pub fn end(&mut self) -> Result<(), ConnectionClosed> {
        if self.is_ended {
            return Ok(());
        }

        self.is_ended = true;
        self.flush()
    }

    /// Flushes buffered response bytes to the transport.
    ///
    /// # Errors
    ///
    /// - [`ConnectionClosed`] after a transport failure
    pub fn flush(&mut self) -> Result<(), ConnectionClosed> {
        self.output.flush()
    }

    /// `true` once the status line went out (or counted as sent for 0.9).
    #[must_use]
    pub fn is_head_sent(&self) -> bool {
        self.is_head_sent
    }

    /// `true` once [`end`](Response::end) was called.
    #[must_use]
    pub fn is_ended(&self) -> bool {
        self.is_ended
    }

    fn write_headers(&mut self) -> Result<(), ConnectionClosed> {
        for (name, values) in self.headers.iter() {
            for value in values {
                self.output.write(name.as_bytes())?;
                self.output.write(b": ")?;
                self.output.write(value.as_bytes())?;
                self.output.write(b"\r\n")?;
            }
        }

        self.output.write(b"\r\n")
    }
}

impl From<ConnectionClosed> for WriteHeadError {
    fn from(_: ConnectionClosed) -> Self {
        Self::ConnectionClosed
    }
}

#[cfg(test)]
mod tests {
    use super::{Response, WriteHeadError};
    use crate::common::HttpVersion;
    use crate::transport::mock::MockPeer;
    use crate::writer::Writer;

    fn writer_over<'b>(peer: &MockPeer, buffer: &'b mut [u8]) -> Writer<'b> {
        Writer::new(Box::new(peer.endpoint()), buffer)
    }

    #[test]
    fn head_and_end_test() {
        let peer = MockPeer::new(Vec::<Vec<u8>>::new());
        let mut buffer = [0u8; 64];
        let mut output = writer_over(&peer, &mut buffer);
        let mut response = Response::new(HttpVersion::Version1_0, &mut output);

        response.write_head("200", "OK").unwrap();
        response.end().unwrap();

        assert_eq!(peer.written(), b"HTTP/1.0 200 OK\r\n\r\n");
        assert!(response.is_head_sent());
        assert!(response.is_ended());
    }

    #[test]
    fn write_emits_default_head_test() {
        let peer = MockPeer::new(Vec::<Vec<u8>>::new());
        let mut buffer = [0u8; 64];
        let mut output = writer_over(&peer, &mut buffer);
        let mut response = Response::new(HttpVersion::Version1_1, &mut output);

        response.write(b"hello").unwrap();
        response.end().unwrap();

        assert_eq!(peer.written(), b"HTTP/1.0 200 OK\r\n\r\nhello");
    }

    #[test]
    fn second_write_head_is_rejected_test() {
        let peer = MockPeer::new(Vec::<Vec<u8>>::new());
        let mut buffer = [0u8; 64];
        let mut output = writer_over(&peer, &mut buffer);
        let mut response = Response::new(HttpVersion::Version1_0, &mut output);

        response.write_head("204", "No Content").unwrap();
        assert_eq!(
            response.write_head("200", "OK").unwrap_err(),
            WriteHeadError::AlreadySent
        );
    }

    #[test]
    fn headers_serialized_sorted_with_insertion_order_test() {
        let peer = MockPeer::new(Vec::<Vec<u8>>::new());
        let mut buffer = [0u8; 128];
        let mut output = writer_over(&peer, &mut buffer);
        let mut response = Response::new(HttpVersion::Version1_0, &mut output);

        response.headers_mut().add("X-Second", "b");
        response.headers_mut().add("Content-Type", "text/plain");
        response.headers_mut().add("X-Second", "c");

        response.write_head("200", "OK").unwrap();
        response.end().unwrap();

        assert_eq!(
            peer.written(),
            &b"HTTP/1.0 200 OK\r\ncontent-type: text/plain\r\nx-second: b\r\nx-second: c\r\n\r\n"[..]
        );
    }

    #[test]
    fn simple_request_gets_raw_body_test() {
        let peer = MockPeer::new(Vec::<Vec<u8>>::new());
        let mut buffer = [0u8; 64];
        let mut output = writer_over(&peer, &mut buffer);
        let mut response = Response::new(HttpVersion::Version0_9, &mut output);

        response.headers_mut().add("Content-Type", "text/plain");
        response.write_head("200", "OK").unwrap();
        response.write(b"hello").unwrap();
        response.end().unwrap();

        assert_eq!(peer.written(), b"hello");
    }

    #[test]
    fn end_is_idempotent_test() {
        let peer = MockPeer::new(Vec::<Vec<u8>>::new());
        let mut buffer = [0u8; 64];
        let mut output = writer_over(&peer, &mut buffer);
        let mut response = Response::new(HttpVersion::Version1_0, &mut output);

        response.write(b"x").unwrap();
        response.end().unwrap();
        response.end().unwrap();

        assert_eq!(peer.written(), b"HTTP/1.0 200 OK\r\n\r\nx");
    }
}
