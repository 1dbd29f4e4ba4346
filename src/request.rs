use std::fmt;

use crate::body::{BodyReadError, MessageBody};
use crate::common::{Headers, HttpVersion, Method};
use crate::reader::Reader;

/// Owned request fields, materialized from the parse buffers before the
/// handler runs.
#[derive(Debug)]
pub(crate) struct RequestData {
    pub(crate) method: Method,
    pub(crate) href: String,
    pub(crate) path: String,
    pub(crate) query: String,
    pub(crate) http_version: HttpVersion,
    pub(crate) headers: Headers,
    pub(crate) content_length: usize,
}

/// An HTTP request as seen by the handler.
///
/// All string fields are owned copies; they stay valid for the whole handler
/// call regardless of what the receive buffer does underneath. The body is
/// read incrementally through [`read_body`](Request::read_body) and is
/// framed by the `Content-Length` header; whatever the handler leaves
/// unread is drained by the connection afterwards.
pub struct Request<'c, 'b> {
    data: &'c RequestData,
    body: &'c mut MessageBody,
    input: &'c mut Reader<'b>,
}

impl fmt::Debug for Request<'_, '_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        write!(
            f,
            "Request({} {} {})",
            self.data.method,
            self.data.href,
            self.data.http_version.header()
        )
    }
}

impl<'c, 'b> Request<'c, 'b> {
    pub(crate) fn new(
        data: &'c RequestData,
        body: &'c mut MessageBody,
        input: &'c mut Reader<'b>,
    ) -> Self {
        Self { data, body, input }
    }

    /// The request method.
    #[must_use]
    pub fn method(&self) -> &Method {
        &self.data.method
    }

    /// The method token as sent by the client, folded to upper case.
    #[must_use]
    pub fn method_name(&self) -> &str {
        self.data.method.as_str()
    }

    /// The request-URI exactly as received.
    #[must_use]
    pub fn href(&self) -> &str {
        &self.data.href
    }

    /// The path component; `/` when the URI has none.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.data.path
    }

    /// The raw query string without the leading `?`; empty when absent.
    #[must_use]
    pub fn query(&self) -> &str {
        &self.data.query
    }

    /// The HTTP version of the request.
    #[must_use]
    pub fn http_version(&self) -> HttpVersion {
        self.data.http_version
    }

    /// All headers sent by the client.
    #[must_use]
    pub fn headers(&self) -> &Headers {
        &self.data.headers
    }

    /// The declared body length; 0 for HTTP/0.9 or without a
    /// `Content-Length` header.
    #[must_use]
    pub fn content_length(&self) -> usize {
        self.data.content_length
    }

    /// Reads up to `buffer.len()` body bytes. Returns 0 at end of body.
    ///
    /// # Errors
    ///
    /// - [`BodyReadError::ConnectionClosed`] after a transport failure
    /// - [`BodyReadError::BadSyntax`] when the peer violates the declared
    ///   length
    pub fn read_body(&mut self, buffer: &mut [u8]) -> Result<usize, BodyReadError> {
        self.body.read(self.input, buffer)
    }
}
