use std::fmt;
use std::panic::{self, AssertUnwindSafe};

use crate::body::{BodyReadError, MessageBody};
use crate::common::{Headers, HttpVersion, Method};
use crate::log;
use crate::parse;
use crate::reader::Reader;
use crate::request::{Request, RequestData};
use crate::request_handler::RequestHandler;
use crate::response::Response;
use crate::writer::Writer;

/// Decimal digits that can at most represent a machine word; a longer
/// `Content-Length` value is rejected before parsing.
const MAX_CONTENT_LENGTH_DIGITS: usize = max_decimal_digits(usize::MAX);

const fn max_decimal_digits(mut value: usize) -> usize {
    let mut digits = 1;
    while value >= 10 {
        value /= 10;
        digits += 1;
    }
    digits
}

/// Error from driving one request over a connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessError {
    /// [`Connection::process_request`] was already called.
    AlreadyProcessed,
    /// The transport failed mid-request; the socket has been closed.
    ConnectionClosed,
    /// The peer sent a malformed request; `400 Bad Request` was emitted for
    /// HTTP/1.x requests.
    BadRequest,
    /// The handler faulted or never completed its response; `500 Internal
    /// Server Error` was emitted when possible.
    Handler,
    /// The request body did not match its declared length.
    BadSyntax,
}

impl std::error::Error for ProcessError {}

impl fmt::Display for ProcessError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AlreadyProcessed => f.write_str("request already processed"),
            Self::ConnectionClosed => f.write_str("connection closed"),
            Self::BadRequest => f.write_str("bad request"),
            Self::Handler => f.write_str("handler failed"),
            Self::BadSyntax => f.write_str("request body mismatch"),
        }
    }
}

/// Outcome of one parse step; `BadRequest` triggers the 400 response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StepError {
    ConnectionClosed,
    BadRequest,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ProcessingState {
    Initial,
    RequestLine,
    Headers,
    Parsed,
    BodyFramed,
    HandlerActive,
    ResponseDone,
    Closed,
}

/// Request fields accumulated while parsing; string views into the receive
/// buffer are copied out before the cursor moves past them.
#[derive(Debug, Default)]
struct PendingRequest {
    http_version: Option<HttpVersion>,
    method: Option<Method>,
    href: String,
    path: String,
    query: String,
    headers: Headers,
}

/// Drives one request over a reader/writer pair: request line, headers,
/// body framing, handler, body drain, close.
pub struct Connection<'b> {
    input: Reader<'b>,
    output: Writer<'b>,
    state: ProcessingState,
    pending: PendingRequest,
}

impl fmt::Debug for Connection<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Connection")
            .field("state", &self.state)
            .finish()
    }
}

impl<'b> Connection<'b> {
    /// Creates a connection over an established reader/writer pair.
    #[must_use]
    pub fn new(input: Reader<'b>, output: Writer<'b>) -> Self {
        Self {
            input,
            output,
            state: ProcessingState::Initial,
            pending: PendingRequest::default(),
        }
    }

    /// Parses one request, invokes `handler`, drains the body and closes
    /// the socket. Can only be called once.
    ///
    /// # Errors
    ///
    /// - [`ProcessError::AlreadyProcessed`] on a second call
    /// - [`ProcessError::BadRequest`] on protocol errors (400 emitted for 1.x)
    /// - [`ProcessError::Handler`] when the handler faults or leaves the
    ///   response unfinished (500 emitted when nothing was sent yet)
    /// - [`ProcessError::BadSyntax`] when the body violates `Content-Length`
    /// - [`ProcessError::ConnectionClosed`] on transport failure
    pub fn process_request(&mut self, handler: &dyn RequestHandler) -> Result<(), ProcessError> {
        if self.state != ProcessingState::Initial {
            return Err(ProcessError::AlreadyProcessed);
        }

        self.state = ProcessingState::RequestLine;
        let result = self.run(handler);

        self.input.close();
        self.output.close();
        self.state = ProcessingState::Closed;

        result
    }

    fn run(&mut self, handler: &dyn RequestHandler) -> Result<(), ProcessError> {
        while self.state != ProcessingState::Parsed {
            let step = match self.state {
                ProcessingState::RequestLine => self.take_request_line(),
                _ => self.take_header(),
            };

            match step {
                Ok(()) => {}
                Err(StepError::ConnectionClosed) => return Err(ProcessError::ConnectionClosed),
                Err(StepError::BadRequest) => {
                    self.send_bad_request();
                    return Err(ProcessError::BadRequest);
                }
            }
        }

        let (mut body, content_length) = match self.create_message_body() {
            Ok(body) => body,
            Err(_) => {
                self.send_bad_request();
                return Err(ProcessError::BadRequest);
            }
        };
        self.state = ProcessingState::BodyFramed;

        let data = match self.pending.finish(content_length) {
            Some(data) => data,
            None => {
                self.send_bad_request();
                return Err(ProcessError::BadRequest);
            }
        };

        log::debug!("{} {} {}", data.method, data.href, data.http_version.header());

        self.state = ProcessingState::HandlerActive;
        let (completed, is_head_sent, is_ended) = {
            let mut request = Request::new(&data, &mut body, &mut self.input);
            let mut response = Response::new(data.http_version, &mut self.output);

            let outcome =
                panic::catch_unwind(AssertUnwindSafe(|| handler.handle(&mut request, &mut response)));

            let completed = match outcome {
                Ok(Ok(())) => true,
                Ok(Err(err)) => {
                    log::warn!("handler error: {err}");
                    let _ = err;
                    false
                }
                Err(_) => {
                    log::error!("handler panicked");
                    false
                }
            };

            (completed, response.is_head_sent(), response.is_ended())
        };

        if !completed || !is_head_sent {
            if !is_head_sent {
                self.send_internal_error();
            }
            return Err(ProcessError::Handler);
        }

        if !is_ended {
            // bytes may have been partially sent; nothing to amend
            return Err(ProcessError::Handler);
        }
        self.state = ProcessingState::ResponseDone;

        match body.consume(&mut self.input) {
            Ok(()) => Ok(()),
            Err(BodyReadError::BadSyntax) => Err(ProcessError::BadSyntax),
            Err(BodyReadError::ConnectionClosed) => Err(ProcessError::ConnectionClosed),
        }
    }

    fn take_request_line(&mut self) -> Result<(), StepError> {
        let result = self.input.read().map_err(|_| StepError::ConnectionClosed)?;

        let crlf_index = match find_crlf(result.data()) {
            Some(index) => index,
            None => {
                if result.is_completed() {
                    return Err(StepError::BadRequest);
                }

                let examined = result.len();
                let _ = self.input.advance_examined(0, examined);
                return Ok(());
            }
        };

        let line = &result.data()[..crlf_index];
        let parsed = parse::parse_request_line(line).map_err(|err| {
            log::debug!("request line: {err}");
            let _ = err;
            StepError::BadRequest
        })?;

        Self::apply_request_line(&mut self.pending, &mut self.state, &parsed)?;

        let _ = self.input.advance(crlf_index + 2);
        Ok(())
    }

    fn apply_request_line(
        pending: &mut PendingRequest,
        state: &mut ProcessingState,
        line: &parse::RequestLine<'_>,
    ) -> Result<(), StepError> {
        match &line.version {
            Some(version) => {
                let http_version = HttpVersion::from_numbers(version.major, version.minor)
                    .ok_or(StepError::BadRequest)?;
                pending.http_version = Some(http_version);
                *state = ProcessingState::Headers;
            }
            None => {
                pending.http_version = Some(HttpVersion::Version0_9);
                *state = ProcessingState::Parsed;
            }
        }

        let method = Method::from_token(line.method).ok_or(StepError::BadRequest)?;
        if pending.http_version == Some(HttpVersion::Version0_9) && method != Method::Get {
            return Err(StepError::BadRequest);
        }
        pending.method = Some(method);

        let parts = parse::parse_uri(line.uri).ok_or_else(|| {
            log::debug!("request-uri rejected");
            StepError::BadRequest
        })?;

        pending.href = owned_string(line.uri)?;
        pending.path = match parts.path {
            Some(path) => owned_string(path)?,
            None => String::from("/"),
        };
        pending.query = match parts.query {
            Some(query) => owned_string(query)?,
            None => String::new(),
        };

        Ok(())
    }

    fn take_header(&mut self) -> Result<(), StepError> {
        let result = self.input.read().map_err(|_| StepError::ConnectionClosed)?;

        let crlf_index = match find_crlf(result.data()) {
            Some(index) => index,
            None => {
                if result.is_completed() {
                    return Err(StepError::BadRequest);
                }

                let examined = result.len();
                let _ = self.input.advance_examined(0, examined);
                return Ok(());
            }
        };

        if crlf_index == 0 {
            let _ = self.input.advance(2);
            self.state = ProcessingState::Parsed;
            return Ok(());
        }

        let line = &result.data()[..crlf_index];
        let parsed = parse::parse_header(line).map_err(|err| {
            log::debug!("header line: {err}");
            let _ = err;
            StepError::BadRequest
        })?;

        let name = owned_string(parsed.name)?;
        let value = owned_string(parsed.value)?;
        self.pending.headers.add(name, value);

        let _ = self.input.advance(crlf_index + 2);
        Ok(())
    }

    fn create_message_body(&self) -> Result<(MessageBody, usize), StepError> {
        if self.pending.http_version == Some(HttpVersion::Version0_9) {
            return Ok((MessageBody::Zero, 0));
        }

        let values = match self.pending.headers.get("Content-Length") {
            None => return Ok((MessageBody::Zero, 0)),
            Some(values) => values,
        };

        if values.len() > 1 {
            return Err(StepError::BadRequest);
        }

        let value = &values[0];
        if value.len() > MAX_CONTENT_LENGTH_DIGITS {
            return Err(StepError::BadRequest);
        }

        if !value.bytes().all(|byte| byte.is_ascii_digit()) {
            return Err(StepError::BadRequest);
        }

        let content_length: usize = value.parse().map_err(|_| StepError::BadRequest)?;

        if content_length > 0 {
            Ok((
                MessageBody::ContentLength {
                    remaining_bytes: content_length,
                },
                content_length,
            ))
        } else {
            Ok((MessageBody::Zero, 0))
        }
    }

    fn send_bad_request(&mut self) {
        if self.pending.http_version != Some(HttpVersion::Version0_9) {
            log::info!("send error response (400)");
            let _ = self.output.write(b"HTTP/1.0 400 Bad Request\r\n\r\n");
            let _ = self.output.flush();
        }
    }

    fn send_internal_error(&mut self) {
        if self.pending.http_version != Some(HttpVersion::Version0_9) {
            log::info!("send error response (500)");
            let _ = self
                .output
                .write(b"HTTP/1.0 500 Internal Server Error\r\n\r\n");
            let _ = self.output.flush();
        }
    }
}

impl PendingRequest {
    /// Turns the accumulated fields into owned request data; `None` until
    /// both the version and the method have been recorded.
    fn finish(&mut self, content_length: usize) -> Option<RequestData> {
        let http_version = self.http_version?;
        let method = self.method.take()?;

        Some(RequestData {
            method,
            href: std::mem::take(&mut self.href),
            path: std::mem::take(&mut self.path),
            query: std::mem::take(&mut self.query),
            http_version,
            headers: std::mem::take(&mut self.headers),
            content_length,
        })
    }
}

fn find_crlf(buffer: &[u8]) -> Option<usize> {
    buffer.windows(2).position(|window| window == b"\r\n")
}

fn owned_string(bytes: &[u8]) -> Result<String, StepError> {
    String::from_utf8(bytes.to_vec()).map_err(|_| StepError::BadRequest)
}
