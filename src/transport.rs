use std::fmt;
use std::io::{ErrorKind as IoErrorKind, Read, Write};
use std::net::{Shutdown, TcpStream};
use std::time::Duration;

/// Error kinds a [`Transport`] can report.
///
/// Any of these is fatal to the current connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportError {
    /// The configured receive or send timeout elapsed.
    Timeout,
    /// Any other platform error.
    Unknown,
}

impl std::error::Error for TransportError {}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Timeout => f.write_str("transport timeout"),
            Self::Unknown => f.write_str("transport error"),
        }
    }
}

impl From<std::io::Error> for TransportError {
    fn from(err: std::io::Error) -> Self {
        match err.kind() {
            IoErrorKind::TimedOut | IoErrorKind::WouldBlock => Self::Timeout,
            _ => Self::Unknown,
        }
    }
}

/// Error reported by [`Reader`](crate::Reader) and [`Writer`](crate::Writer)
/// once the underlying socket has been closed after a transport failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConnectionClosed;

impl std::error::Error for ConnectionClosed {}

impl fmt::Display for ConnectionClosed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("connection closed")
    }
}

/// Blocking byte stream the request pipeline runs on.
///
/// [`TcpTransport`] is the stock implementation. Custom transports only need
/// these five capabilities, which keeps the pipeline testable against
/// scripted in-memory streams.
pub trait Transport {
    /// Blocking receive into `buffer`. `Ok(0)` signals that the peer has
    /// closed its side.
    ///
    /// # Errors
    ///
    /// - [`TransportError`] on timeout or platform failure
    fn read(&mut self, buffer: &mut [u8]) -> Result<usize, TransportError>;

    /// Blocking send of the whole `data` range. Partial sends are not
    /// exposed.
    ///
    /// # Errors
    ///
    /// - [`TransportError`] on timeout or platform failure
    fn send(&mut self, data: &[u8]) -> Result<(), TransportError>;

    /// Sets the receive and the send timeout to the same value.
    /// A zero duration clears both timeouts (OS default).
    ///
    /// # Errors
    ///
    /// - [`TransportError`] when the socket rejects the option
    fn set_timeout(&mut self, timeout: Duration) -> Result<(), TransportError>;

    /// Closes the stream. Subsequent calls are no-ops.
    fn close(&mut self);

    /// `true` once [`close`](Transport::close) has been called.
    fn is_closed(&self) -> bool;
}

/// [`Transport`] over a [`TcpStream`].
///
/// Reader and writer sides of one connection each hold their own
/// `TcpTransport` over a cloned stream; [`close`](Transport::close) shuts
/// the socket down in both directions, so closing either side closes the
/// connection.
#[derive(Debug)]
pub struct TcpTransport {
    stream: TcpStream,
    is_closed: bool,
}

impl TcpTransport {
    /// Wraps a connected stream.
    #[must_use]
    pub fn new(stream: TcpStream) -> Self {
        Self {
            stream,
            is_closed: false,
        }
    }

    /// Splits a connected stream into a read-side and a write-side
    /// transport over the same socket.
    ///
    /// # Errors
    ///
    /// - [`TransportError`] when the stream handle cannot be cloned
    pub fn pair(stream: TcpStream) -> Result<(Self, Self), TransportError> {
        let write_stream = stream.try_clone()?;
        Ok((Self::new(stream), Self::new(write_stream)))
    }
}

impl Transport for TcpTransport {
    fn read(&mut self, buffer: &mut [u8]) -> Result<usize, TransportError> {
        if buffer.is_empty() {
            return Ok(0);
        }

        self.stream.read(buffer).map_err(TransportError::from)
    }

    fn send(&mut self, data: &[u8]) -> Result<(), TransportError> {
        self.stream.write_all(data).map_err(TransportError::from)
    }

    fn set_timeout(&mut self, timeout: Duration) -> Result<(), TransportError> {
        let timeout = if timeout.is_zero() {
            None
        } else {
            Some(timeout)
        };

        self.stream.set_read_timeout(timeout)?;
        self.stream.set_write_timeout(timeout)?;
        Ok(())
    }

    fn close(&mut self) {
        if !self.is_closed {
            let _ = self.stream.shutdown(Shutdown::Both);
            self.is_closed = true;
        }
    }

    fn is_closed(&self) -> bool {
        self.is_closed
    }
}
