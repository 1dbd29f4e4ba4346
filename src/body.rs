use std::fmt;

use crate::reader::Reader;

/// Error kinds from reading or draining a request body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyReadError {
    /// The transport failed; the socket has been closed.
    ConnectionClosed,
    /// The peer sent more bytes than declared, or closed before sending the
    /// declared count.
    BadSyntax,
}

impl std::error::Error for BodyReadError {}

impl fmt::Display for BodyReadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConnectionClosed => f.write_str("connection closed"),
            Self::BadSyntax => f.write_str("body does not match Content-Length"),
        }
    }
}

/// Framing of the request body, selected from the parsed headers.
///
/// Both variants are known at compile time; the reader to pull from is
/// passed per call so the body state can live next to the connection's
/// request data while the handler borrows both.
#[derive(Debug)]
pub(crate) enum MessageBody {
    /// No body: reads always yield 0, draining is a no-op.
    Zero,
    /// Body framed by a `Content-Length` header.
    ContentLength { remaining_bytes: usize },
}

impl MessageBody {
    /// Copies up to `buffer.len()` body bytes into `buffer`, advancing the
    /// reader past them. Returns 0 at end of body.
    pub(crate) fn read(
        &mut self,
        input: &mut Reader<'_>,
        buffer: &mut [u8],
    ) -> Result<usize, BodyReadError> {
        let remaining_bytes = match self {
            MessageBody::Zero => return Ok(0),
            MessageBody::ContentLength { remaining_bytes } => remaining_bytes,
        };

        let mut offset = 0;
        while offset < buffer.len() && *remaining_bytes != 0 {
            let result = input.read().map_err(|_| BodyReadError::ConnectionClosed)?;

            if result.len() > *remaining_bytes {
                return Err(BodyReadError::BadSyntax);
            }

            if result.is_completed() && result.len() < *remaining_bytes {
                return Err(BodyReadError::BadSyntax);
            }

            if result.is_completed() && result.is_empty() {
                break;
            }

            let count = result.len().min(buffer.len() - offset);
            buffer[offset..offset + count].copy_from_slice(&result.data()[..count]);

            // consumed == examined, so a partially drained region is served
            // again without touching the transport
            let _ = input.advance(count);
            *remaining_bytes -= count;
            offset += count;
        }

        Ok(offset)
    }

    /// Drains the body to its end without copying.
    pub(crate) fn consume(&mut self, input: &mut Reader<'_>) -> Result<(), BodyReadError> {
        let remaining_bytes = match self {
            MessageBody::Zero => return Ok(()),
            MessageBody::ContentLength { remaining_bytes } => remaining_bytes,
        };

        while *remaining_bytes != 0 {
            let result = input.read().map_err(|_| BodyReadError::ConnectionClosed)?;

            if result.len() > *remaining_bytes {
                return Err(BodyReadError::BadSyntax);
            }

            if result.is_completed() && result.len() < *remaining_bytes {
                return Err(BodyReadError::BadSyntax);
            }

            let count = result.len();
            let _ = input.advance(count);
            *remaining_bytes -= count;
        }

        Ok(())
    }
}
