use std::fmt;

use crate::transport::{ConnectionClosed, Transport};

/// View over the valid region of a [`Reader`] buffer.
///
/// The slice stays valid until the next `advance` call on the reader.
#[derive(Debug)]
pub struct ReadResult<'r> {
    data: &'r [u8],
    is_completed: bool,
}

impl<'r> ReadResult<'r> {
    /// The contiguous received-but-unconsumed bytes.
    #[must_use]
    pub fn data(&self) -> &'r [u8] {
        self.data
    }

    /// Number of valid bytes in [`data`](ReadResult::data).
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// `true` when no bytes are buffered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// `true` once the peer has closed its side; no further bytes will
    /// arrive.
    #[must_use]
    pub fn is_completed(&self) -> bool {
        self.is_completed
    }
}

/// Error returned by [`Reader::advance_examined`] on a violated cursor
/// precondition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdvanceError {
    /// `consumed <= examined <= received bytes` does not hold.
    OutOfBounds,
}

impl std::error::Error for AdvanceError {}

impl fmt::Display for AdvanceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OutOfBounds => f.write_str("advance out of bounds"),
        }
    }
}

/// Buffered receive side of a connection.
///
/// The buffer is borrowed so a worker thread can reuse one allocation across
/// all connections it serves. Consumption follows an advance/examine cursor:
/// [`read`](Reader::read) hands out the current region, and
/// [`advance_examined`](Reader::advance_examined) both drops consumed bytes
/// and records how far the caller has looked. Only a fully examined region
/// triggers another transport receive, so a parser that cannot make progress
/// yet simply marks everything examined and reads again.
pub struct Reader<'b> {
    transport: Box<dyn Transport>,
    buffer: &'b mut [u8],
    received_bytes: usize,
    is_completed: bool,
    is_examined: bool,
}

impl fmt::Debug for Reader<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Reader")
            .field("capacity", &self.buffer.len())
            .field("received_bytes", &self.received_bytes)
            .field("is_completed", &self.is_completed)
            .field("is_examined", &self.is_examined)
            .finish()
    }
}

impl<'b> Reader<'b> {
    /// Creates a reader over `transport` with the given receive buffer.
    #[must_use]
    pub fn new(transport: Box<dyn Transport>, buffer: &'b mut [u8]) -> Self {
        Self {
            transport,
            buffer,
            received_bytes: 0,
            is_completed: false,
            is_examined: true,
        }
    }

    /// Returns the valid region, receiving more bytes first if the previous
    /// region was fully examined and the peer has not completed.
    ///
    /// A zero-byte receive latches the completed state permanently. Once the
    /// buffer is full, the receive is issued on an empty slice and therefore
    /// also completes the stream.
    ///
    /// # Errors
    ///
    /// - [`ConnectionClosed`] after a transport failure; the socket is
    ///   closed before returning
    pub fn read(&mut self) -> Result<ReadResult<'_>, ConnectionClosed> {
        if self.is_examined && !self.is_completed {
            let count = match self.transport.read(&mut self.buffer[self.received_bytes..]) {
                Ok(count) => count,
                Err(_) => {
                    self.transport.close();
                    return Err(ConnectionClosed);
                }
            };

            self.received_bytes += count;
            self.is_completed = count == 0;
        }

        Ok(ReadResult {
            data: &self.buffer[..self.received_bytes],
            is_completed: self.is_completed,
        })
    }

    /// Drops `consumed` bytes from the front of the region and marks the
    /// same count examined.
    ///
    /// # Errors
    ///
    /// - [`AdvanceError::OutOfBounds`] when `consumed` exceeds the region
    pub fn advance(&mut self, consumed: usize) -> Result<(), AdvanceError> {
        self.advance_examined(consumed, consumed)
    }

    /// Drops `consumed` bytes and records that the caller has examined the
    /// region up to `examined`.
    ///
    /// The remaining bytes are compacted to the front of the buffer. The
    /// next [`read`](Reader::read) issues a transport receive only if
    /// `examined` covered the whole region.
    ///
    /// # Errors
    ///
    /// - [`AdvanceError::OutOfBounds`] unless
    ///   `consumed <= examined <= received bytes`
    pub fn advance_examined(
        &mut self,
        consumed: usize,
        examined: usize,
    ) -> Result<(), AdvanceError> {
        if consumed > examined || examined > self.received_bytes {
            return Err(AdvanceError::OutOfBounds);
        }

        self.buffer.copy_within(consumed..self.received_bytes, 0);
        self.is_examined = examined == self.received_bytes;
        self.received_bytes -= consumed;
        Ok(())
    }

    /// Closes the underlying transport.
    pub fn close(&mut self) {
        self.transport.close();
    }

    /// `true` once the underlying transport has been closed.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.transport.is_closed()
    }
}

#[cfg(test)]
mod tests {
    use super::Reader;
    use crate::transport::mock::{MockPeer, Step};
    use crate::transport::TransportError;

    #[test]
    fn read_without_examine_returns_same_region_test() {
        let peer = MockPeer::new(vec![b"abc".to_vec(), b"def".to_vec()]);
        let mut buffer = [0u8; 16];
        let mut reader = Reader::new(Box::new(peer.endpoint()), &mut buffer);

        let result = reader.read().unwrap();
        assert_eq!(result.data(), b"abc");
        assert!(!result.is_completed());

        // not examined at all: the transport must not be touched again
        reader.advance_examined(0, 0).unwrap();
        let result = reader.read().unwrap();
        assert_eq!(result.data(), b"abc");
    }

    #[test]
    fn examined_region_grows_on_next_read_test() {
        let peer = MockPeer::new(vec![b"abc".to_vec(), b"def".to_vec()]);
        let mut buffer = [0u8; 16];
        let mut reader = Reader::new(Box::new(peer.endpoint()), &mut buffer);

        let len = reader.read().unwrap().len();
        reader.advance_examined(0, len).unwrap();

        let result = reader.read().unwrap();
        assert_eq!(result.data(), b"abcdef");
    }

    #[test]
    fn consume_all_forces_transport_receive_test() {
        let peer = MockPeer::new(vec![b"abc".to_vec(), b"def".to_vec()]);
        let mut buffer = [0u8; 16];
        let mut reader = Reader::new(Box::new(peer.endpoint()), &mut buffer);

        let len = reader.read().unwrap().len();
        reader.advance(len).unwrap();

        let result = reader.read().unwrap();
        assert_eq!(result.data(), b"def");
    }

    #[test]
    fn partial_consume_keeps_remainder_test() {
        let peer = MockPeer::new(vec![b"abcdef".to_vec()]);
        let mut buffer = [0u8; 16];
        let mut reader = Reader::new(Box::new(peer.endpoint()), &mut buffer);

        let _ = reader.read().unwrap();
        reader.advance(2).unwrap();

        // remainder compacted, not examined: no new receive
        let result = reader.read().unwrap();
        assert_eq!(result.data(), b"cdef");
    }

    #[test]
    fn completed_latches_test() {
        let peer = MockPeer::new(vec![b"ab".to_vec()]);
        let mut buffer = [0u8; 16];
        let mut reader = Reader::new(Box::new(peer.endpoint()), &mut buffer);

        let len = reader.read().unwrap().len();
        reader.advance_examined(0, len).unwrap();

        let result = reader.read().unwrap();
        assert!(result.is_completed());
        assert_eq!(result.data(), b"ab");

        reader.advance(2).unwrap();
        let result = reader.read().unwrap();
        assert!(result.is_completed());
        assert!(result.is_empty());
    }

    #[test]
    fn full_buffer_completes_stream_test() {
        let peer = MockPeer::new(vec![b"abcd".to_vec(), b"ef".to_vec()]);
        let mut buffer = [0u8; 4];
        let mut reader = Reader::new(Box::new(peer.endpoint()), &mut buffer);

        let len = reader.read().unwrap().len();
        assert_eq!(len, 4);
        reader.advance_examined(0, len).unwrap();

        // buffer full: zero-length receive latches completion
        let result = reader.read().unwrap();
        assert!(result.is_completed());
        assert_eq!(result.data(), b"abcd");
    }

    #[test]
    fn transport_error_closes_socket_test() {
        let peer = MockPeer::scripted(vec![Step::Fail(TransportError::Timeout)]);
        let mut buffer = [0u8; 16];
        let mut reader = Reader::new(Box::new(peer.endpoint()), &mut buffer);

        assert!(reader.read().is_err());
        assert!(peer.is_closed());
    }

    #[test]
    fn advance_bounds_test() {
        let peer = MockPeer::new(vec![b"abc".to_vec()]);
        let mut buffer = [0u8; 16];
        let mut reader = Reader::new(Box::new(peer.endpoint()), &mut buffer);

        let _ = reader.read().unwrap();
        assert!(reader.advance_examined(2, 1).is_err());
        assert!(reader.advance_examined(0, 4).is_err());
        assert!(reader.advance(4).is_err());
        assert!(reader.advance_examined(1, 3).is_ok());
    }
}
