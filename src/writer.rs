use std::fmt;

use crate::transport::{ConnectionClosed, Transport};

/// Buffered send side of a connection.
///
/// Bytes are staged in a borrowed, worker-owned buffer and handed to the
/// transport whenever the buffer fills or [`flush`](Writer::flush) is
/// called. Any transport failure closes the socket and folds to
/// [`ConnectionClosed`].
pub struct Writer<'b> {
    transport: Box<dyn Transport>,
    buffer: &'b mut [u8],
    saved_bytes: usize,
}

impl fmt::Debug for Writer<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Writer")
            .field("capacity", &self.buffer.len())
            .field("saved_bytes", &self.saved_bytes)
            .finish()
    }
}

impl<'b> Writer<'b> {
    /// Creates a writer over `transport` with the given send buffer.
    #[must_use]
    pub fn new(transport: Box<dyn Transport>, buffer: &'b mut [u8]) -> Self {
        Self {
            transport,
            buffer,
            saved_bytes: 0,
        }
    }

    /// Copies `data` into the send buffer, flushing as often as needed.
    ///
    /// # Errors
    ///
    /// - [`ConnectionClosed`] after a transport failure; the socket is
    ///   closed before returning
    pub fn write(&mut self, data: &[u8]) -> Result<(), ConnectionClosed> {
        let mut data = data;

        loop {
            let count = data.len().min(self.buffer.len() - self.saved_bytes);
            self.buffer[self.saved_bytes..self.saved_bytes + count]
                .copy_from_slice(&data[..count]);
            self.saved_bytes += count;
            data = &data[count..];

            if self.saved_bytes == self.buffer.len() {
                self.flush()?;
            }

            if data.is_empty() {
                return Ok(());
            }
        }
    }

    /// Sends all staged bytes. No-op when the buffer is empty.
    ///
    /// # Errors
    ///
    /// - [`ConnectionClosed`] after a transport failure; the socket is
    ///   closed before returning
    pub fn flush(&mut self) -> Result<(), ConnectionClosed> {
        if self.saved_bytes == 0 {
            return Ok(());
        }

        if self.transport.send(&self.buffer[..self.saved_bytes]).is_err() {
            self.transport.close();
            return Err(ConnectionClosed);
        }

        self.saved_bytes = 0;
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
    use super::Writer;
    use crate::transport::mock::MockPeer;
    use crate::transport::TransportError;

    #[test]
    fn flush_sends_staged_bytes_test() {
        let peer = MockPeer::new(Vec::<Vec<u8>>::new());
        let mut buffer = [0u8; 8];
        let mut writer = Writer::new(Box::new(peer.endpoint()), &mut buffer);

        writer.write(b"abc").unwrap();
        assert!(peer.written().is_empty());

        writer.flush().unwrap();
        assert_eq!(peer.written(), b"abc");

        // empty flush is a no-op
        writer.flush().unwrap();
        assert_eq!(peer.written(), b"abc");
    }

    #[test]
    fn oversized_write_flushes_repeatedly_test() {
        let peer = MockPeer::new(Vec::<Vec<u8>>::new());
        let mut buffer = [0u8; 4];
        let mut writer = Writer::new(Box::new(peer.endpoint()), &mut buffer);

        writer.write(b"0123456789").unwrap();
        writer.flush().unwrap();
        assert_eq!(peer.written(), b"0123456789");
    }

    #[test]
    fn exact_fill_flushes_test() {
        let peer = MockPeer::new(Vec::<Vec<u8>>::new());
        let mut buffer = [0u8; 4];
        let mut writer = Writer::new(Box::new(peer.endpoint()), &mut buffer);

        writer.write(b"abcd").unwrap();
        assert_eq!(peer.written(), b"abcd");
    }

    #[test]
    fn byte_conservation_test() {
        let peer = MockPeer::new(Vec::<Vec<u8>>::new());
        let mut buffer = [0u8; 3];
        let mut writer = Writer::new(Box::new(peer.endpoint()), &mut buffer);

        let mut total = 0usize;
        for chunk in [&b"a"[..], b"bcde", b"", b"fg", b"hijklmno"] {
            writer.write(chunk).unwrap();
            total += chunk.len();
        }
        writer.flush().unwrap();
        assert_eq!(peer.written().len(), total);
        assert_eq!(peer.written(), b"abcdefghijklmno");
    }

    #[test]
    fn send_failure_closes_socket_test() {
        let peer =
            MockPeer::new(Vec::<Vec<u8>>::new()).failing_sends(TransportError::Unknown);
        let mut buffer = [0u8; 4];
        let mut writer = Writer::new(Box::new(peer.endpoint()), &mut buffer);

        writer.write(b"ab").unwrap();
        assert!(writer.flush().is_err());
        assert!(peer.is_closed());
    }
}
