use std::collections::VecDeque;
use std::io::ErrorKind;

use crate::error::{Result, TransportError};
use crate::traits::ByteTransport;

/// In-process transport with a scripted receive queue.
///
/// Bytes queued with [`MemoryTransport::push_incoming`] are what the
/// "instrument" has sent; everything written is captured for inspection.
/// Reading past the end of the queue behaves like a serial read timeout.
#[derive(Debug, Default, Clone)]
pub struct MemoryTransport {
    incoming: VecDeque<u8>,
    written: Vec<u8>,
}

impl MemoryTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a transport that already has `bytes` waiting to be read.
    pub fn with_incoming(bytes: &[u8]) -> Self {
        let mut transport = Self::new();
        transport.push_incoming(bytes);
        transport
    }

    /// Queue bytes as if the device had sent them.
    pub fn push_incoming(&mut self, bytes: &[u8]) {
        self.incoming.extend(bytes.iter().copied());
    }

    /// Everything written so far.
    pub fn written(&self) -> &[u8] {
        &self.written
    }

    /// Drain and return everything written so far.
    pub fn take_written(&mut self) -> Vec<u8> {
        std::mem::take(&mut self.written)
    }

    /// Bytes still waiting in the receive queue.
    pub fn pending(&self) -> usize {
        self.incoming.len()
    }
}

impl ByteTransport for MemoryTransport {
    fn write_all(&mut self, buf: &[u8]) -> Result<()> {
        self.written.extend_from_slice(buf);
        Ok(())
    }

    fn read_exact(&mut self, buf: &mut [u8]) -> Result<()> {
        if self.incoming.len() < buf.len() {
            return Err(TransportError::Io(std::io::Error::new(
                ErrorKind::TimedOut,
                format!(
                    "read timed out waiting for {} bytes ({} queued)",
                    buf.len(),
                    self.incoming.len()
                ),
            )));
        }
        for slot in buf.iter_mut() {
            // Length checked above.
            *slot = self.incoming.pop_front().unwrap_or_default();
        }
        Ok(())
    }

    fn bytes_available(&mut self) -> Result<usize> {
        Ok(self.incoming.len())
    }

    fn flush_input(&mut self) -> Result<()> {
        self.incoming.clear();
        Ok(())
    }

    fn flush_output(&mut self) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_queued_bytes_in_order() {
        let mut t = MemoryTransport::with_incoming(&[1, 2, 3, 4]);
        let mut buf = [0u8; 3];
        t.read_exact(&mut buf).unwrap();
        assert_eq!(buf, [1, 2, 3]);
        assert_eq!(t.bytes_available().unwrap(), 1);
    }

    #[test]
    fn short_queue_times_out_without_consuming() {
        let mut t = MemoryTransport::with_incoming(&[9, 9]);
        let mut buf = [0u8; 6];
        let err = t.read_exact(&mut buf).unwrap_err();
        assert!(err.is_timeout());
        assert_eq!(t.pending(), 2);
    }

    #[test]
    fn captures_writes_and_flushes_input() {
        let mut t = MemoryTransport::with_incoming(&[7; 12]);
        t.write_all(b"abc").unwrap();
        t.write_all(b"def").unwrap();
        t.flush_input().unwrap();

        assert_eq!(t.written(), b"abcdef");
        assert_eq!(t.bytes_available().unwrap(), 0);
        assert_eq!(t.take_written(), b"abcdef".to_vec());
        assert!(t.written().is_empty());
    }

    #[test]
    fn works_through_mutable_reference_and_box() {
        fn write_via<T: ByteTransport>(mut t: T) {
            t.write_all(&[0xAA]).unwrap();
        }

        let mut t = MemoryTransport::new();
        write_via(&mut t);
        let boxed: Box<dyn ByteTransport> = Box::new(MemoryTransport::new());
        write_via(boxed);
        assert_eq!(t.written(), &[0xAA]);
    }
}
