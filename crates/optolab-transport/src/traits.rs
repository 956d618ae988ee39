use crate::error::Result;

/// A blocking byte stream connected to one instrument (or one daisy chain).
///
/// Implementations own the underlying handle exclusively; nothing here is
/// expected to be shared across threads without external synchronization.
pub trait ByteTransport {
    /// Write the whole buffer.
    fn write_all(&mut self, buf: &[u8]) -> Result<()>;

    /// Block until exactly `buf.len()` bytes have been read.
    fn read_exact(&mut self, buf: &mut [u8]) -> Result<()>;

    /// Number of bytes that can be read without blocking.
    fn bytes_available(&mut self) -> Result<usize>;

    /// Discard anything waiting in the input buffer.
    fn flush_input(&mut self) -> Result<()>;

    /// Discard anything still queued for output.
    fn flush_output(&mut self) -> Result<()>;
}

impl<T: ByteTransport + ?Sized> ByteTransport for &mut T {
    fn write_all(&mut self, buf: &[u8]) -> Result<()> {
        (**self).write_all(buf)
    }

    fn read_exact(&mut self, buf: &mut [u8]) -> Result<()> {
        (**self).read_exact(buf)
    }

    fn bytes_available(&mut self) -> Result<usize> {
        (**self).bytes_available()
    }

    fn flush_input(&mut self) -> Result<()> {
        (**self).flush_input()
    }

    fn flush_output(&mut self) -> Result<()> {
        (**self).flush_output()
    }
}

impl<T: ByteTransport + ?Sized> ByteTransport for Box<T> {
    fn write_all(&mut self, buf: &[u8]) -> Result<()> {
        (**self).write_all(buf)
    }

    fn read_exact(&mut self, buf: &mut [u8]) -> Result<()> {
        (**self).read_exact(buf)
    }

    fn bytes_available(&mut self) -> Result<usize> {
        (**self).bytes_available()
    }

    fn flush_input(&mut self) -> Result<()> {
        (**self).flush_input()
    }

    fn flush_output(&mut self) -> Result<()> {
        (**self).flush_output()
    }
}
