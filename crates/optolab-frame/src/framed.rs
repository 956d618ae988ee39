use bytes::BytesMut;
use optolab_transport::ByteTransport;
use tracing::{debug, trace};

use crate::codec::{decode_frame, encode_frame, Frame, FRAME_SIZE};
use crate::command::command_name;
use crate::error::Result;

const INITIAL_BUFFER_CAPACITY: usize = 16 * FRAME_SIZE;

/// Reads and writes whole frames over any [`ByteTransport`].
///
/// Partial frames are kept in an internal buffer between calls, so callers
/// only ever see complete six-byte frames.
pub struct FramedTransport<T> {
    inner: T,
    buf: BytesMut,
    scratch: BytesMut,
}

impl<T: ByteTransport> FramedTransport<T> {
    pub fn new(inner: T) -> Self {
        Self {
            inner,
            buf: BytesMut::with_capacity(INITIAL_BUFFER_CAPACITY),
            scratch: BytesMut::with_capacity(FRAME_SIZE),
        }
    }

    /// Write one frame.
    pub fn send(&mut self, frame: &Frame) -> Result<()> {
        self.scratch.clear();
        encode_frame(frame, &mut self.scratch);
        self.inner.write_all(&self.scratch)?;
        debug!(
            device = frame.device_id,
            command = command_name(frame.command),
            data = frame.data,
            "frame sent"
        );
        Ok(())
    }

    /// Read the next complete frame (blocking, bounded by the transport's
    /// own read timeout).
    pub fn read_frame(&mut self) -> Result<Frame> {
        loop {
            if let Some(frame) = decode_frame(&mut self.buf) {
                log_received(&frame);
                return Ok(frame);
            }

            let mut chunk = [0u8; FRAME_SIZE];
            let missing = FRAME_SIZE - self.buf.len();
            self.inner.read_exact(&mut chunk[..missing])?;
            self.buf.extend_from_slice(&chunk[..missing]);
        }
    }

    /// Return the next complete frame if one can be assembled without
    /// blocking. Bytes beyond that frame stay buffered.
    pub fn poll_frame(&mut self) -> Result<Option<Frame>> {
        if self.buf.len() < FRAME_SIZE {
            self.fill_available()?;
        }
        let frame = decode_frame(&mut self.buf);
        if let Some(frame) = &frame {
            log_received(frame);
        }
        Ok(frame)
    }

    /// Drain whatever the transport has ready without blocking and return
    /// every complete frame it contained. Trailing partial bytes stay
    /// buffered for the next call.
    pub fn poll_frames(&mut self) -> Result<Vec<Frame>> {
        self.fill_available()?;

        let mut frames = Vec::with_capacity(self.buf.len() / FRAME_SIZE);
        while let Some(frame) = decode_frame(&mut self.buf) {
            log_received(&frame);
            frames.push(frame);
        }
        Ok(frames)
    }

    fn fill_available(&mut self) -> Result<()> {
        let available = self.inner.bytes_available()?;
        if available == 0 {
            return Ok(());
        }
        let start = self.buf.len();
        self.buf.resize(start + available, 0);
        if let Err(err) = self.inner.read_exact(&mut self.buf[start..]) {
            self.buf.truncate(start);
            return Err(err.into());
        }
        Ok(())
    }

    /// Drop stale bytes on both sides of the link, including any partial
    /// frame held in the reassembly buffer.
    pub fn discard_input(&mut self) -> Result<()> {
        if !self.buf.is_empty() {
            trace!(bytes = self.buf.len(), "discarding buffered partial frame");
        }
        self.buf.clear();
        self.inner.flush_input()?;
        self.inner.flush_output()?;
        Ok(())
    }

    /// Bytes held in the reassembly buffer.
    pub fn buffered(&self) -> usize {
        self.buf.len()
    }

    /// Borrow the underlying transport.
    pub fn get_ref(&self) -> &T {
        &self.inner
    }

    /// Mutably borrow the underlying transport.
    pub fn get_mut(&mut self) -> &mut T {
        &mut self.inner
    }

    /// Consume the framer and return the inner transport.
    pub fn into_inner(self) -> T {
        self.inner
    }
}

fn log_received(frame: &Frame) {
    debug!(
        device = frame.device_id,
        command = command_name(frame.command),
        data = frame.data,
        "frame received"
    );
}
