use bytes::{Buf, BufMut, BytesMut};

use crate::command;

/// Every frame is device (1) + command (1) + data (4) = 6 bytes.
pub const FRAME_SIZE: usize = 6;

/// Device number that addresses every device on the chain.
pub const BROADCAST: u8 = 0;

/// One command or reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Frame {
    /// Device number (0 = broadcast on requests).
    pub device_id: u8,
    /// Command code.
    pub command: u8,
    /// Signed command argument or reply value.
    pub data: i32,
}

impl Frame {
    /// Create a new frame.
    pub fn new(device_id: u8, command: u8, data: i32) -> Self {
        Self {
            device_id,
            command,
            data,
        }
    }

    /// Serialize into the fixed wire layout.
    pub fn to_bytes(&self) -> [u8; FRAME_SIZE] {
        let d = self.data.to_le_bytes();
        [self.device_id, self.command, d[0], d[1], d[2], d[3]]
    }

    /// Parse the fixed wire layout. The data field is sign-extended from
    /// its 32-bit two's-complement form.
    pub fn from_bytes(bytes: [u8; FRAME_SIZE]) -> Self {
        Self {
            device_id: bytes[0],
            command: bytes[1],
            data: i32::from_le_bytes([bytes[2], bytes[3], bytes[4], bytes[5]]),
        }
    }

    /// True when the device rejected a command and `data` is an error code.
    pub fn is_error(&self) -> bool {
        self.command == command::ERROR
    }
}

/// Encode a frame into the wire format.
///
/// Wire format:
/// ```text
/// ┌──────────┬──────────┬─────────────────────┐
/// │ Device   │ Command  │ Data (4B LE, i32)   │
/// │ (1B)     │ (1B)     │                     │
/// └──────────┴──────────┴─────────────────────┘
/// ```
pub fn encode_frame(frame: &Frame, dst: &mut BytesMut) {
    dst.reserve(FRAME_SIZE);
    dst.put_u8(frame.device_id);
    dst.put_u8(frame.command);
    dst.put_i32_le(frame.data);
}

/// Decode a frame from a buffer.
///
/// Returns `None` if the buffer doesn't hold six bytes yet.
/// On success, consumes the frame bytes from the buffer.
pub fn decode_frame(src: &mut BytesMut) -> Option<Frame> {
    if src.len() < FRAME_SIZE {
        return None;
    }

    let device_id = src.get_u8();
    let command = src.get_u8();
    let data = src.get_i32_le();
    Some(Frame {
        device_id,
        command,
        data,
    })
}
