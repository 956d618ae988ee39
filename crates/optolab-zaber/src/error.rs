use std::time::Duration;

use crate::codes::DeviceErrorCode;

/// Errors that can occur talking to an actuator chain.
#[derive(Debug, thiserror::Error)]
pub enum ActuatorError {
    /// Transport-level error.
    #[error("transport error: {0}")]
    Transport(#[from] optolab_transport::TransportError),

    /// Frame-level error.
    #[error("frame error: {0}")]
    Frame(#[from] optolab_frame::FrameError),

    /// A device rejected a command with a known error code.
    #[error("device {device_id} rejected command: {code}")]
    Device {
        device_id: u8,
        code: DeviceErrorCode,
    },

    /// A device sent an error reply with a code outside the known set.
    #[error("protocol violation: device {device_id} sent unknown error code {code}")]
    UnknownErrorCode { device_id: u8, code: i32 },

    /// Not enough replies arrived before the reply timeout.
    #[error("timed out after {after:?} waiting for replies ({received} of {expected})")]
    Timeout {
        expected: usize,
        received: usize,
        after: Duration,
    },

    /// A broadcast needs the chain size, which only the renumber handshake learns.
    #[error("chain size unknown: renumber the chain before broadcasting")]
    NotInitialized,

    /// The renumber handshake got no answer from any device.
    #[error("no devices answered the renumber handshake")]
    NoDevices,

    /// Device number 0 is reserved for broadcast.
    #[error("invalid device number {0}")]
    InvalidDeviceId(u8),

    /// Stored-position slots run from 0 to 15.
    #[error("stored position slot {0} out of range (0-15)")]
    InvalidSlot(u8),

    /// A reply echoed a different command than the one sent.
    #[error("device {device_id} answered command {received} while waiting for {expected}")]
    UnexpectedReply {
        device_id: u8,
        expected: u8,
        received: u8,
    },

    /// An operation that needs one value got a different number of replies.
    #[error("expected {expected} replies, got {received}")]
    DeviceCount { expected: usize, received: usize },

    /// A value that cannot be expressed as a device command argument.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

impl ActuatorError {
    /// Raw device error code, for both known and unknown codes.
    pub fn device_code(&self) -> Option<i32> {
        match self {
            ActuatorError::Device { code, .. } => Some(code.code()),
            ActuatorError::UnknownErrorCode { code, .. } => Some(*code),
            _ => None,
        }
    }

    /// Convert an error reply into the matching typed failure.
    pub(crate) fn from_reply(device_id: u8, code: i32) -> Self {
        match DeviceErrorCode::from_code(code) {
            Some(code) => ActuatorError::Device { device_id, code },
            None => ActuatorError::UnknownErrorCode { device_id, code },
        }
    }
}

pub type Result<T> = std::result::Result<T, ActuatorError>;
