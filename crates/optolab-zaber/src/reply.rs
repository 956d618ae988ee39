use optolab_frame::Frame;
use serde::Serialize;

use crate::error::{ActuatorError, Result};

/// A successful reply frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Reply {
    pub device_id: u8,
    pub command: u8,
    pub data: i32,
}

impl Reply {
    /// Accept a decoded frame, turning error replies into typed failures.
    pub fn from_frame(frame: Frame) -> Result<Self> {
        if frame.is_error() {
            return Err(ActuatorError::from_reply(frame.device_id, frame.data));
        }
        Ok(Self {
            device_id: frame.device_id,
            command: frame.command,
            data: frame.data,
        })
    }
}

/// Value reported by one device, usually a position in microsteps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct Position {
    pub device_id: u8,
    pub position: i32,
}

impl From<Reply> for Position {
    fn from(reply: Reply) -> Self {
        Self {
            device_id: reply.device_id,
            position: reply.data,
        }
    }
}

/// What a device reports it is currently doing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviceStatus {
    Idle,
    Homing,
    ManualMove,
    MovingToStored,
    MovingAbsolute,
    MovingRelative,
    MovingAtSpeed,
    Stopping,
    Other(i32),
}

impl DeviceStatus {
    pub fn from_code(code: i32) -> Self {
        match code {
            0 => DeviceStatus::Idle,
            1 => DeviceStatus::Homing,
            10 => DeviceStatus::ManualMove,
            18 => DeviceStatus::MovingToStored,
            20 => DeviceStatus::MovingAbsolute,
            21 => DeviceStatus::MovingRelative,
            22 => DeviceStatus::MovingAtSpeed,
            23 => DeviceStatus::Stopping,
            other => DeviceStatus::Other(other),
        }
    }

    pub fn code(self) -> i32 {
        match self {
            DeviceStatus::Idle => 0,
            DeviceStatus::Homing => 1,
            DeviceStatus::ManualMove => 10,
            DeviceStatus::MovingToStored => 18,
            DeviceStatus::MovingAbsolute => 20,
            DeviceStatus::MovingRelative => 21,
            DeviceStatus::MovingAtSpeed => 22,
            DeviceStatus::Stopping => 23,
            DeviceStatus::Other(code) => code,
        }
    }

    pub fn is_idle(self) -> bool {
        self == DeviceStatus::Idle
    }

    pub fn label(self) -> &'static str {
        match self {
            DeviceStatus::Idle => "idle",
            DeviceStatus::Homing => "homing",
            DeviceStatus::ManualMove => "manual move",
            DeviceStatus::MovingToStored => "moving to stored position",
            DeviceStatus::MovingAbsolute => "moving (absolute)",
            DeviceStatus::MovingRelative => "moving (relative)",
            DeviceStatus::MovingAtSpeed => "moving at constant speed",
            DeviceStatus::Stopping => "stopping",
            DeviceStatus::Other(_) => "unknown",
        }
    }
}

/// Status of one device on the chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StatusReport {
    pub device_id: u8,
    pub status: DeviceStatus,
}

impl From<Position> for StatusReport {
    fn from(value: Position) -> Self {
        Self {
            device_id: value.device_id,
            status: DeviceStatus::from_code(value.position),
        }
    }
}
