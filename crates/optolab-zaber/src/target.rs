use std::fmt;
use std::num::NonZeroU8;

use optolab_frame::BROADCAST;
use serde::Serialize;

use crate::error::{ActuatorError, Result};

/// Number of a single device on the chain. Never zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(into = "u8")]
pub struct DeviceId(NonZeroU8);

impl DeviceId {
    /// Returns `None` for 0, which is reserved for broadcast on the wire.
    pub fn new(id: u8) -> Option<Self> {
        NonZeroU8::new(id).map(Self)
    }

    pub fn get(self) -> u8 {
        self.0.get()
    }
}

impl TryFrom<u8> for DeviceId {
    type Error = ActuatorError;

    fn try_from(value: u8) -> Result<Self> {
        Self::new(value).ok_or(ActuatorError::InvalidDeviceId(value))
    }
}

impl From<DeviceId> for u8 {
    fn from(value: DeviceId) -> Self {
        value.get()
    }
}

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.get())
    }
}

/// Who a command is addressed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Target {
    /// A single device; exactly one reply is expected.
    One(DeviceId),
    /// Every device on the chain; one reply per device is expected.
    All,
}

impl Target {
    /// Address a single device by number.
    pub fn one(id: u8) -> Result<Self> {
        DeviceId::try_from(id).map(Target::One)
    }

    /// `Some(id)` selects one device, `None` the whole chain.
    pub fn from_option(id: Option<u8>) -> Result<Self> {
        match id {
            Some(id) => Self::one(id),
            None => Ok(Target::All),
        }
    }

    /// Device byte to put on the wire.
    pub fn wire_id(self) -> u8 {
        match self {
            Target::One(id) => id.get(),
            Target::All => BROADCAST,
        }
    }

    pub fn is_broadcast(self) -> bool {
        matches!(self, Target::All)
    }
}

impl From<DeviceId> for Target {
    fn from(value: DeviceId) -> Self {
        Target::One(value)
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Target::One(id) => write!(f, "device {id}"),
            Target::All => f.write_str("all devices"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_is_not_a_device() {
        assert!(DeviceId::new(0).is_none());
        assert!(matches!(
            Target::one(0),
            Err(ActuatorError::InvalidDeviceId(0))
        ));
    }

    #[test]
    fn wire_ids() {
        assert_eq!(Target::one(3).unwrap().wire_id(), 3);
        assert_eq!(Target::All.wire_id(), 0);
        assert!(Target::All.is_broadcast());
    }

    #[test]
    fn from_option_maps_none_to_broadcast() {
        assert_eq!(Target::from_option(None).unwrap(), Target::All);
        assert_eq!(
            Target::from_option(Some(2)).unwrap(),
            Target::One(DeviceId::new(2).unwrap())
        );
    }
}
