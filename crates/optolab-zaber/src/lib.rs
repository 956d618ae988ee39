//! Driver for daisy-chained Zaber linear actuators speaking the binary protocol.
//!
//! An [`Actuator`] owns one byte transport to the head of a chain. Commands
//! go to a single device or to the whole chain ([`Target`]); broadcast replies
//! are aggregated and returned in device order. Device-side rejections become
//! typed [`ActuatorError::Device`] values carrying a [`DeviceErrorCode`].
//!
//! The chain size is learned by the renumber handshake, which
//! [`connect_with_config`] performs before handing the actuator back.

pub mod actuator;
pub mod codes;
pub mod config;
pub mod connector;
#[cfg(feature = "sweep")]
pub mod device;
pub mod error;
pub mod reply;
pub mod sim;
pub mod target;

pub use actuator::Actuator;
pub use codes::DeviceErrorCode;
pub use config::ActuatorConfig;
pub use connector::{connect, connect_with_config};
#[cfg(feature = "serial")]
pub use connector::{open_serial, open_serial_with_config};
pub use error::{ActuatorError, Result};
pub use reply::{DeviceStatus, Position, Reply, StatusReport};
pub use sim::SimulatedChain;
pub use target::{DeviceId, Target};
