//! Driver for the Meadowlark D3050 liquid-crystal voltage controller.
//!
//! The controller speaks a `\r`-terminated ASCII protocol at 38400 baud and
//! drives four outputs between 0 and 10 V. [`Lcvr`] works over any
//! [`optolab_transport::ByteTransport`]; [`SimulatedLcvr`] stands in for the
//! hardware in tests and dry runs. With the `sweep` feature a controller can
//! be driven by an `optolab-sweep` run.

pub mod config;
#[cfg(feature = "serial")]
pub mod connector;
pub mod controller;
#[cfg(feature = "sweep")]
pub mod device;
pub mod error;
pub mod protocol;
pub mod sim;

pub use config::{LcvrConfig, DEFAULT_MAX_LINE_LEN};
#[cfg(feature = "serial")]
pub use connector::{open_serial, open_serial_with_config, serial_settings};
pub use controller::Lcvr;
pub use error::{LcvrError, Result};
pub use protocol::{BAUD_RATE, CHANNELS, COUNTS_PER_VOLT, MAX_VOLTS};
pub use sim::{SimulatedLcvr, SIMULATED_FIRMWARE};
