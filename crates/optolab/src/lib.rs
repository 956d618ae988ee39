//! Lab automation toolkit for optical experiments.
//!
//! optolab drives daisy-chained linear actuators and liquid-crystal voltage
//! controllers over serial links, runs pausable parameter sweeps across
//! them, and decodes SPE spectroscopy files.
//!
//! # Crate Structure
//!
//! - [`transport`]: blocking byte transports (serial ports, in-memory)
//! - [`frame`]: the actuators' fixed 6-byte command frames
//! - [`zaber`]: actuator chain driver, error codes and simulator
//! - [`lcvr`]: voltage controller driver and simulator
//! - [`sweep`]: pause / resume / kill sweep controller
//! - [`spe`]: SPE file decoder and background subtraction

/// Re-export transport types.
pub mod transport {
    pub use optolab_transport::*;
}

/// Re-export frame types.
pub mod frame {
    pub use optolab_frame::*;
}

/// Re-export actuator types.
pub mod zaber {
    pub use optolab_zaber::*;
}

/// Re-export voltage controller types.
pub mod lcvr {
    pub use optolab_lcvr::*;
}

/// Re-export sweep types.
pub mod sweep {
    pub use optolab_sweep::*;
}

/// Re-export SPE decoder types.
pub mod spe {
    pub use optolab_spe::*;
}
