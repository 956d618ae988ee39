//! Byte-stream transport abstraction for serial lab instruments.
//!
//! Instruments in this workspace speak over a blocking byte stream with a
//! small contract: write everything, read an exact count, ask how many bytes
//! are waiting, and discard buffered input or output. This is the lowest
//! layer of optolab; protocol crates build on [`ByteTransport`].
//!
//! - [`SerialTransport`] talks to a real port (feature `serial`, on by default)
//! - [`MemoryTransport`] is a scripted in-process stream for tests and replays

pub mod error;
pub mod memory;
#[cfg(feature = "serial")]
pub mod serial;
pub mod traits;

pub use error::{Result, TransportError};
pub use memory::MemoryTransport;
#[cfg(feature = "serial")]
pub use serial::{available_ports, PortSummary, SerialSettings, SerialTransport};
pub use traits::ByteTransport;
