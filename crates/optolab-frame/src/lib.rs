//! Fixed-size command framing for daisy-chained linear actuators.
//!
//! Every message on the wire, in both directions, is exactly six bytes:
//! - 1 byte device number (0 addresses every device on the chain)
//! - 1 byte command code
//! - 4 bytes little-endian signed data
//!
//! There is no header, checksum, or delimiter, so framing depends entirely
//! on never losing byte alignment. [`FramedTransport`] keeps a reassembly
//! buffer and hands out whole frames only.

#[cfg(feature = "async")]
pub mod async_codec;
pub mod command;
pub mod codec;
pub mod error;
pub mod framed;

#[cfg(feature = "async")]
pub use async_codec::ActuatorCodec;
pub use codec::{decode_frame, encode_frame, Frame, BROADCAST, FRAME_SIZE};
pub use command::command_name;
pub use error::{FrameError, Result};
pub use framed::FramedTransport;
