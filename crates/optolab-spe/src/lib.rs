//! Decoder for SPE spectroscopy image files.
//!
//! An SPE file is a 4100-byte fixed-offset header followed by a raw
//! little-endian pixel payload of `num_frames * y_dim * x_dim` samples. The
//! header also carries a polynomial wavelength calibration for the x axis.
//!
//! ```no_run
//! let frame = optolab_spe::decode_path("scan.spe")?;
//! println!("{:?} frames of {}", frame.data().shape(), frame.header().datatype);
//! # Ok::<(), optolab_spe::DecodeError>(())
//! ```

pub mod background;
pub mod datatype;
pub mod decode;
pub mod error;
pub mod frame;
pub mod header;

pub use background::subtract_background;
pub use datatype::Datatype;
pub use decode::{
    decode, decode_path, decode_path_with_config, decode_with_config, DecodeConfig,
    DEFAULT_MAX_PAYLOAD,
};
pub use error::{DecodeError, Result, SubtractError};
pub use frame::{FrameStats, SpeData, SpeFrame};
pub use header::{Calibration, SpeHeader, CALIBRATION_POINTS, HEADER_SIZE, POLYNOMIAL_COEFFICIENTS};
