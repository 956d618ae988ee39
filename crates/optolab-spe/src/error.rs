use std::path::PathBuf;

/// Errors that can occur while decoding an SPE file.
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    /// The file does not exist.
    #[error("file not found: {}", path.display())]
    NotFound { path: PathBuf },

    /// The header names a sample type outside the four known codes.
    #[error("invalid datatype code {0} (expected 0-3)")]
    InvalidDatatype(u16),

    /// The payload holds fewer samples than the header promises.
    #[error("payload truncated: expected {expected} samples, found {actual}")]
    Truncated { expected: usize, actual: usize },

    /// The header is short or describes an impossible image.
    #[error("corrupt header: {0}")]
    CorruptHeader(String),

    /// An I/O error occurred while reading the file.
    #[error("SPE I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors from [`crate::subtract_background`].
#[derive(Debug, thiserror::Error)]
pub enum SubtractError {
    /// Image and background have different `[frames, y, x]` shapes.
    #[error("background shape {background:?} does not match image shape {image:?}")]
    ShapeMismatch {
        image: [usize; 3],
        background: [usize; 3],
    },

    /// The calibrated wavelength axes differ.
    #[error("wavelength axes differ at pixel {index}: image {image}, background {background}")]
    WavelengthMismatch {
        index: usize,
        image: f64,
        background: f64,
    },
}

pub type Result<T> = std::result::Result<T, DecodeError>;
