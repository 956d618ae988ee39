use ndarray::Array1;
use serde::Serialize;
use tracing::debug;

use crate::datatype::Datatype;
use crate::error::{DecodeError, Result};

/// Size of the fixed header. The pixel payload starts right after it.
pub const HEADER_SIZE: usize = 4100;

/// Pixel-position / calibration-value pairs stored in the header.
pub const CALIBRATION_POINTS: usize = 10;

/// Polynomial coefficients stored in the header.
pub const POLYNOMIAL_COEFFICIENTS: usize = 6;

const DETECTOR_X_DIM: usize = 6;
const DETECTOR_Y_DIM: usize = 18;
const X_DIM: usize = 42;
const DATATYPE: usize = 108;
const Y_DIM: usize = 656;
const NUM_FRAMES: usize = 1446;

const X_CALIBRATION: usize = 3000;
const POLYNOM_ORDER: usize = X_CALIBRATION + 101;
const CALIB_COUNT: usize = POLYNOM_ORDER + 1;
const PIXEL_POSITION: usize = CALIB_COUNT + 1;
const CALIB_VALUE: usize = PIXEL_POSITION + 8 * CALIBRATION_POINTS;
const POLYNOM_COEFF: usize = CALIB_VALUE + 8 * CALIBRATION_POINTS;

/// Wavelength calibration of the x axis.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Calibration {
    pub polynom_order: u8,
    pub calib_count: u8,
    /// Reference pixel positions, cut to the points in use.
    pub pixel_positions: Vec<f64>,
    /// Reference wavelengths, cut to the points in use.
    pub calib_values: Vec<f64>,
    pub coefficients: [f64; POLYNOMIAL_COEFFICIENTS],
}

impl Calibration {
    /// Number of stored reference points kept for a given `calib_count`.
    ///
    /// Files in the wild are read as `points[..count - 1]` with the end
    /// index wrapping from the back when negative, so a count of 0 keeps 9
    /// points and a count of 1 keeps none.
    pub fn points_in_use(calib_count: u8) -> usize {
        match calib_count {
            0 => CALIBRATION_POINTS - 1,
            n => usize::from(n - 1).min(CALIBRATION_POINTS),
        }
    }

    /// Wavelength of pixel column `index`: `c0 + c1*i + c2*i^2`.
    ///
    /// Only the first three coefficients contribute.
    pub fn wavelength_at(&self, index: usize) -> f64 {
        let [c0, c1, c2, ..] = self.coefficients;
        let i = index as f64;
        c0 + c1 * i + c2 * i * i
    }

    /// Wavelength axis for `len` pixel columns.
    pub fn wavelength_axis(&self, len: usize) -> Array1<f64> {
        Array1::from_iter((0..len).map(|i| self.wavelength_at(i)))
    }
}

/// Fields of the fixed SPE header.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpeHeader {
    pub x_dim: u32,
    pub y_dim: u32,
    pub num_frames: u32,
    pub datatype: Datatype,
    /// Full detector width in pixels.
    pub detector_x_dim: u16,
    /// Full detector height in pixels.
    pub detector_y_dim: u16,
    pub calibration: Calibration,
}

impl SpeHeader {
    /// Parse the first [`HEADER_SIZE`] bytes of an SPE file.
    pub fn parse(raw: &[u8]) -> Result<Self> {
        if raw.len() < HEADER_SIZE {
            return Err(DecodeError::CorruptHeader(format!(
                "header needs {HEADER_SIZE} bytes, file has {}",
                raw.len()
            )));
        }

        let x_dim = u16_at(raw, X_DIM);
        let y_dim = u16_at(raw, Y_DIM);
        let num_frames = i32_at(raw, NUM_FRAMES);
        // A frame with no pixels cannot be reshaped or calibrated. Zero frames
        // is a header-only acquisition and decodes to an empty buffer.
        if x_dim == 0 || y_dim == 0 {
            return Err(DecodeError::CorruptHeader(format!(
                "image dimensions {x_dim}x{y_dim}"
            )));
        }
        let num_frames = u32::try_from(num_frames).map_err(|_| {
            DecodeError::CorruptHeader(format!("negative frame count {num_frames}"))
        })?;

        let code = u16_at(raw, DATATYPE);
        let datatype = Datatype::from_code(code).ok_or(DecodeError::InvalidDatatype(code))?;

        let calib_count = raw[CALIB_COUNT];
        let in_use = Calibration::points_in_use(calib_count);
        let calibration = Calibration {
            polynom_order: raw[POLYNOM_ORDER],
            calib_count,
            pixel_positions: (0..in_use)
                .map(|i| f64_at(raw, PIXEL_POSITION + 8 * i))
                .collect(),
            calib_values: (0..in_use)
                .map(|i| f64_at(raw, CALIB_VALUE + 8 * i))
                .collect(),
            coefficients: std::array::from_fn(|i| f64_at(raw, POLYNOM_COEFF + 8 * i)),
        };

        let header = Self {
            x_dim: u32::from(x_dim),
            y_dim: u32::from(y_dim),
            num_frames,
            datatype,
            detector_x_dim: u16_at(raw, DETECTOR_X_DIM),
            detector_y_dim: u16_at(raw, DETECTOR_Y_DIM),
            calibration,
        };
        debug!(
            x_dim = header.x_dim,
            y_dim = header.y_dim,
            num_frames = header.num_frames,
            datatype = %header.datatype,
            "parsed SPE header"
        );
        Ok(header)
    }

    /// Samples in the payload, or `None` if the count overflows `usize`.
    pub fn sample_count(&self) -> Option<usize> {
        (self.x_dim as usize)
            .checked_mul(self.y_dim as usize)?
            .checked_mul(self.num_frames as usize)
    }

    /// Payload size in bytes, or `None` on overflow.
    pub fn payload_len(&self) -> Option<usize> {
        self.sample_count()?.checked_mul(self.datatype.size())
    }

    /// `[num_frames, y_dim, x_dim]`.
    pub fn shape(&self) -> [usize; 3] {
        [
            self.num_frames as usize,
            self.y_dim as usize,
            self.x_dim as usize,
        ]
    }

    pub fn wavelength_axis(&self) -> Array1<f64> {
        self.calibration.wavelength_axis(self.x_dim as usize)
    }
}

fn u16_at(raw: &[u8], offset: usize) -> u16 {
    u16::from_le_bytes([raw[offset], raw[offset + 1]])
}

fn i32_at(raw: &[u8], offset: usize) -> i32 {
    let mut bytes = [0u8; 4];
    bytes.copy_from_slice(&raw[offset..offset + 4]);
    i32::from_le_bytes(bytes)
}

fn f64_at(raw: &[u8], offset: usize) -> f64 {
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&raw[offset..offset + 8]);
    f64::from_le_bytes(bytes)
}
