use std::fs::File;
use std::io::{BufReader, ErrorKind, Read};
use std::path::Path;

use ndarray::Array3;
use tracing::debug;

use crate::datatype::Datatype;
use crate::error::{DecodeError, Result};
use crate::frame::{SpeData, SpeFrame};
use crate::header::{SpeHeader, HEADER_SIZE};

/// Default payload limit: 1 GiB.
pub const DEFAULT_MAX_PAYLOAD: usize = 1024 * 1024 * 1024;

/// Configuration for the decoder.
#[derive(Debug, Clone)]
pub struct DecodeConfig {
    /// Largest payload the decoder will allocate, in bytes. Headers that
    /// describe more are rejected as corrupt. Default: 1 GiB.
    pub max_payload_bytes: usize,
}

impl Default for DecodeConfig {
    fn default() -> Self {
        Self {
            max_payload_bytes: DEFAULT_MAX_PAYLOAD,
        }
    }
}

/// Decode the SPE file at `path`.
pub fn decode_path(path: impl AsRef<Path>) -> Result<SpeFrame> {
    decode_path_with_config(path, &DecodeConfig::default())
}

/// Decode the SPE file at `path` with explicit limits.
pub fn decode_path_with_config(path: impl AsRef<Path>, config: &DecodeConfig) -> Result<SpeFrame> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|err| match err.kind() {
        ErrorKind::NotFound => DecodeError::NotFound {
            path: path.to_path_buf(),
        },
        _ => DecodeError::Io(err),
    })?;
    debug!(path = %path.display(), "decoding SPE file");
    decode_with_config(BufReader::new(file), config)
}

/// Decode an SPE image from any byte source.
pub fn decode<R: Read>(reader: R) -> Result<SpeFrame> {
    decode_with_config(reader, &DecodeConfig::default())
}

/// Decode an SPE image from any byte source with explicit limits.
pub fn decode_with_config<R: Read>(mut reader: R, config: &DecodeConfig) -> Result<SpeFrame> {
    let mut raw = Vec::with_capacity(HEADER_SIZE);
    (&mut reader)
        .take(HEADER_SIZE as u64)
        .read_to_end(&mut raw)?;
    let header = SpeHeader::parse(&raw)?;

    let expected = header.sample_count().ok_or_else(|| {
        DecodeError::CorruptHeader(format!("sample count overflows for shape {:?}", header.shape()))
    })?;
    let payload_len = header
        .payload_len()
        .filter(|len| *len <= config.max_payload_bytes)
        .ok_or_else(|| {
            DecodeError::CorruptHeader(format!(
                "payload of {expected} {} samples exceeds the {} byte limit",
                header.datatype, config.max_payload_bytes
            ))
        })?;

    let mut payload = Vec::with_capacity(payload_len);
    reader.take(payload_len as u64).read_to_end(&mut payload)?;
    if payload.len() < payload_len {
        return Err(DecodeError::Truncated {
            expected,
            actual: payload.len() / header.datatype.size(),
        });
    }

    let shape = header.shape();
    let data = match header.datatype {
        Datatype::Float32 => SpeData::Float32(reshape(shape, samples(&payload, f32::from_le_bytes))?),
        Datatype::Int32 => SpeData::Int32(reshape(shape, samples(&payload, i32::from_le_bytes))?),
        Datatype::Int16 => SpeData::Int16(reshape(shape, samples(&payload, i16::from_le_bytes))?),
        Datatype::UInt16 => SpeData::UInt16(reshape(shape, samples(&payload, u16::from_le_bytes))?),
    };
    debug!(?shape, datatype = %header.datatype, "decoded SPE payload");
    Ok(SpeFrame::new(header, data))
}

fn samples<T, const N: usize>(payload: &[u8], from_le: fn([u8; N]) -> T) -> Vec<T> {
    payload
        .chunks_exact(N)
        .map(|chunk| {
            let mut bytes = [0u8; N];
            bytes.copy_from_slice(chunk);
            from_le(bytes)
        })
        .collect()
}

fn reshape<T>(shape: [usize; 3], values: Vec<T>) -> Result<Array3<T>> {
    Array3::from_shape_vec((shape[0], shape[1], shape[2]), values)
        .map_err(|err| DecodeError::CorruptHeader(format!("cannot shape payload as {shape:?}: {err}")))
}

#[cfg(test)]
mod tests {
    use std::io::{Cursor, Write};

    use ndarray::array;

    use super::*;
    use crate::header::tests::raw_header;

    fn spe_bytes(x: u16, y: u16, frames: i32, datatype: u16, payload: &[u8]) -> Vec<u8> {
        let mut bytes = raw_header(x, y, frames, datatype, [700.0, 0.1, 0.0, 0.0, 0.0, 0.0]);
        bytes.extend_from_slice(payload);
        bytes
    }

    fn le_u16(values: &[u16]) -> Vec<u8> {
        values.iter().flat_map(|v| v.to_le_bytes()).collect()
    }

    #[test]
    fn decodes_uint16_frame() {
        let bytes = spe_bytes(2, 2, 1, 3, &le_u16(&[1, 2, 3, 4]));
        let frame = decode(Cursor::new(bytes)).unwrap();
        assert_eq!(frame.data(), &SpeData::UInt16(array![[[1, 2], [3, 4]]]));
        assert_eq!(frame.wavelength_axis().len(), 2);
    }

    #[test]
    fn decodes_signed_and_float_types() {
        let ints: Vec<u8> = [-5i32, 7].iter().flat_map(|v| v.to_le_bytes()).collect();
        let frame = decode(Cursor::new(spe_bytes(2, 1, 1, 1, &ints))).unwrap();
        assert_eq!(frame.data(), &SpeData::Int32(array![[[-5, 7]]]));

        let shorts: Vec<u8> = [-1i16, 2].iter().flat_map(|v| v.to_le_bytes()).collect();
        let frame = decode(Cursor::new(spe_bytes(1, 1, 2, 2, &shorts))).unwrap();
        assert_eq!(frame.data(), &SpeData::Int16(array![[[-1]], [[2]]]));

        let floats: Vec<u8> = [0.5f32, -1.25].iter().flat_map(|v| v.to_le_bytes()).collect();
        let frame = decode(Cursor::new(spe_bytes(1, 2, 1, 0, &floats))).unwrap();
        assert_eq!(frame.data(), &SpeData::Float32(array![[[0.5], [-1.25]]]));
    }

    #[test]
    fn frames_are_outermost() {
        let bytes = spe_bytes(2, 1, 2, 3, &le_u16(&[1, 2, 3, 4]));
        let frame = decode(Cursor::new(bytes)).unwrap();
        assert_eq!(frame.data().shape(), [2, 1, 2]);
        assert_eq!(frame.data().frame_stats(1).unwrap().min, 3.0);
    }

    #[test]
    fn trailing_bytes_are_ignored() {
        let bytes = spe_bytes(2, 1, 1, 3, &le_u16(&[1, 2, 99, 99]));
        let frame = decode(Cursor::new(bytes)).unwrap();
        assert_eq!(frame.data(), &SpeData::UInt16(array![[[1, 2]]]));
    }

    #[test]
    fn zero_frames_decode_to_empty_buffer() {
        let frame = decode(Cursor::new(spe_bytes(3, 2, 0, 3, &[]))).unwrap();
        assert_eq!(frame.header().num_frames, 0);
        assert_eq!(frame.data().shape(), [0, 2, 3]);
        assert_eq!(frame.data().frame_stats(0), None);
        assert_eq!(frame.wavelength_axis().len(), 3);
    }

    #[test]
    fn short_payload_is_truncated() {
        let bytes = spe_bytes(2, 2, 1, 3, &le_u16(&[1, 2, 3]));
        let err = decode(Cursor::new(bytes)).unwrap_err();
        assert!(matches!(
            err,
            DecodeError::Truncated {
                expected: 4,
                actual: 3
            }
        ));
    }

    #[test]
    fn invalid_datatype() {
        let bytes = spe_bytes(2, 2, 1, 9, &le_u16(&[1, 2, 3, 4]));
        let err = decode(Cursor::new(bytes)).unwrap_err();
        assert!(matches!(err, DecodeError::InvalidDatatype(9)));
    }

    #[test]
    fn oversized_payload_is_rejected_before_reading() {
        let bytes = spe_bytes(1000, 1000, 1000, 0, &[]);
        let config = DecodeConfig {
            max_payload_bytes: 1024,
        };
        let err = decode_with_config(Cursor::new(bytes), &config).unwrap_err();
        assert!(matches!(err, DecodeError::CorruptHeader(_)));
    }

    #[test]
    fn decodes_from_disk() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(&spe_bytes(2, 2, 1, 3, &le_u16(&[1, 2, 3, 4])))
            .unwrap();
        let frame = decode_path(file.path()).unwrap();
        assert_eq!(frame.header().x_dim, 2);
    }

    #[test]
    fn missing_file_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let err = decode_path(dir.path().join("missing.spe")).unwrap_err();
        assert!(matches!(err, DecodeError::NotFound { .. }));
    }
}
