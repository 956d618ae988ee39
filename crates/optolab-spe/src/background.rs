use ndarray::Array3;
use tracing::debug;

use crate::error::SubtractError;
use crate::frame::SpeFrame;

/// Subtract `background` from `image`, sample by sample, in `f64`.
///
/// Both files must have the same `[frames, y, x]` shape and bit-identical
/// wavelength axes.
pub fn subtract_background(
    image: &SpeFrame,
    background: &SpeFrame,
) -> Result<Array3<f64>, SubtractError> {
    let image_shape = image.data().shape();
    let background_shape = background.data().shape();
    if image_shape != background_shape {
        return Err(SubtractError::ShapeMismatch {
            image: image_shape,
            background: background_shape,
        });
    }

    let mismatch = image
        .wavelength_axis()
        .iter()
        .zip(background.wavelength_axis().iter())
        .enumerate()
        .find(|(_, (a, b))| a != b);
    if let Some((index, (&image, &background))) = mismatch {
        return Err(SubtractError::WavelengthMismatch {
            index,
            image,
            background,
        });
    }

    debug!(shape = ?image_shape, "subtracting background");
    Ok(image.data().to_f64() - background.data().to_f64())
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use ndarray::array;

    use super::*;
    use crate::decode::decode;
    use crate::header::tests::raw_header;

    fn frame(x: u16, y: u16, c0: f64, values: &[u16]) -> SpeFrame {
        let mut bytes = raw_header(x, y, 1, 3, [c0, 1.0, 0.0, 0.0, 0.0, 0.0]);
        bytes.extend(values.iter().flat_map(|v| v.to_le_bytes()));
        decode(Cursor::new(bytes)).unwrap()
    }

    #[test]
    fn unsigned_subtraction_goes_negative() {
        let image = frame(2, 1, 500.0, &[10, 3]);
        let background = frame(2, 1, 500.0, &[4, 5]);
        let diff = subtract_background(&image, &background).unwrap();
        assert_eq!(diff, array![[[6.0, -2.0]]]);
    }

    #[test]
    fn shape_mismatch() {
        let image = frame(2, 1, 500.0, &[1, 2]);
        let background = frame(1, 2, 500.0, &[1, 2]);
        let err = subtract_background(&image, &background).unwrap_err();
        assert!(matches!(err, SubtractError::ShapeMismatch { .. }));
    }

    #[test]
    fn wavelength_mismatch() {
        let image = frame(2, 1, 500.0, &[1, 2]);
        let background = frame(2, 1, 500.5, &[1, 2]);
        let err = subtract_background(&image, &background).unwrap_err();
        assert!(matches!(
            err,
            SubtractError::WavelengthMismatch { index: 0, .. }
        ));
    }
}
