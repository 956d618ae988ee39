use ndarray::{Array1, Array3, ArrayView2, Axis};
use serde::Serialize;

use crate::datatype::Datatype;
use crate::header::SpeHeader;

/// Decoded pixel payload, shaped `[num_frames, y_dim, x_dim]`.
#[derive(Debug, Clone, PartialEq)]
pub enum SpeData {
    Float32(Array3<f32>),
    Int32(Array3<i32>),
    Int16(Array3<i16>),
    UInt16(Array3<u16>),
}

/// Summary of one frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FrameStats {
    pub frame: usize,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
}

impl SpeData {
    pub fn datatype(&self) -> Datatype {
        match self {
            SpeData::Float32(_) => Datatype::Float32,
            SpeData::Int32(_) => Datatype::Int32,
            SpeData::Int16(_) => Datatype::Int16,
            SpeData::UInt16(_) => Datatype::UInt16,
        }
    }

    /// `[num_frames, y_dim, x_dim]`.
    pub fn shape(&self) -> [usize; 3] {
        let (frames, rows, cols) = match self {
            SpeData::Float32(a) => a.dim(),
            SpeData::Int32(a) => a.dim(),
            SpeData::Int16(a) => a.dim(),
            SpeData::UInt16(a) => a.dim(),
        };
        [frames, rows, cols]
    }

    pub fn num_frames(&self) -> usize {
        self.shape()[0]
    }

    /// Widen every sample to `f64`.
    pub fn to_f64(&self) -> Array3<f64> {
        match self {
            SpeData::Float32(a) => a.mapv(f64::from),
            SpeData::Int32(a) => a.mapv(f64::from),
            SpeData::Int16(a) => a.mapv(f64::from),
            SpeData::UInt16(a) => a.mapv(f64::from),
        }
    }

    /// Min, max and mean of `frame`, or `None` if there is no such frame.
    pub fn frame_stats(&self, frame: usize) -> Option<FrameStats> {
        if frame >= self.num_frames() {
            return None;
        }
        let (min, max, mean) = match self {
            SpeData::Float32(a) => summarize(a.index_axis(Axis(0), frame)),
            SpeData::Int32(a) => summarize(a.index_axis(Axis(0), frame)),
            SpeData::Int16(a) => summarize(a.index_axis(Axis(0), frame)),
            SpeData::UInt16(a) => summarize(a.index_axis(Axis(0), frame)),
        }?;
        Some(FrameStats {
            frame,
            min,
            max,
            mean,
        })
    }
}

fn summarize<T: Copy + Into<f64>>(view: ArrayView2<'_, T>) -> Option<(f64, f64, f64)> {
    let mut values = view.iter().map(|&v| v.into());
    let first = values.next()?;
    let (mut min, mut max, mut sum, mut count) = (first, first, first, 1usize);
    for v in values {
        min = min.min(v);
        max = max.max(v);
        sum += v;
        count += 1;
    }
    Some((min, max, sum / count as f64))
}

/// A decoded SPE file: header, samples and wavelength axis.
#[derive(Debug, Clone, PartialEq)]
pub struct SpeFrame {
    header: SpeHeader,
    data: SpeData,
    wavelength_axis: Array1<f64>,
}

impl SpeFrame {
    pub(crate) fn new(header: SpeHeader, data: SpeData) -> Self {
        let wavelength_axis = header.wavelength_axis();
        Self {
            header,
            data,
            wavelength_axis,
        }
    }

    pub fn header(&self) -> &SpeHeader {
        &self.header
    }

    pub fn data(&self) -> &SpeData {
        &self.data
    }

    /// One wavelength per pixel column.
    pub fn wavelength_axis(&self) -> &Array1<f64> {
        &self.wavelength_axis
    }

    pub fn into_parts(self) -> (SpeHeader, SpeData, Array1<f64>) {
        (self.header, self.data, self.wavelength_axis)
    }
}
