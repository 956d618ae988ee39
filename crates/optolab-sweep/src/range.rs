use serde::Serialize;

use crate::error::{Result, SweepError};

/// Fixed-point scale for physical values: 1 unit = 1/1000.
pub const MILLI: i64 = 1000;

// Largest magnitude an f64 can hold without losing integer precision.
const MAX_FIXED: f64 = 9_007_199_254_740_992.0;

/// Inclusive range of fixed-point indices.
///
/// Indices are integers so that stepping never accumulates floating-point
/// drift; `scale` converts an index back to a physical value. The direction
/// is taken from the bounds: a range whose start is above its end counts
/// down, whatever sign the step was given with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SweepRange {
    start: i64,
    end: i64,
    step: i64,
    scale: i64,
}

impl SweepRange {
    /// Range over physical values, stored in milli-units (rounded to the
    /// nearest thousandth).
    pub fn new(start: f64, end: f64, step: f64) -> Result<Self> {
        Self::build(
            to_fixed(start, "start")?,
            to_fixed(end, "end")?,
            to_fixed(step, "step")?,
            MILLI,
        )
    }

    /// Range over indices already expressed in milli-units.
    pub fn from_milli(start: i64, end: i64, step: i64) -> Result<Self> {
        Self::build(start, end, step, MILLI)
    }

    /// Range over plain integer units (e.g. actuator microsteps).
    pub fn from_units(start: i64, end: i64, step: i64) -> Result<Self> {
        Self::build(start, end, step, 1)
    }

    fn build(start: i64, end: i64, step: i64, scale: i64) -> Result<Self> {
        if step == 0 {
            return Err(SweepError::InvalidRange("step must not be zero".to_string()));
        }
        for (name, value) in [("start", start), ("end", end), ("step", step)] {
            if (value as f64).abs() > MAX_FIXED {
                return Err(SweepError::InvalidRange(format!(
                    "{name} {value} is out of range"
                )));
            }
        }
        let magnitude = step.abs();
        let step = if start > end { -magnitude } else { magnitude };
        Ok(Self {
            start,
            end,
            step,
            scale,
        })
    }

    pub fn start(&self) -> i64 {
        self.start
    }

    pub fn end(&self) -> i64 {
        self.end
    }

    /// Signed step; negative for descending ranges.
    pub fn step(&self) -> i64 {
        self.step
    }

    /// Indices per physical unit.
    pub fn scale(&self) -> i64 {
        self.scale
    }

    pub fn is_descending(&self) -> bool {
        self.step < 0
    }

    /// Physical value of an index.
    pub fn value_of(&self, index: i64) -> f64 {
        index as f64 / self.scale as f64
    }

    /// Whether `index` lies between the bounds.
    pub fn contains(&self, index: i64) -> bool {
        let (lo, hi) = if self.start <= self.end {
            (self.start, self.end)
        } else {
            (self.end, self.start)
        };
        (lo..=hi).contains(&index)
    }

    /// Index after `index`, or `None` past the end.
    pub fn next(&self, index: i64) -> Option<i64> {
        let next = index.checked_add(self.step)?;
        let in_range = if self.is_descending() {
            next >= self.end
        } else {
            next <= self.end
        };
        in_range.then_some(next)
    }

    /// Number of indices in the range.
    pub fn len(&self) -> usize {
        let span = (self.end - self.start).unsigned_abs();
        (span / self.step.unsigned_abs()) as usize + 1
    }

    /// A range always holds at least its start.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Iterate every index in order.
    pub fn iter(&self) -> impl Iterator<Item = i64> + '_ {
        std::iter::successors(Some(self.start), move |&index| self.next(index))
    }
}

fn to_fixed(value: f64, name: &str) -> Result<i64> {
    if !value.is_finite() {
        return Err(SweepError::InvalidRange(format!("{name} must be finite")));
    }
    let scaled = (value * MILLI as f64).round();
    if scaled.abs() > MAX_FIXED {
        return Err(SweepError::InvalidRange(format!(
            "{name} {value} is out of range"
        )));
    }
    Ok(scaled as i64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inclusive_ascending_range() {
        let range = SweepRange::new(0.0, 2.0, 1.0).unwrap();
        assert_eq!(range.iter().collect::<Vec<_>>(), vec![0, 1000, 2000]);
        assert_eq!(range.len(), 3);
    }

    #[test]
    fn descending_direction_inferred_from_bounds() {
        let range = SweepRange::new(2.0, 0.0, 0.5).unwrap();
        assert!(range.is_descending());
        assert_eq!(
            range.iter().collect::<Vec<_>>(),
            vec![2000, 1500, 1000, 500, 0]
        );

        let negative_step = SweepRange::new(2.0, 0.0, -0.5).unwrap();
        assert_eq!(negative_step, range);
    }

    #[test]
    fn step_not_dividing_span_stops_before_end() {
        let range = SweepRange::new(0.0, 1.0, 0.3).unwrap();
        assert_eq!(
            range.iter().collect::<Vec<_>>(),
            vec![0, 300, 600, 900]
        );
        assert_eq!(range.len(), 4);
    }

    #[test]
    fn values_round_to_nearest_milli() {
        // 0.29 * 1000 is 289.99999999999994 in binary floating point.
        let range = SweepRange::new(0.0, 0.29, 0.29).unwrap();
        assert_eq!(range.end(), 290);
        assert!((range.value_of(290) - 0.29).abs() < 1e-12);
    }

    #[test]
    fn single_point_range() {
        let range = SweepRange::new(1.5, 1.5, 0.1).unwrap();
        assert_eq!(range.iter().collect::<Vec<_>>(), vec![1500]);
    }

    #[test]
    fn rejects_zero_and_non_finite() {
        assert!(SweepRange::new(0.0, 1.0, 0.0).is_err());
        assert!(SweepRange::new(0.0, 1.0, 0.0001).is_err());
        assert!(SweepRange::new(f64::NAN, 1.0, 0.1).is_err());
        assert!(SweepRange::new(0.0, f64::INFINITY, 0.1).is_err());
        assert!(SweepRange::from_units(0, i64::MAX, 1).is_err());
    }

    #[test]
    fn unit_scale_for_microsteps() {
        let range = SweepRange::from_units(300_000, 320_000, 10_000).unwrap();
        assert_eq!(range.value_of(310_000), 310_000.0);
        assert_eq!(range.len(), 3);
        assert!(range.contains(305_000));
        assert!(!range.contains(330_000));
    }
}
