use std::fmt;

use serde::Serialize;

use crate::controller::{SweepController, SweepOutcome};
use crate::error::{BoxError, Result, SweepError};
use crate::nested::NestedSweep;

/// Something a sweep can set and read back.
pub trait Device {
    /// How a channel (output, axis, device number) is addressed.
    type Channel: Copy + fmt::Debug;
    /// Device-specific failure.
    type Error: std::error::Error + Send + Sync + 'static;

    fn set_value(&mut self, channel: Self::Channel, value: f64) -> std::result::Result<(), Self::Error>;

    fn get_value(&mut self, channel: Self::Channel) -> std::result::Result<f64, Self::Error>;
}

impl<D: Device + ?Sized> Device for &mut D {
    type Channel = D::Channel;
    type Error = D::Error;

    fn set_value(&mut self, channel: Self::Channel, value: f64) -> std::result::Result<(), Self::Error> {
        (**self).set_value(channel, value)
    }

    fn get_value(&mut self, channel: Self::Channel) -> std::result::Result<f64, Self::Error> {
        (**self).get_value(channel)
    }
}

/// One completed sweep step.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct StepRecord {
    /// Fixed-point index of the step.
    pub index: i64,
    /// Value requested from the device.
    pub setpoint: f64,
    /// Value the device reported afterwards.
    pub reading: f64,
    /// Outer-loop setpoint, for nested sweeps.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outer_setpoint: Option<f64>,
}

/// Receives step records as a sweep runs.
pub trait DataSink {
    type Error: std::error::Error + Send + Sync + 'static;

    fn record(&mut self, record: &StepRecord) -> std::result::Result<(), Self::Error>;

    /// Called once when the sweep ends, whether completed or cancelled.
    fn finish(&mut self) -> std::result::Result<(), Self::Error> {
        Ok(())
    }
}

impl DataSink for Vec<StepRecord> {
    type Error = std::convert::Infallible;

    fn record(&mut self, record: &StepRecord) -> std::result::Result<(), Self::Error> {
        self.push(*record);
        Ok(())
    }
}

impl<S: DataSink + ?Sized> DataSink for &mut S {
    type Error = S::Error;

    fn record(&mut self, record: &StepRecord) -> std::result::Result<(), Self::Error> {
        (**self).record(record)
    }

    fn finish(&mut self) -> std::result::Result<(), Self::Error> {
        (**self).finish()
    }
}

/// Sweep `device` on `channel`: set each value, read it back, record it.
pub fn drive<D, S>(
    sweep: &mut SweepController,
    device: &mut D,
    channel: D::Channel,
    sink: &mut S,
) -> Result<SweepOutcome>
where
    D: Device,
    S: DataSink,
{
    let range = *sweep.range();
    let outcome = sweep.run(|index| -> std::result::Result<(), BoxError> {
        let setpoint = range.value_of(index);
        device.set_value(channel, setpoint)?;
        let reading = device.get_value(channel)?;
        sink.record(&StepRecord {
            index,
            setpoint,
            reading,
            outer_setpoint: None,
        })?;
        Ok(())
    });
    finish_sink(sink, outcome)
}

/// Nested version of [`drive`]: the outer device is set at each outer step,
/// then the inner device is swept and recorded.
pub fn drive_nested<O, I, S>(
    sweep: &mut NestedSweep,
    outer_device: &mut O,
    outer_channel: O::Channel,
    inner_device: &mut I,
    inner_channel: I::Channel,
    sink: &mut S,
) -> Result<SweepOutcome>
where
    O: Device,
    I: Device,
    S: DataSink,
{
    let outer_range = *sweep.outer();
    let inner_range = *sweep.inner();
    let outcome = sweep.run(
        |outer_index| -> std::result::Result<(), BoxError> {
            outer_device.set_value(outer_channel, outer_range.value_of(outer_index))?;
            Ok(())
        },
        |outer_index, inner_index| -> std::result::Result<(), BoxError> {
            let setpoint = inner_range.value_of(inner_index);
            inner_device.set_value(inner_channel, setpoint)?;
            let reading = inner_device.get_value(inner_channel)?;
            sink.record(&StepRecord {
                index: inner_index,
                setpoint,
                reading,
                outer_setpoint: Some(outer_range.value_of(outer_index)),
            })?;
            Ok(())
        },
    );
    finish_sink(sink, outcome)
}

fn finish_sink<S: DataSink>(sink: &mut S, outcome: Result<SweepOutcome>) -> Result<SweepOutcome> {
    let finished = sink.finish().map_err(|err| SweepError::Sink(Box::new(err)));
    let outcome = outcome?;
    finished?;
    Ok(outcome)
}
