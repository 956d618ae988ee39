//! Lets the controller act as the swept device in an `optolab-sweep` run.
//! Channels are the controller's output numbers, values are volts.

use optolab_sweep::Device;
use optolab_transport::ByteTransport;

use crate::controller::Lcvr;
use crate::error::LcvrError;

impl<T: ByteTransport> Device for Lcvr<T> {
    type Channel = u8;
    type Error = LcvrError;

    fn set_value(&mut self, channel: u8, value: f64) -> Result<(), LcvrError> {
        self.set_voltage(channel, value)
    }

    fn get_value(&mut self, channel: u8) -> Result<f64, LcvrError> {
        self.get_voltage(channel)
    }
}

#[cfg(test)]
mod tests {
    use optolab_sweep::{drive, StepRecord, SweepController, SweepRange};

    use super::*;
    use crate::sim::SimulatedLcvr;

    #[test]
    fn voltage_sweep_reads_back_truncated_counts() {
        let mut lcvr = Lcvr::new(SimulatedLcvr::new());
        let mut sweep = SweepController::new(SweepRange::new(0.0, 1.0, 0.25).unwrap());
        let mut records: Vec<StepRecord> = Vec::new();

        drive(&mut sweep, &mut lcvr, 2, &mut records).unwrap();

        assert_eq!(records.len(), 5);
        for record in &records {
            assert!(record.reading <= record.setpoint);
            assert!(record.setpoint - record.reading < 1.0 / 6553.5);
        }
        assert_eq!(lcvr.get_ref().counts(2), Some(6553));
    }

    #[test]
    fn out_of_range_setpoint_fails_the_step() {
        let mut lcvr = Lcvr::new(SimulatedLcvr::new());
        let mut sweep = SweepController::new(SweepRange::new(9.0, 11.0, 1.0).unwrap());
        let mut records: Vec<StepRecord> = Vec::new();

        let err = drive(&mut sweep, &mut lcvr, 1, &mut records).unwrap_err();
        assert_eq!(err.step_index(), Some(11_000));
        assert_eq!(records.len(), 2);
    }
}
