//! Lets an actuator act as the swept device in an `optolab-sweep` run.
//!
//! Values are microstep positions. Setting a value is an absolute move;
//! reading it back asks for the current position.

use optolab_sweep::Device;
use optolab_transport::ByteTransport;

use crate::actuator::Actuator;
use crate::error::ActuatorError;
use crate::target::Target;

impl<T: ByteTransport> Device for Actuator<T> {
    type Channel = Target;
    type Error = ActuatorError;

    fn set_value(&mut self, channel: Target, value: f64) -> Result<(), ActuatorError> {
        let position = to_position(value)?;
        self.goto_absolute(channel, position)?;
        Ok(())
    }

    fn get_value(&mut self, channel: Target) -> Result<f64, ActuatorError> {
        let replies = self.get_position(channel)?;
        match replies.as_slice() {
            [only] => Ok(f64::from(only.position)),
            _ => Err(ActuatorError::DeviceCount {
                expected: 1,
                received: replies.len(),
            }),
        }
    }
}

fn to_position(value: f64) -> Result<i32, ActuatorError> {
    let rounded = value.round();
    if !rounded.is_finite() || rounded < f64::from(i32::MIN) || rounded > f64::from(i32::MAX) {
        return Err(ActuatorError::InvalidArgument(format!(
            "{value} is not a valid microstep position"
        )));
    }
    Ok(rounded as i32)
}

#[cfg(test)]
mod tests {
    use optolab_sweep::{drive, StepRecord, SweepController, SweepRange};

    use super::*;
    use crate::config::ActuatorConfig;
    use crate::sim::SimulatedChain;

    fn chain(devices: u8) -> Actuator<SimulatedChain> {
        let mut actuator =
            Actuator::with_config(SimulatedChain::new(devices), ActuatorConfig::immediate());
        actuator.renumber(Target::All, None).unwrap();
        actuator
    }

    #[test]
    fn set_value_moves_and_get_value_reads_back() {
        let mut actuator = chain(2);
        let stage = Target::one(2).unwrap();
        actuator.set_value(stage, 1234.4).unwrap();
        assert_eq!(actuator.get_value(stage).unwrap(), 1234.0);
        assert_eq!(actuator.get_ref().position_of(2), Some(1234));
        assert_eq!(actuator.get_ref().position_of(1), Some(0));
    }

    #[test]
    fn broadcast_read_is_ambiguous() {
        let mut actuator = chain(3);
        let err = actuator.get_value(Target::All).unwrap_err();
        assert!(matches!(
            err,
            ActuatorError::DeviceCount {
                expected: 1,
                received: 3
            }
        ));
    }

    #[test]
    fn non_finite_value_is_rejected_before_sending() {
        let mut actuator = chain(1);
        let sent = actuator.get_ref().received().len();
        let err = actuator
            .set_value(Target::one(1).unwrap(), f64::NAN)
            .unwrap_err();
        assert!(matches!(err, ActuatorError::InvalidArgument(_)));
        assert!(matches!(
            to_position(3.0e10),
            Err(ActuatorError::InvalidArgument(_))
        ));
        assert_eq!(actuator.get_ref().received().len(), sent);
    }

    #[test]
    fn drives_a_stage_through_a_sweep() {
        let mut actuator = chain(1);
        let range = SweepRange::from_units(0, 3000, 1000).unwrap();
        let mut sweep = SweepController::new(range);
        let mut records: Vec<StepRecord> = Vec::new();

        drive(&mut sweep, &mut actuator, Target::one(1).unwrap(), &mut records).unwrap();

        assert_eq!(
            records.iter().map(|r| r.reading).collect::<Vec<_>>(),
            vec![0.0, 1000.0, 2000.0, 3000.0]
        );
        assert_eq!(actuator.get_ref().position_of(1), Some(3000));
    }
}
