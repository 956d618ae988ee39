use optolab_transport::{SerialSettings, SerialTransport};

use crate::config::LcvrConfig;
use crate::controller::Lcvr;
use crate::error::Result;
use crate::protocol::BAUD_RATE;

/// Serial settings for the controller: 38400 8N1, 1 s timeout.
pub fn serial_settings() -> SerialSettings {
    SerialSettings::with_baud_rate(BAUD_RATE)
}

/// Open the controller on `port`.
pub fn open_serial(port: &str) -> Result<Lcvr<SerialTransport>> {
    open_serial_with_config(port, LcvrConfig::default())
}

pub fn open_serial_with_config(port: &str, config: LcvrConfig) -> Result<Lcvr<SerialTransport>> {
    let transport = SerialTransport::open(port, &serial_settings())?;
    Ok(Lcvr::with_config(transport, config))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn settings_use_controller_baud_rate() {
        let settings = serial_settings();
        assert_eq!(settings.baud_rate, 38_400);
    }

    #[test]
    fn missing_port_fails_to_open() {
        assert!(open_serial("/dev/optolab-no-such-port").is_err());
    }
}
