use optolab_transport::ByteTransport;
#[cfg(feature = "serial")]
use optolab_transport::{SerialSettings, SerialTransport};

use crate::actuator::Actuator;
use crate::config::ActuatorConfig;
use crate::error::Result;
use crate::target::Target;

/// Start a session on `transport` and run the renumber handshake.
pub fn connect<T: ByteTransport>(transport: T) -> Result<Actuator<T>> {
    connect_with_config(transport, ActuatorConfig::default())
}

/// Start a session with explicit timing and run the renumber handshake.
pub fn connect_with_config<T: ByteTransport>(
    transport: T,
    config: ActuatorConfig,
) -> Result<Actuator<T>> {
    let mut actuator = Actuator::with_config(transport, config);
    actuator.renumber(Target::All, None)?;
    Ok(actuator)
}

/// Open a serial port with the chain's line settings (9600 8N1) and
/// discover the devices on it.
#[cfg(feature = "serial")]
pub fn open_serial(port: &str) -> Result<Actuator<SerialTransport>> {
    open_serial_with_config(port, &SerialSettings::default(), ActuatorConfig::default())
}

/// Open a serial port with explicit settings and discover the devices on it.
#[cfg(feature = "serial")]
pub fn open_serial_with_config(
    port: &str,
    settings: &SerialSettings,
    config: ActuatorConfig,
) -> Result<Actuator<SerialTransport>> {
    let transport = SerialTransport::open(port, settings)?;
    connect_with_config(transport, config)
}
