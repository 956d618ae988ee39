use optolab_transport::ByteTransport;
use tracing::debug;

use crate::config::LcvrConfig;
use crate::error::{LcvrError, Result};
use crate::protocol::{self, CHANNELS};

/// A D3050 controller on a byte transport.
pub struct Lcvr<T> {
    transport: T,
    config: LcvrConfig,
}

impl<T: ByteTransport> Lcvr<T> {
    pub fn new(transport: T) -> Self {
        Self::with_config(transport, LcvrConfig::default())
    }

    pub fn with_config(transport: T, config: LcvrConfig) -> Self {
        Self { transport, config }
    }

    /// Set one channel (1-4) to `volts` (0-10 V).
    pub fn set_voltage(&mut self, channel: u8, volts: f64) -> Result<()> {
        let channel = protocol::check_channel(channel)?;
        let counts = protocol::volts_to_counts(volts)?;
        self.exchange(&protocol::set_voltage(channel, counts))?;
        Ok(())
    }

    /// Read back the setting of one channel.
    pub fn get_voltage(&mut self, channel: u8) -> Result<f64> {
        let channel = protocol::check_channel(channel)?;
        let command = protocol::get_voltage(channel);
        let reply = self.exchange(&command)?;
        let counts = protocol::parse_voltage(&command, &reply)?;
        Ok(protocol::counts_to_volts(counts))
    }

    /// Set all four channels at once, channel 1 first.
    pub fn set_all_voltage(&mut self, volts: [f64; CHANNELS as usize]) -> Result<()> {
        let mut counts = [0u16; CHANNELS as usize];
        for (slot, v) in counts.iter_mut().zip(volts) {
            *slot = protocol::volts_to_counts(v)?;
        }
        self.exchange(&protocol::set_all_voltage(counts))?;
        Ok(())
    }

    /// Read all four channels, channel 1 first.
    pub fn get_all_voltage(&mut self) -> Result<[f64; CHANNELS as usize]> {
        let reply = self.exchange(protocol::GET_ALL_VOLTAGE)?;
        let counts = protocol::parse_all_voltage(protocol::GET_ALL_VOLTAGE, &reply)?;
        Ok(counts.map(protocol::counts_to_volts))
    }

    /// Firmware version and copyright string.
    pub fn firmware(&mut self) -> Result<String> {
        self.exchange(protocol::FIRMWARE)
    }

    pub fn config(&self) -> &LcvrConfig {
        &self.config
    }

    pub fn get_ref(&self) -> &T {
        &self.transport
    }

    pub fn get_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    pub fn into_inner(self) -> T {
        self.transport
    }

    /// Send one command and return its reply line without the terminator.
    fn exchange(&mut self, command: &str) -> Result<String> {
        if self.config.flush_before_command {
            self.transport.flush_input()?;
        }
        debug!(command = command.trim_end(), "lcvr send");
        self.transport.write_all(command.as_bytes())?;
        let reply = self.read_line()?;
        debug!(reply = %reply, "lcvr recv");
        Ok(reply)
    }

    /// Read up to `\n`. A read timeout after some bytes ends the line, since
    /// some firmware terminates replies with a bare `\r`.
    fn read_line(&mut self) -> Result<String> {
        let mut line = Vec::new();
        loop {
            let mut byte = [0u8; 1];
            match self.transport.read_exact(&mut byte) {
                Ok(()) => {}
                Err(err) if err.is_timeout() && !line.is_empty() => {
                    debug!("lcvr reply ended by timeout");
                    break;
                }
                Err(err) => return Err(err.into()),
            }
            if byte[0] == b'\n' {
                break;
            }
            if line.len() >= self.config.max_line_len {
                return Err(LcvrError::LineTooLong {
                    limit: self.config.max_line_len,
                });
            }
            line.push(byte[0]);
        }
        let text = String::from_utf8_lossy(&line);
        Ok(text.trim_end_matches(['\r', '\n']).to_string())
    }
}

impl<T> std::fmt::Debug for Lcvr<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Lcvr").field("config", &self.config).finish()
    }
}

#[cfg(test)]
mod tests {
    use optolab_transport::MemoryTransport;

    use super::*;
    use crate::sim::SimulatedLcvr;

    fn scripted(reply: &[u8]) -> Lcvr<MemoryTransport> {
        let config = LcvrConfig {
            flush_before_command: false,
            ..LcvrConfig::default()
        };
        Lcvr::with_config(MemoryTransport::with_incoming(reply), config)
    }

    #[test]
    fn set_voltage_writes_counts_and_consumes_echo() {
        let mut lcvr = scripted(b"ld:1,6553\r\n");
        lcvr.set_voltage(1, 1.0).unwrap();
        assert_eq!(lcvr.get_ref().written(), b"ld:1,6553\r");
        assert_eq!(lcvr.get_ref().pending(), 0);
    }

    #[test]
    fn get_voltage_parses_counts() {
        let mut lcvr = scripted(b"ld:2,32767\r\n");
        let volts = lcvr.get_voltage(2).unwrap();
        assert_eq!(lcvr.get_ref().written(), b"ld:2,?\r");
        assert!((volts - 32767.0 / 6553.5).abs() < 1e-12);
    }

    #[test]
    fn bare_carriage_return_reply_ends_at_timeout() {
        let mut lcvr = scripted(b"ld:3,0\r");
        assert_eq!(lcvr.get_voltage(3).unwrap(), 0.0);
    }

    #[test]
    fn silent_controller_times_out() {
        let mut lcvr = scripted(b"");
        let err = lcvr.get_voltage(1).unwrap_err();
        assert!(matches!(err, LcvrError::Transport(ref e) if e.is_timeout()));
    }

    #[test]
    fn invalid_arguments_never_reach_the_wire() {
        let mut lcvr = scripted(b"");
        assert!(matches!(
            lcvr.set_voltage(5, 1.0),
            Err(LcvrError::InvalidChannel(5))
        ));
        assert!(matches!(
            lcvr.set_voltage(1, 11.0),
            Err(LcvrError::InvalidVoltage(_))
        ));
        assert!(lcvr.set_all_voltage([1.0, 2.0, -1.0, 0.0]).is_err());
        assert!(lcvr.get_ref().written().is_empty());
    }

    #[test]
    fn overlong_line_is_rejected() {
        let mut lcvr = scripted(&[b'x'; 300]);
        let err = lcvr.firmware().unwrap_err();
        assert!(matches!(err, LcvrError::LineTooLong { limit: 256 }));
    }

    #[test]
    fn malformed_reply() {
        let mut lcvr = scripted(b"huh?\r\n");
        assert!(matches!(
            lcvr.get_voltage(1),
            Err(LcvrError::MalformedReply { .. })
        ));
    }

    #[test]
    fn round_trip_against_simulator() {
        let mut lcvr = Lcvr::new(SimulatedLcvr::new());
        lcvr.set_all_voltage([0.0, 2.5, 5.0, 10.0]).unwrap();
        lcvr.set_voltage(1, 1.0).unwrap();

        let all = lcvr.get_all_voltage().unwrap();
        assert_eq!(all[3], 10.0);
        assert!((all[0] - 6553.0 / 6553.5).abs() < 1e-12);
        assert!((lcvr.get_voltage(3).unwrap() - 5.0).abs() < 1e-3);
        assert!(lcvr.firmware().unwrap().contains("D3050"));
    }
}
