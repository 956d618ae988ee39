use std::collections::VecDeque;
use std::io::ErrorKind;

use optolab_transport::{ByteTransport, TransportError};
use tracing::warn;

use crate::protocol::CHANNELS;

/// Firmware string reported by [`SimulatedLcvr`].
pub const SIMULATED_FIRMWARE: &str = "Meadowlark Optics D3050 v1.0 (simulated)";

/// In-process stand-in for a D3050 controller.
///
/// Set commands are echoed back, queries answered from the stored counts.
/// Lines it does not understand are dropped without a reply.
#[derive(Debug, Default, Clone)]
pub struct SimulatedLcvr {
    counts: [u16; CHANNELS as usize],
    inbound: Vec<u8>,
    outgoing: VecDeque<u8>,
    commands: Vec<String>,
    silent: bool,
}

impl SimulatedLcvr {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stop (or resume) answering commands.
    pub fn set_silent(&mut self, silent: bool) {
        self.silent = silent;
    }

    /// Counts currently held by `channel` (1-4).
    pub fn counts(&self, channel: u8) -> Option<u16> {
        let index = usize::from(channel).checked_sub(1)?;
        self.counts.get(index).copied()
    }

    /// Every command line received, without the terminator.
    pub fn commands(&self) -> &[String] {
        &self.commands
    }

    fn handle(&mut self, line: &str) {
        self.commands.push(line.to_string());
        if self.silent {
            return;
        }
        let reply = match self.answer(line) {
            Some(reply) => reply,
            None => {
                warn!(line, "simulated lcvr ignored command");
                return;
            }
        };
        self.outgoing.extend(reply.bytes());
        self.outgoing.extend(b"\r\n");
    }

    fn answer(&mut self, line: &str) -> Option<String> {
        let (verb, args) = line.split_once(':')?;
        match (verb, args) {
            ("ver", "?") => Some(SIMULATED_FIRMWARE.to_string()),
            ("ldd", "?") => {
                let [a, b, c, d] = self.counts;
                Some(format!("ldd:{a},{b},{c},{d}"))
            }
            ("ldd", values) => {
                let parsed: Vec<u16> = values
                    .split(',')
                    .map(str::parse)
                    .collect::<Result<_, _>>()
                    .ok()?;
                self.counts = parsed.try_into().ok()?;
                Some(line.to_string())
            }
            ("ld", args) => {
                let (channel, value) = args.split_once(',')?;
                let channel: u8 = channel.parse().ok()?;
                let index = usize::from(channel).checked_sub(1)?;
                let slot = self.counts.get_mut(index)?;
                if value == "?" {
                    return Some(format!("ld:{channel},{slot}"));
                }
                *slot = value.parse().ok()?;
                Some(line.to_string())
            }
            _ => None,
        }
    }
}

impl ByteTransport for SimulatedLcvr {
    fn write_all(&mut self, buf: &[u8]) -> optolab_transport::Result<()> {
        for &byte in buf {
            if byte == b'\r' {
                let line = String::from_utf8_lossy(&self.inbound).into_owned();
                self.inbound.clear();
                self.handle(&line);
            } else {
                self.inbound.push(byte);
            }
        }
        Ok(())
    }

    fn read_exact(&mut self, buf: &mut [u8]) -> optolab_transport::Result<()> {
        if self.outgoing.len() < buf.len() {
            return Err(TransportError::Io(std::io::Error::new(
                ErrorKind::TimedOut,
                "simulated controller has no reply pending",
            )));
        }
        let n = buf.len();
        for (slot, byte) in buf.iter_mut().zip(self.outgoing.drain(..n)) {
            *slot = byte;
        }
        Ok(())
    }

    fn bytes_available(&mut self) -> optolab_transport::Result<usize> {
        Ok(self.outgoing.len())
    }

    fn flush_input(&mut self) -> optolab_transport::Result<()> {
        self.outgoing.clear();
        Ok(())
    }

    fn flush_output(&mut self) -> optolab_transport::Result<()> {
        self.inbound.clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reply(sim: &mut SimulatedLcvr) -> String {
        let n = sim.bytes_available().unwrap();
        let mut buf = vec![0u8; n];
        sim.read_exact(&mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn echoes_set_and_answers_query() {
        let mut sim = SimulatedLcvr::new();
        sim.write_all(b"ld:2,1234\r").unwrap();
        assert_eq!(reply(&mut sim), "ld:2,1234\r\n");
        sim.write_all(b"ld:2,?\r").unwrap();
        assert_eq!(reply(&mut sim), "ld:2,1234\r\n");
        assert_eq!(sim.counts(2), Some(1234));
        assert_eq!(sim.commands(), &["ld:2,1234", "ld:2,?"]);
    }

    #[test]
    fn ignores_bad_channel_and_garbage() {
        let mut sim = SimulatedLcvr::new();
        sim.write_all(b"ld:9,1\rnonsense\r").unwrap();
        assert_eq!(sim.bytes_available().unwrap(), 0);
        assert_eq!(sim.counts(0), None);
    }

    #[test]
    fn silent_controller_times_out() {
        let mut sim = SimulatedLcvr::new();
        sim.set_silent(true);
        sim.write_all(b"ver:?\r").unwrap();
        let mut buf = [0u8; 1];
        assert!(sim.read_exact(&mut buf).unwrap_err().is_timeout());
    }

    #[test]
    fn partial_reads_leave_the_rest_pending() {
        let mut sim = SimulatedLcvr::new();
        sim.write_all(b"ld:1,7\r").unwrap();
        let mut head = [0u8; 3];
        sim.read_exact(&mut head).unwrap();
        assert_eq!(&head, b"ld:");
        assert_eq!(reply(&mut sim), "1,7\r\n");
    }
}
