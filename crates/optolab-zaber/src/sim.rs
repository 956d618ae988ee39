//! In-process simulation of an actuator chain.
//!
//! [`SimulatedChain`] answers frames the way a chain of devices on one
//! serial line would, so the protocol layer, sweeps, and the CLI can run
//! without hardware.

use std::collections::VecDeque;
use std::io::ErrorKind;

use optolab_frame::{command, Frame, BROADCAST, FRAME_SIZE};
use optolab_transport::{ByteTransport, TransportError};
use tracing::trace;

/// Largest absolute position a simulated device accepts, in microsteps.
pub const DEFAULT_MAX_POSITION: i32 = 640_000;

const STORED_SLOTS: usize = 16;

#[derive(Debug, Clone)]
struct SimDevice {
    number: u8,
    position: i32,
    homed: bool,
    stored: [i32; STORED_SLOTS],
    pending_error: Option<i32>,
}

impl SimDevice {
    fn new(number: u8) -> Self {
        Self {
            number,
            position: 0,
            homed: false,
            stored: [0; STORED_SLOTS],
            pending_error: None,
        }
    }

    fn respond(&mut self, request: Frame, max_position: i32) -> Frame {
        if let Some(code) = self.pending_error.take() {
            return self.error(code);
        }

        let data = request.data;
        match request.command {
            command::HOME => {
                self.position = 0;
                self.homed = true;
                self.reply(command::HOME, 0)
            }
            command::RENUMBER => match u8::try_from(data) {
                Ok(number) if number != BROADCAST => {
                    self.number = number;
                    self.reply(command::RENUMBER, data)
                }
                _ => self.error(2),
            },
            command::STORE_CURRENT_POSITION => match slot_index(data) {
                None => self.error(1600),
                Some(_) if !self.homed => self.error(1601),
                Some(slot) => {
                    self.stored[slot] = self.position;
                    self.reply(command::STORE_CURRENT_POSITION, data)
                }
            },
            command::RETURN_STORED_POSITION => match slot_index(data) {
                None => self.error(1700),
                Some(slot) => self.reply(command::RETURN_STORED_POSITION, self.stored[slot]),
            },
            command::MOVE_TO_STORED_POSITION => match slot_index(data) {
                None => self.error(1800),
                Some(_) if !self.homed => self.error(1801),
                Some(slot) => {
                    self.position = self.stored[slot];
                    self.reply(command::MOVE_TO_STORED_POSITION, self.position)
                }
            },
            command::MOVE_ABSOLUTE => {
                if !(0..=max_position).contains(&data) {
                    return self.error(20);
                }
                self.position = data;
                self.reply(command::MOVE_ABSOLUTE, self.position)
            }
            command::MOVE_RELATIVE => match self.position.checked_add(data) {
                Some(next) if (0..=max_position).contains(&next) => {
                    self.position = next;
                    self.reply(command::MOVE_RELATIVE, self.position)
                }
                _ => self.error(21),
            },
            command::RETURN_STATUS => self.reply(command::RETURN_STATUS, 0),
            command::RETURN_CURRENT_POSITION => {
                self.reply(command::RETURN_CURRENT_POSITION, self.position)
            }
            _ => self.error(64),
        }
    }

    fn reply(&self, command: u8, data: i32) -> Frame {
        Frame::new(self.number, command, data)
    }

    fn error(&self, code: i32) -> Frame {
        Frame::new(self.number, command::ERROR, code)
    }
}

fn slot_index(data: i32) -> Option<usize> {
    usize::try_from(data).ok().filter(|slot| *slot < STORED_SLOTS)
}

/// A simulated chain of actuators behind one byte transport.
///
/// Broadcast replies come back from the far end of the chain first, so
/// callers see them in descending device order.
#[derive(Debug, Clone)]
pub struct SimulatedChain {
    devices: Vec<SimDevice>,
    inbound: Vec<u8>,
    outgoing: VecDeque<u8>,
    received: Vec<Frame>,
    silent: bool,
    max_position: i32,
}

impl SimulatedChain {
    /// A chain of `devices` actuators numbered 1..=devices.
    pub fn new(devices: u8) -> Self {
        Self {
            devices: (1..=devices).map(SimDevice::new).collect(),
            inbound: Vec::with_capacity(FRAME_SIZE),
            outgoing: VecDeque::new(),
            received: Vec::new(),
            silent: false,
            max_position: DEFAULT_MAX_POSITION,
        }
    }

    /// Change the travel limit of every device.
    pub fn with_max_position(mut self, max_position: i32) -> Self {
        self.max_position = max_position;
        self
    }

    /// Stop (or resume) answering commands.
    pub fn set_silent(&mut self, silent: bool) {
        self.silent = silent;
    }

    /// Make the next command addressed to device `number` fail with `code`.
    pub fn inject_error(&mut self, number: u8, code: i32) {
        if let Some(dev) = self.devices.iter_mut().find(|d| d.number == number) {
            dev.pending_error = Some(code);
        }
    }

    /// Every frame the chain has received.
    pub fn received(&self) -> &[Frame] {
        &self.received
    }

    /// Current position of device `number`.
    pub fn position_of(&self, number: u8) -> Option<i32> {
        self.devices
            .iter()
            .find(|d| d.number == number)
            .map(|d| d.position)
    }

    fn handle(&mut self, request: Frame) {
        trace!(?request, "simulated chain received frame");
        self.received.push(request);

        if request.command == command::RESET {
            for dev in self.addressed(request.device_id) {
                let dev = &mut self.devices[dev];
                dev.homed = false;
                dev.position = 0;
            }
            return;
        }

        if request.device_id == BROADCAST && request.command == command::RENUMBER {
            for (index, dev) in self.devices.iter_mut().enumerate() {
                dev.number = u8::try_from(index + 1).unwrap_or(u8::MAX);
            }
            for dev in (0..self.devices.len()).rev() {
                let number = self.devices[dev].number;
                let reply = self.devices[dev].reply(command::RENUMBER, i32::from(number));
                self.emit(reply);
            }
            return;
        }

        let max_position = self.max_position;
        for dev in self.addressed(request.device_id).into_iter().rev() {
            let reply = self.devices[dev].respond(request, max_position);
            self.emit(reply);
        }
    }

    fn addressed(&self, device_id: u8) -> Vec<usize> {
        self.devices
            .iter()
            .enumerate()
            .filter(|(_, d)| device_id == BROADCAST || d.number == device_id)
            .map(|(index, _)| index)
            .collect()
    }

    fn emit(&mut self, reply: Frame) {
        if !self.silent {
            self.outgoing.extend(reply.to_bytes());
        }
    }
}

impl ByteTransport for SimulatedChain {
    fn write_all(&mut self, buf: &[u8]) -> optolab_transport::Result<()> {
        self.inbound.extend_from_slice(buf);
        while self.inbound.len() >= FRAME_SIZE {
            let mut bytes = [0u8; FRAME_SIZE];
            bytes.copy_from_slice(&self.inbound[..FRAME_SIZE]);
            self.inbound.drain(..FRAME_SIZE);
            self.handle(Frame::from_bytes(bytes));
        }
        Ok(())
    }

    fn read_exact(&mut self, buf: &mut [u8]) -> optolab_transport::Result<()> {
        if self.outgoing.len() < buf.len() {
            return Err(TransportError::Io(std::io::Error::new(
                ErrorKind::TimedOut,
                "simulated chain has no reply pending",
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
