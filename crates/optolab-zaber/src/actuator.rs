use std::thread;
use std::time::Instant;

use optolab_frame::{command, Frame, FramedTransport};
use optolab_transport::ByteTransport;
use tracing::{debug, info, warn};

use crate::config::ActuatorConfig;
use crate::error::{ActuatorError, Result};
use crate::reply::{Position, Reply, StatusReport};
use crate::target::Target;

/// Command/response session with one daisy chain of actuators.
///
/// Owns the transport exclusively. Every high-level operation discards stale
/// input, sends one command, and waits for the replies it implies: one for
/// [`Target::One`], one per device for [`Target::All`].
pub struct Actuator<T> {
    framed: FramedTransport<T>,
    config: ActuatorConfig,
    num_devices: Option<usize>,
}

impl<T: ByteTransport> Actuator<T> {
    /// Create a session with default timing. The chain size is unknown until
    /// [`Actuator::renumber`] runs on [`Target::All`].
    pub fn new(transport: T) -> Self {
        Self::with_config(transport, ActuatorConfig::default())
    }

    /// Create a session with explicit timing.
    pub fn with_config(transport: T, config: ActuatorConfig) -> Self {
        Self {
            framed: FramedTransport::new(transport),
            config,
            num_devices: None,
        }
    }

    /// Number of devices found by the last broadcast renumber.
    pub fn num_devices(&self) -> Option<usize> {
        self.num_devices
    }

    /// Send one frame without waiting for a reply.
    pub fn send(&mut self, target: Target, command: u8, data: i32) -> Result<()> {
        self.framed
            .send(&Frame::new(target.wire_id(), command, data))?;
        Ok(())
    }

    /// Block for one reply frame. Error replies are returned as
    /// [`ActuatorError::Device`] or [`ActuatorError::UnknownErrorCode`].
    pub fn receive_one(&mut self) -> Result<Reply> {
        let frame = self.framed.read_frame()?;
        Reply::from_frame(frame)
    }

    /// Poll for replies until `target` is satisfied: one reply for a single
    /// device, exactly `expected_count` for a broadcast. Results are sorted
    /// by device number whatever order they arrived in.
    pub fn collect(&mut self, target: Target, expected_count: usize) -> Result<Vec<Position>> {
        let replies = self.collect_replies(target, expected_count, None)?;
        Ok(replies.into_iter().map(Position::from).collect())
    }

    /// Restart the addressed devices. Devices send no reply.
    pub fn reset(&mut self, target: Target) -> Result<()> {
        self.framed.discard_input()?;
        self.send(target, command::RESET, 0)
    }

    /// Drive to the home sensor. Replies arrive when homing finishes.
    pub fn home(&mut self, target: Target) -> Result<Vec<Position>> {
        self.transact(target, command::HOME, 0)
    }

    /// Renumber devices.
    ///
    /// On [`Target::All`] devices number themselves 1..=n by chain position,
    /// and the reply count becomes the known chain size. On a single device,
    /// `number` (default: the current number) is assigned to it.
    pub fn renumber(&mut self, target: Target, number: Option<u8>) -> Result<Vec<Position>> {
        match target {
            Target::All => {
                if number.is_some() {
                    return Err(ActuatorError::InvalidArgument(
                        "a broadcast renumber assigns numbers by chain position".to_string(),
                    ));
                }
                self.discover()
            }
            Target::One(id) => {
                let number = number.unwrap_or(id.get());
                if number == 0 {
                    return Err(ActuatorError::InvalidDeviceId(number));
                }
                self.transact(target, command::RENUMBER, i32::from(number))
            }
        }
    }

    /// Move to an absolute position in microsteps.
    pub fn goto_absolute(&mut self, target: Target, position: i32) -> Result<Vec<Position>> {
        self.transact(target, command::MOVE_ABSOLUTE, position)
    }

    /// Move by a signed distance in microsteps.
    pub fn goto_relative(&mut self, target: Target, distance: i32) -> Result<Vec<Position>> {
        self.transact(target, command::MOVE_RELATIVE, distance)
    }

    /// Ask what each device is doing.
    pub fn get_status(&mut self, target: Target) -> Result<Vec<StatusReport>> {
        let expected = self.expected_count(target)?;
        self.framed.discard_input()?;
        self.send(target, command::RETURN_STATUS, 0)?;
        thread::sleep(self.config.status_settle);
        let replies = self.collect_replies(target, expected, Some(command::RETURN_STATUS))?;
        Ok(replies
            .into_iter()
            .map(|r| StatusReport::from(Position::from(r)))
            .collect())
    }

    /// Current position in microsteps.
    pub fn get_position(&mut self, target: Target) -> Result<Vec<Position>> {
        self.transact(target, command::RETURN_CURRENT_POSITION, 0)
    }

    /// Save the current position into `slot` (0-15). Replies carry the slot.
    pub fn store_position(&mut self, target: Target, slot: u8) -> Result<Vec<Position>> {
        let slot = check_slot(slot)?;
        self.transact(target, command::STORE_CURRENT_POSITION, slot)
    }

    /// Read back the position saved in `slot`.
    pub fn recall_position(&mut self, target: Target, slot: u8) -> Result<Vec<Position>> {
        let slot = check_slot(slot)?;
        self.transact(target, command::RETURN_STORED_POSITION, slot)
    }

    /// Move to the position saved in `slot`.
    pub fn goto_stored(&mut self, target: Target, slot: u8) -> Result<Vec<Position>> {
        let slot = check_slot(slot)?;
        self.transact(target, command::MOVE_TO_STORED_POSITION, slot)
    }

    /// Current configuration.
    pub fn config(&self) -> &ActuatorConfig {
        &self.config
    }

    /// Borrow the underlying transport.
    pub fn get_ref(&self) -> &T {
        self.framed.get_ref()
    }

    /// Mutably borrow the underlying transport.
    pub fn get_mut(&mut self) -> &mut T {
        self.framed.get_mut()
    }

    /// Consume the session and return the inner transport.
    pub fn into_inner(self) -> T {
        self.framed.into_inner()
    }

    fn transact(&mut self, target: Target, command: u8, data: i32) -> Result<Vec<Position>> {
        let expected = self.expected_count(target)?;
        self.framed.discard_input()?;
        self.send(target, command, data)?;
        let replies = self.collect_replies(target, expected, Some(command))?;
        Ok(replies.into_iter().map(Position::from).collect())
    }

    fn expected_count(&self, target: Target) -> Result<usize> {
        match target {
            Target::One(_) => Ok(1),
            Target::All => self.num_devices.ok_or(ActuatorError::NotInitialized),
        }
    }

    fn discover(&mut self) -> Result<Vec<Position>> {
        self.framed.discard_input()?;
        self.send(Target::All, command::RENUMBER, 0)?;
        thread::sleep(self.config.renumber_settle);

        let started = Instant::now();
        let mut replies = Vec::new();
        loop {
            let frames = self.framed.poll_frames()?;
            if frames.is_empty() {
                if !replies.is_empty() {
                    break;
                }
                if let Some(timeout) = self.config.reply_timeout {
                    if started.elapsed() >= timeout {
                        self.num_devices = None;
                        return Err(ActuatorError::NoDevices);
                    }
                }
                thread::sleep(self.config.poll_interval);
                continue;
            }
            for frame in frames {
                let reply = accept(frame, Some(command::RENUMBER))?;
                replies.push(Position::from(reply));
            }
        }

        replies.sort_by_key(|p| p.device_id);
        self.num_devices = Some(replies.len());
        info!(devices = replies.len(), "actuator chain renumbered");
        Ok(replies)
    }

    fn collect_replies(
        &mut self,
        target: Target,
        expected_count: usize,
        expect_command: Option<u8>,
    ) -> Result<Vec<Reply>> {
        let wanted = match target {
            Target::One(_) => 1,
            Target::All => expected_count,
        };
        let started = Instant::now();
        let mut replies = Vec::with_capacity(wanted);

        while replies.len() < wanted {
            match self.framed.poll_frame()? {
                Some(frame) => replies.push(accept(frame, expect_command)?),
                None => {
                    if let Some(timeout) = self.config.reply_timeout {
                        if started.elapsed() >= timeout {
                            return Err(ActuatorError::Timeout {
                                expected: wanted,
                                received: replies.len(),
                                after: timeout,
                            });
                        }
                    }
                    thread::sleep(self.config.poll_interval);
                }
            }
        }

        replies.sort_by_key(|r| r.device_id);
        debug!(%target, replies = replies.len(), "replies collected");
        Ok(replies)
    }
}

fn accept(frame: Frame, expect_command: Option<u8>) -> Result<Reply> {
    let reply = Reply::from_frame(frame)?;
    if let Some(expected) = expect_command {
        if reply.command != expected {
            warn!(
                device = reply.device_id,
                expected,
                received = reply.command,
                "reply does not match request"
            );
            return Err(ActuatorError::UnexpectedReply {
                device_id: reply.device_id,
                expected,
                received: reply.command,
            });
        }
    }
    Ok(reply)
}

fn check_slot(slot: u8) -> Result<i32> {
    if i32::from(slot) > command::MAX_STORED_SLOT {
        return Err(ActuatorError::InvalidSlot(slot));
    }
    Ok(i32::from(slot))
}

impl<T> std::fmt::Debug for Actuator<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Actuator")
            .field("num_devices", &self.num_devices)
            .field("config", &self.config)
            .finish()
    }
}
