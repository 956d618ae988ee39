//! Command strings and reply parsing for the D3050 ASCII protocol.
//!
//! Commands are `\r`-terminated ASCII. Voltages travel as 16-bit counts,
//! 6553.5 counts per volt, so 10 V is 65535.

use crate::error::{LcvrError, Result};

/// Output channels on the controller.
pub const CHANNELS: u8 = 4;

/// Highest output voltage.
pub const MAX_VOLTS: f64 = 10.0;

/// Counts per volt.
pub const COUNTS_PER_VOLT: f64 = 6553.5;

/// Controller line rate.
pub const BAUD_RATE: u32 = 38_400;

pub fn check_channel(channel: u8) -> Result<u8> {
    if (1..=CHANNELS).contains(&channel) {
        Ok(channel)
    } else {
        Err(LcvrError::InvalidChannel(channel))
    }
}

/// Convert volts to counts, truncating toward zero.
pub fn volts_to_counts(volts: f64) -> Result<u16> {
    if !(0.0..=MAX_VOLTS).contains(&volts) {
        return Err(LcvrError::InvalidVoltage(volts));
    }
    Ok((volts * COUNTS_PER_VOLT).trunc() as u16)
}

pub fn counts_to_volts(counts: u16) -> f64 {
    f64::from(counts) / COUNTS_PER_VOLT
}

pub(crate) fn set_voltage(channel: u8, counts: u16) -> String {
    format!("ld:{channel},{counts}\r")
}

pub(crate) fn get_voltage(channel: u8) -> String {
    format!("ld:{channel},?\r")
}

pub(crate) fn set_all_voltage(counts: [u16; CHANNELS as usize]) -> String {
    let [a, b, c, d] = counts;
    format!("ldd:{a},{b},{c},{d}\r")
}

pub(crate) const GET_ALL_VOLTAGE: &str = "ldd:?\r";

pub(crate) const FIRMWARE: &str = "ver:?\r";

/// Parse `ld:<channel>,<counts>`.
pub(crate) fn parse_voltage(command: &str, reply: &str) -> Result<u16> {
    let malformed = || malformed(command, reply);
    let (_, body) = reply.split_once(':').ok_or_else(malformed)?;
    let (_, counts) = body.split_once(',').ok_or_else(malformed)?;
    counts.trim().parse().map_err(|_| malformed())
}

/// Parse `ldd:<a>,<b>,<c>,<d>`.
pub(crate) fn parse_all_voltage(command: &str, reply: &str) -> Result<[u16; CHANNELS as usize]> {
    let (_, body) = reply.split_once(':').ok_or_else(|| malformed(command, reply))?;
    let counts: Vec<u16> = body
        .split(',')
        .map(|field| field.trim().parse())
        .collect::<std::result::Result<_, _>>()
        .map_err(|_| malformed(command, reply))?;
    counts
        .try_into()
        .map_err(|_| malformed(command, reply))
}

fn malformed(command: &str, reply: &str) -> LcvrError {
    LcvrError::MalformedReply {
        command: command.trim_end().to_string(),
        reply: reply.to_string(),
    }
}
