use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Subcommand, ValueEnum};

use crate::exit::{CliError, CliResult, USAGE};
use crate::output::OutputFormat;

pub mod ports;
pub mod spe;
pub mod sweep;
pub mod version;
pub mod zaber;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Inspect SPE spectroscopy files.
    Spe(SpeArgs),
    /// Talk to a chain of linear actuators.
    Zaber(ZaberArgs),
    /// Sweep a voltage controller output, optionally nested inside an actuator sweep.
    Sweep(SweepArgs),
    /// List serial ports.
    Ports(PortsArgs),
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Spe(args) => spe::run(args, format),
        Command::Zaber(args) => zaber::run(args, format),
        Command::Sweep(args) => sweep::run(args, format),
        Command::Ports(args) => ports::run(args, format),
        Command::Version(args) => version::run(args),
    }
}

#[derive(Args, Debug)]
pub struct SpeArgs {
    #[command(subcommand)]
    pub action: SpeAction,
}

#[derive(Subcommand, Debug)]
pub enum SpeAction {
    /// Print header fields and per-frame statistics.
    Info {
        /// SPE file to read.
        file: PathBuf,
    },
    /// Print the calibrated wavelength of every pixel column.
    Axis {
        /// SPE file to read.
        file: PathBuf,
    },
    /// Subtract a background exposure and summarize the result.
    Subtract {
        /// SPE file to correct.
        file: PathBuf,
        /// Background exposure with the same shape and calibration.
        #[arg(long, value_name = "FILE")]
        background: PathBuf,
    },
}

#[derive(Args, Debug)]
pub struct ZaberArgs {
    /// Serial port the chain is attached to.
    #[arg(
        long,
        env = "OPTOLAB_ZABER_PORT",
        conflicts_with = "simulate",
        required_unless_present = "simulate"
    )]
    pub port: Option<String>,
    /// Use a simulated chain of N devices instead of a serial port.
    #[arg(long, value_name = "N")]
    pub simulate: Option<u8>,
    /// How long to wait for replies (e.g. 30s, 500ms).
    #[arg(long, default_value = "30s")]
    pub timeout: String,
    #[command(subcommand)]
    pub action: ZaberAction,
}

#[derive(Args, Debug, Clone, Copy)]
pub struct TargetArgs {
    /// Device number. Omit to address every device on the chain.
    #[arg(long, short = 'd')]
    pub device: Option<u8>,
}

#[derive(Subcommand, Debug)]
pub enum ZaberAction {
    /// Renumber the chain and list the devices found.
    Renumber,
    /// Move to the home position.
    Home(TargetArgs),
    /// Reset devices (no reply is sent).
    Reset(TargetArgs),
    /// Move to an absolute position in microsteps.
    MoveAbs {
        #[command(flatten)]
        target: TargetArgs,
        #[arg(allow_hyphen_values = true)]
        position: i32,
    },
    /// Move by a signed distance in microsteps.
    MoveRel {
        #[command(flatten)]
        target: TargetArgs,
        #[arg(allow_hyphen_values = true)]
        distance: i32,
    },
    /// Report the current position.
    Position(TargetArgs),
    /// Report what devices are doing.
    Status(TargetArgs),
    /// Save the current position into a slot (0-15).
    Store {
        #[command(flatten)]
        target: TargetArgs,
        slot: u8,
    },
    /// Read the position saved in a slot.
    Recall {
        #[command(flatten)]
        target: TargetArgs,
        slot: u8,
    },
    /// Move to the position saved in a slot.
    GotoStored {
        #[command(flatten)]
        target: TargetArgs,
        slot: u8,
    },
}

#[derive(Copy, Clone, Debug, ValueEnum)]
pub enum ResumeArg {
    /// Re-run the last few steps after a pause.
    Rewind,
    /// Carry on with the next step.
    Continue,
}

#[derive(Args, Debug)]
pub struct SweepArgs {
    /// First voltage.
    #[arg(long, allow_hyphen_values = true)]
    pub start: f64,
    /// Last voltage (inclusive).
    #[arg(long, allow_hyphen_values = true)]
    pub end: f64,
    /// Voltage step. The sign is ignored; direction follows start and end.
    #[arg(long, allow_hyphen_values = true)]
    pub step: f64,
    /// Controller output to sweep (1-4).
    #[arg(long, default_value_t = 1)]
    pub channel: u8,
    /// Serial port of the voltage controller.
    #[arg(
        long,
        env = "OPTOLAB_LCVR_PORT",
        conflicts_with = "simulate",
        required_unless_present = "simulate"
    )]
    pub lcvr_port: Option<String>,
    /// Use simulated instruments.
    #[arg(long)]
    pub simulate: bool,
    /// Outer actuator sweep start, in microsteps.
    #[arg(long, allow_hyphen_values = true, requires_all = ["zaber_end", "zaber_step"])]
    pub zaber_start: Option<i64>,
    /// Outer actuator sweep end, in microsteps (inclusive).
    #[arg(long, allow_hyphen_values = true, requires_all = ["zaber_start", "zaber_step"])]
    pub zaber_end: Option<i64>,
    /// Outer actuator sweep step, in microsteps.
    #[arg(long, requires_all = ["zaber_start", "zaber_end"])]
    pub zaber_step: Option<i64>,
    /// Serial port of the actuator chain.
    #[arg(long, env = "OPTOLAB_ZABER_PORT")]
    pub zaber_port: Option<String>,
    /// Actuator to move in the outer sweep.
    #[arg(long, default_value_t = 1)]
    pub zaber_device: u8,
    /// Actuator reply timeout (e.g. 30s, 500ms).
    #[arg(long, default_value = "30s")]
    pub zaber_timeout: String,
    /// Read pause / resume / kill commands from stdin.
    #[arg(long)]
    pub interactive: bool,
    /// Give up if paused for longer than this (e.g. 600s).
    #[arg(long)]
    pub pause_timeout: Option<String>,
    /// Where to continue after a pause.
    #[arg(long, value_enum, default_value = "rewind")]
    pub resume: ResumeArg,
}

#[derive(Args, Debug, Default)]
pub struct PortsArgs {}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}

/// Parse `5s`, `150ms` or a bare number of seconds.
pub fn parse_duration(what: &str, input: &str) -> CliResult<Duration> {
    let input = input.trim();
    if input.is_empty() {
        return Err(CliError::new(USAGE, format!("{what} must not be empty")));
    }

    let (number, millis) = match input.strip_suffix("ms") {
        Some(number) => (number, true),
        None => (input.strip_suffix('s').unwrap_or(input), false),
    };

    let value: u64 = number
        .parse()
        .map_err(|_| CliError::new(USAGE, format!("invalid {what}: {input}")))?;
    if value == 0 {
        return Err(CliError::new(USAGE, format!("{what} must be greater than zero")));
    }

    Ok(if millis {
        Duration::from_millis(value)
    } else {
        Duration::from_secs(value)
    })
}
