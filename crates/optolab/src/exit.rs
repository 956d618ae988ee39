use std::fmt;
use std::io;

use optolab_frame::FrameError;
use optolab_lcvr::LcvrError;
use optolab_spe::{DecodeError, SubtractError};
use optolab_sweep::SweepError;
use optolab_transport::TransportError;
use optolab_zaber::ActuatorError;

pub const SUCCESS: i32 = 0;
pub const FAILURE: i32 = 1;
pub const TRANSPORT_ERROR: i32 = 3;
pub const PERMISSION_DENIED: i32 = 50;
pub const DATA_INVALID: i32 = 60;
pub const USAGE: i32 = 64;
/// The instrument itself reported a fault.
pub const DEVICE_FAULT: i32 = 70;
pub const TIMEOUT: i32 = 124;
pub const INTERNAL: i32 = 125;

pub type CliResult<T> = Result<T, CliError>;

#[derive(Debug)]
pub struct CliError {
    pub code: i32,
    pub message: String,
}

impl CliError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

fn io_code(kind: io::ErrorKind) -> i32 {
    match kind {
        io::ErrorKind::PermissionDenied => PERMISSION_DENIED,
        io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock => TIMEOUT,
        io::ErrorKind::NotFound | io::ErrorKind::BrokenPipe => FAILURE,
        _ => INTERNAL,
    }
}

fn transport_code(err: &TransportError) -> i32 {
    match err {
        TransportError::Io(source) => io_code(source.kind()),
        TransportError::Closed { .. } => FAILURE,
        _ => TRANSPORT_ERROR,
    }
}

fn frame_code(err: &FrameError) -> i32 {
    match err {
        FrameError::Transport(err) => transport_code(err),
        FrameError::Io(source) => io_code(source.kind()),
    }
}

fn actuator_code(err: &ActuatorError) -> i32 {
    match err {
        ActuatorError::Transport(err) => transport_code(err),
        ActuatorError::Frame(err) => frame_code(err),
        ActuatorError::Device { .. } => DEVICE_FAULT,
        ActuatorError::UnknownErrorCode { .. }
        | ActuatorError::UnexpectedReply { .. }
        | ActuatorError::DeviceCount { .. } => DATA_INVALID,
        ActuatorError::Timeout { .. } => TIMEOUT,
        ActuatorError::NoDevices => TRANSPORT_ERROR,
        ActuatorError::InvalidDeviceId(_)
        | ActuatorError::InvalidSlot(_)
        | ActuatorError::InvalidArgument(_) => USAGE,
        ActuatorError::NotInitialized => INTERNAL,
    }
}

fn lcvr_code(err: &LcvrError) -> i32 {
    match err {
        LcvrError::Transport(err) => transport_code(err),
        LcvrError::InvalidChannel(_) | LcvrError::InvalidVoltage(_) => USAGE,
        LcvrError::MalformedReply { .. } | LcvrError::LineTooLong { .. } => DATA_INVALID,
    }
}

pub fn io_error(context: &str, err: io::Error) -> CliError {
    CliError::new(io_code(err.kind()), format!("{context}: {err}"))
}

pub fn transport_error(context: &str, err: TransportError) -> CliError {
    CliError::new(transport_code(&err), format!("{context}: {err}"))
}

pub fn actuator_error(context: &str, err: ActuatorError) -> CliError {
    CliError::new(actuator_code(&err), format!("{context}: {err}"))
}

pub fn lcvr_error(context: &str, err: LcvrError) -> CliError {
    CliError::new(lcvr_code(&err), format!("{context}: {err}"))
}

pub fn decode_error(context: &str, err: DecodeError) -> CliError {
    match err {
        DecodeError::Io(source) => io_error(context, source),
        DecodeError::NotFound { .. } => CliError::new(FAILURE, format!("{context}: {err}")),
        other => CliError::new(DATA_INVALID, format!("{context}: {other}")),
    }
}

pub fn subtract_error(context: &str, err: SubtractError) -> CliError {
    CliError::new(DATA_INVALID, format!("{context}: {err}"))
}

/// Step failures take the code of the device error underneath them.
pub fn sweep_error(context: &str, err: SweepError) -> CliError {
    let code = match &err {
        SweepError::InvalidRange(_) => USAGE,
        SweepError::PauseTimeout(_) => TIMEOUT,
        SweepError::Step { source, .. } => {
            if let Some(err) = source.downcast_ref::<ActuatorError>() {
                actuator_code(err)
            } else if let Some(err) = source.downcast_ref::<LcvrError>() {
                lcvr_code(err)
            } else {
                FAILURE
            }
        }
        SweepError::Sink(_) => INTERNAL,
    };
    CliError::new(code, format!("{context}: {err}"))
}
