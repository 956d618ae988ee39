/// Errors that can occur talking to a voltage controller.
#[derive(Debug, thiserror::Error)]
pub enum LcvrError {
    /// Transport-level error.
    #[error("transport error: {0}")]
    Transport(#[from] optolab_transport::TransportError),

    /// Channels run from 1 to 4.
    #[error("invalid channel {0} (expected 1-4)")]
    InvalidChannel(u8),

    /// Outputs accept 0 to 10 V.
    #[error("voltage {0} V out of range (0-10 V)")]
    InvalidVoltage(f64),

    /// The controller answered with something that does not parse.
    #[error("malformed reply to {command:?}: {reply:?}")]
    MalformedReply { command: String, reply: String },

    /// A reply line grew past the configured limit without a terminator.
    #[error("reply line exceeds {limit} bytes")]
    LineTooLong { limit: usize },
}

pub type Result<T> = std::result::Result<T, LcvrError>;
