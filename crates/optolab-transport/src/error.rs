/// Errors that can occur in byte transport operations.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// Failed to open the named port.
    #[error("failed to open {port}: {reason}")]
    Open { port: String, reason: String },

    /// An I/O error occurred on the transport stream.
    #[error("transport I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The serial driver reported an error outside of plain I/O.
    #[cfg(feature = "serial")]
    #[error("serial port error: {0}")]
    Serial(#[from] serialport::Error),

    /// The stream ended before the requested number of bytes arrived.
    #[error("transport closed after {received} of {expected} bytes")]
    Closed { expected: usize, received: usize },
}

impl TransportError {
    /// True when the error is a read or write deadline expiring on the port.
    pub fn is_timeout(&self) -> bool {
        match self {
            TransportError::Io(err) => matches!(
                err.kind(),
                std::io::ErrorKind::TimedOut | std::io::ErrorKind::WouldBlock
            ),
            _ => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, TransportError>;
