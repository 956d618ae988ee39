/// Errors that can occur while exchanging frames.
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    /// The underlying byte transport failed.
    #[error("transport error: {0}")]
    Transport(#[from] optolab_transport::TransportError),

    /// An I/O error occurred while encoding or decoding frames.
    #[error("frame I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl FrameError {
    /// True when the error is a read deadline expiring on the transport.
    pub fn is_timeout(&self) -> bool {
        match self {
            FrameError::Transport(err) => err.is_timeout(),
            FrameError::Io(err) => matches!(
                err.kind(),
                std::io::ErrorKind::TimedOut | std::io::ErrorKind::WouldBlock
            ),
        }
    }
}

pub type Result<T> = std::result::Result<T, FrameError>;
