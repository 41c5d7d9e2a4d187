use gpiocomm_signal::SignalError;

/// Errors that can occur while interpreting frames.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FrameError {
    /// The frame's first byte is not a known message tag.
    #[error("unknown message tag {0}")]
    UnknownTag(u8),

    /// The frame carries no bytes at all, so it has no tag.
    #[error("empty frame (no message tag)")]
    EmptyFrame,

    /// A signal cell could not be accessed.
    #[error("signal error: {0}")]
    Signal(#[from] SignalError),
}

pub type Result<T> = std::result::Result<T, FrameError>;
