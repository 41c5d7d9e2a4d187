/// Errors that can occur in host operations.
#[derive(Debug, thiserror::Error)]
pub enum HostError {
    /// Signal-level error.
    #[error("signal error: {0}")]
    Signal(#[from] gpiocomm_signal::SignalError),

    /// Frame-level error.
    #[error("frame error: {0}")]
    Frame(#[from] gpiocomm_frame::FrameError),

    /// A request payload is shorter than its tag requires.
    #[error("{tag} payload too short ({actual} bytes, need {expected})")]
    ShortPayload {
        tag: &'static str,
        expected: usize,
        actual: usize,
    },

    /// An initials byte is outside `1..=26`.
    #[error("invalid initials byte {0}")]
    InvalidInitial(u8),

    /// No replay has been stored yet.
    #[error("no replay available")]
    NoReplay,

    /// A recording message arrived while nothing was being recorded.
    #[error("not recording")]
    NotRecording,

    /// The persistent store failed.
    #[error("store error: {0}")]
    Store(String),

    /// Replay blob could not be encoded or decoded.
    #[error("replay codec error: {0}")]
    Codec(String),

    /// The score service rejected a request.
    #[error("score service error: {0}")]
    Service(String),

    /// HTTP transport error talking to the score service.
    #[cfg(feature = "http")]
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// I/O error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, HostError>;
