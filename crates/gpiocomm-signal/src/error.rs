/// Errors that can occur when touching signal cells.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SignalError {
    /// The cell index lies outside the array.
    #[error("signal index {index} out of range (len {len})")]
    IndexOutOfRange { index: usize, len: usize },
}

pub type Result<T> = std::result::Result<T, SignalError>;
