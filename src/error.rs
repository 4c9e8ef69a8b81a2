use thiserror::Error;

/// The type returned by event wait and signal operations.
pub type EvResult<T = ()> = Result<T, EvError>;

/// Failure statuses for event operations.
#[derive(Error, Debug, Clone, Copy, Eq, PartialEq)]
pub enum EvError {
    /// The time limit for the wait elapsed before it was satisfied.
    #[error("the wait timed out")]
    TimedOut,

    /// An argument is invalid, ex. an empty event list.
    #[error("invalid argument")]
    InvalidArgs,
}
