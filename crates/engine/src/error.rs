#![forbid(unsafe_code)]

use td_core::model::TitleError;
use td_storage::StoreError;

#[derive(Debug)]
pub enum EngineError {
    /// Malformed input; retrying with the same input cannot succeed.
    Validation(&'static str),
    /// Task id unknown or not owned by the caller.
    NotFound,
    /// Activating would break the active-partition ceiling.
    CapacityExceeded { limit: usize },
    /// The store could not serialize this write against a concurrent one;
    /// the caller may retry the whole operation.
    Conflict,
    /// Backend unreachable or failing; fatal for this request.
    Unavailable(StoreError),
}

impl std::fmt::Display for EngineError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(message) => write!(f, "validation: {message}"),
            Self::NotFound => write!(f, "task not found"),
            Self::CapacityExceeded { limit } => write!(
                f,
                "active task limit reached (limit={limit}): complete or remove a task first"
            ),
            Self::Conflict => write!(f, "conflict: concurrent modification, retry"),
            Self::Unavailable(err) => write!(f, "store unavailable: {err}"),
        }
    }
}

impl std::error::Error for EngineError {}

impl From<StoreError> for EngineError {
    fn from(value: StoreError) -> Self {
        match value {
            StoreError::NotFound => Self::NotFound,
            StoreError::Busy | StoreError::AlreadyExists => Self::Conflict,
            StoreError::InvalidInput(message) => Self::Validation(message),
            other => Self::Unavailable(other),
        }
    }
}

impl From<TitleError> for EngineError {
    fn from(value: TitleError) -> Self {
        match value {
            TitleError::Empty => Self::Validation("title must not be empty"),
            TitleError::TooLong { .. } => Self::Validation("title exceeds 200 characters"),
        }
    }
}
