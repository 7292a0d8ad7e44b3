use serde::{Deserialize, Serialize};

/// Transport-level status space this service distinguishes.
///
/// Validation failures never show up here — they travel as
/// `success = false` in the response body so that batch flows can report
/// partial results. Only operations whose success payload has no
/// success/message fields (the mesh paths) use `NotFound`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StatusCode {
    Ok,
    NotFound,
    InvalidArgument,
    DeadlineExceeded,
    Internal,
}

/// Transport-class failures. Everything else completes normally with a
/// failure body.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ServiceError {
    #[error("shape not found: {shape_id}")]
    NotFound { shape_id: String },

    #[error("invalid argument: {reason}")]
    InvalidArgument { reason: String },

    #[error("deadline exceeded")]
    DeadlineExceeded,

    #[error("internal error: {reason}")]
    Internal { reason: String },
}

impl ServiceError {
    pub fn code(&self) -> StatusCode {
        match self {
            ServiceError::NotFound { .. } => StatusCode::NotFound,
            ServiceError::InvalidArgument { .. } => StatusCode::InvalidArgument,
            ServiceError::DeadlineExceeded => StatusCode::DeadlineExceeded,
            ServiceError::Internal { .. } => StatusCode::Internal,
        }
    }
}
