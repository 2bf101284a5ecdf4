//! Errors surfaced by the interaction controller

use crate::transport::TransportError;
use thiserror::Error;

/// Outcome errors of a submit cycle.
///
/// All of these are recovered at the controller: the session ends up idle
/// with input unlocked and the error is published for the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InteractionError {
    /// Blank submit; not a failure and never logged as one
    #[error("message is empty")]
    EmptyInput,

    /// Network failure or non-2xx status
    #[error("{}", transport_failure_message(.status, .message))]
    TransportFailure { status: Option<u16>, message: String },

    /// The service answered 2xx with a body missing required fields
    #[error("malformed response: {message}")]
    MalformedResponse { message: String },
}

impl InteractionError {
    /// Whether this should be reported as a failure (logs, error styling)
    pub fn is_failure(&self) -> bool {
        !matches!(self, InteractionError::EmptyInput)
    }
}

impl From<TransportError> for InteractionError {
    fn from(error: TransportError) -> Self {
        if error.kind.is_malformed() {
            InteractionError::MalformedResponse {
                message: error.message,
            }
        } else {
            InteractionError::TransportFailure {
                status: error.status,
                message: error.message,
            }
        }
    }
}

#[allow(clippy::ref_option)] // called from the derived Display impl with field refs
fn transport_failure_message(status: &Option<u16>, message: &str) -> String {
    match status {
        Some(status) => format!("API Error: {status}"),
        None => format!("Communication error: {message}"),
    }
}

/// Returned by handle methods once the controller task has stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("interaction controller has shut down")]
pub struct ControllerClosed;
