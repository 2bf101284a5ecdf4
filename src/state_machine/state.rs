//! Controller state types

use serde::{Deserialize, Serialize};

/// Input-availability state of the controller.
///
/// Validating and settling happen inside a single transition, so only the
/// two stable states are represented.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ControllerState {
    /// Ready for input, no request in flight
    #[default]
    Idle,

    /// Request in flight; input locked until it settles
    InFlight {
        /// The trimmed message that was sent
        message: String,
    },
}

impl ControllerState {
    /// True exactly while a request is in flight
    pub fn is_input_locked(&self) -> bool {
        matches!(self, ControllerState::InFlight { .. })
    }

    pub fn pending_message(&self) -> Option<&str> {
        match self {
            ControllerState::Idle => None,
            ControllerState::InFlight { message } => Some(message),
        }
    }
}
