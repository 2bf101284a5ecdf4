//! Pure state transition function
//!
//! Given the same state, session and event it always produces the same
//! outputs; timestamps, ids and network calls live in the effects.

use super::{ControllerState, Effect, Event};
use crate::error::InteractionError;
use crate::session::{derive_metrics, Session};
use crate::transport::DetectionRequest;
use thiserror::Error;

/// Result of a state transition
#[derive(Debug)]
pub struct TransitionResult {
    pub new_state: ControllerState,
    pub effects: Vec<Effect>,
}

impl TransitionResult {
    pub fn new(state: ControllerState) -> Self {
        Self {
            new_state: state,
            effects: vec![],
        }
    }

    pub fn with_effect(mut self, effect: Effect) -> Self {
        self.effects.push(effect);
        self
    }

    pub fn with_effects(mut self, effects: impl IntoIterator<Item = Effect>) -> Self {
        self.effects.extend(effects);
        self
    }
}

/// Events rejected without any effect
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransitionError {
    #[error("A request is already in flight; wait for it to settle")]
    InputLocked,
    #[error("Cannot reset the session while a request is in flight")]
    ResetWhileInFlight,
    #[error("Invalid transition: {0}")]
    InvalidTransition(String),
}

/// Pure transition function
pub fn transition(
    state: &ControllerState,
    session: &Session,
    event: Event,
) -> Result<TransitionResult, TransitionError> {
    match (state, event) {
        // ============================================================
        // Submit
        // ============================================================

        // Idle + Submit(blank) -> Idle, nothing sent, nothing recorded
        (ControllerState::Idle, Event::Submit { text }) if text.trim().is_empty() => {
            Ok(TransitionResult::new(ControllerState::Idle)
                .with_effect(Effect::notify_error(InteractionError::EmptyInput)))
        }

        // Idle + Submit -> InFlight. The request carries the history as it was
        // before this message; the message itself travels in `message`.
        (ControllerState::Idle, Event::Submit { text }) => {
            let message = text.trim().to_string();
            let request = DetectionRequest::new(session.id(), message.clone(), session.history());
            Ok(TransitionResult::new(ControllerState::InFlight {
                message: message.clone(),
            })
            .with_effect(Effect::AppendInitiatorTurn { content: message })
            .with_effect(Effect::RequestDetection { request }))
        }

        (ControllerState::InFlight { .. }, Event::Submit { .. }) => {
            Err(TransitionError::InputLocked)
        }

        // ============================================================
        // Reset
        // ============================================================
        (ControllerState::Idle, Event::Reset) => {
            Ok(TransitionResult::new(ControllerState::Idle).with_effect(Effect::ReplaceSession))
        }

        (ControllerState::InFlight { .. }, Event::Reset) => {
            Err(TransitionError::ResetWhileInFlight)
        }

        // ============================================================
        // Settling
        // ============================================================

        // InFlight + DetectionSucceeded -> Idle, reply recorded, metrics superseded
        (ControllerState::InFlight { .. }, Event::DetectionSucceeded { response }) => {
            let metrics = derive_metrics(&response);
            Ok(TransitionResult::new(ControllerState::Idle).with_effects([
                Effect::AppendResponderTurn {
                    content: response.response_message.clone(),
                },
                Effect::ApplyMetrics { metrics },
                Effect::NotifyAnalysis { response },
                Effect::NotifySettled,
            ]))
        }

        // InFlight + DetectionFailed -> Idle, history and metrics untouched
        (ControllerState::InFlight { .. }, Event::DetectionFailed { error }) => {
            Ok(TransitionResult::new(ControllerState::Idle)
                .with_effect(Effect::notify_error(error))
                .with_effect(Effect::NotifySettled))
        }

        // ============================================================
        // Invalid Transitions
        // ============================================================
        (state, event) => Err(TransitionError::InvalidTransition(format!(
            "No transition from {state:?} with event {event:?}"
        ))),
    }
}
