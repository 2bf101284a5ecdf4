//! Interaction state machine
//!
//! Implements the Elm Architecture pattern with pure state transitions: the
//! transition function decides, the runtime executes the resulting effects.

mod effect;
pub mod event;
pub mod state;
pub(crate) mod transition;

#[cfg(test)]
mod proptests;

pub use effect::Effect;
pub use event::Event;
pub use state::ControllerState;
pub use transition::{transition, TransitionError};
