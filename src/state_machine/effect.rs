//! Effects produced by state transitions

use crate::error::InteractionError;
use crate::session::Metrics;
use crate::transport::{DetectionRequest, DetectionResponse};

/// Effects to be executed after state transition, in order
#[derive(Debug, Clone)]
pub enum Effect {
    /// Record the outgoing message in history (stamped on execution)
    AppendInitiatorTurn { content: String },

    /// Record the service's reply in history
    AppendResponderTurn { content: String },

    /// Invoke the transport in the background; its outcome comes back as an event
    RequestDetection { request: DetectionRequest },

    /// Replace the session metrics wholesale
    ApplyMetrics { metrics: Metrics },

    /// Swap in a fresh session as one unit
    ReplaceSession,

    /// Publish the full response for the analysis view
    NotifyAnalysis { response: Box<DetectionResponse> },

    /// Publish an error for the presentation layer
    NotifyError { error: InteractionError },

    /// The in-flight request has settled, successfully or not
    NotifySettled,
}

impl Effect {
    pub fn notify_error(error: InteractionError) -> Self {
        Effect::NotifyError { error }
    }
}
