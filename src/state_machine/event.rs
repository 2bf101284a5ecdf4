//! Events that can occur during an interaction

use crate::error::InteractionError;
use crate::transport::DetectionResponse;

/// Events that trigger state transitions
#[derive(Debug, Clone)]
pub enum Event {
    // User events
    Submit { text: String },
    Reset,

    // Transport events
    DetectionSucceeded { response: Box<DetectionResponse> },
    DetectionFailed { error: InteractionError },
}
