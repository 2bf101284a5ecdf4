//! Detection service transport
//!
//! The controller's only boundary dependency: one call per submitted message.

mod error;
mod http;
mod types;

pub use error::{TransportError, TransportErrorKind};
pub use http::HttpTransport;
pub use types::*;

use async_trait::async_trait;
use std::sync::Arc;

/// Sends one message to the detection service
#[async_trait]
pub trait DetectionTransport: Send + Sync {
    async fn detect(&self, request: &DetectionRequest) -> Result<DetectionResponse, TransportError>;

    /// Where requests go, for logging
    fn endpoint(&self) -> &str;
}

#[async_trait]
impl<T: DetectionTransport + ?Sized> DetectionTransport for Arc<T> {
    async fn detect(&self, request: &DetectionRequest) -> Result<DetectionResponse, TransportError> {
        (**self).detect(request).await
    }

    fn endpoint(&self) -> &str {
        (**self).endpoint()
    }
}

/// Logging wrapper for transports
pub struct LoggingTransport<T> {
    inner: T,
}

impl<T: DetectionTransport> LoggingTransport<T> {
    pub fn new(inner: T) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl<T: DetectionTransport> DetectionTransport for LoggingTransport<T> {
    async fn detect(&self, request: &DetectionRequest) -> Result<DetectionResponse, TransportError> {
        let start = std::time::Instant::now();
        let result = self.inner.detect(request).await;
        let duration = start.elapsed();

        match &result {
            Ok(response) => {
                tracing::info!(
                    endpoint = %self.inner.endpoint(),
                    conversation_id = %request.conversation_id,
                    duration_ms = %duration.as_millis(),
                    scam_detected = response.scam_detected,
                    confidence = response.confidence_score,
                    total_turns = response.engagement_metrics.total_turns,
                    "Detection request completed"
                );
            }
            Err(e) => {
                tracing::error!(
                    endpoint = %self.inner.endpoint(),
                    conversation_id = %request.conversation_id,
                    duration_ms = %duration.as_millis(),
                    kind = ?e.kind,
                    status = ?e.status,
                    error = %e.message,
                    "Detection request failed"
                );
            }
        }

        result
    }

    fn endpoint(&self) -> &str {
        self.inner.endpoint()
    }
}
