//! Transport error types

use thiserror::Error;

/// Transport error with classification
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct TransportError {
    pub kind: TransportErrorKind,
    /// HTTP status, when the service answered at all
    pub status: Option<u16>,
    pub message: String,
}

impl TransportError {
    pub fn new(kind: TransportErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            status: None,
            message: message.into(),
        }
    }

    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::new(TransportErrorKind::Network, message)
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(TransportErrorKind::Timeout, message)
    }

    pub fn auth(message: impl Into<String>) -> Self {
        Self::new(TransportErrorKind::Auth, message)
    }

    pub fn rate_limit(message: impl Into<String>) -> Self {
        Self::new(TransportErrorKind::RateLimit, message)
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::new(TransportErrorKind::InvalidRequest, message)
    }

    pub fn server_error(message: impl Into<String>) -> Self {
        Self::new(TransportErrorKind::ServerError, message)
    }

    pub fn malformed(message: impl Into<String>) -> Self {
        Self::new(TransportErrorKind::MalformedBody, message)
    }

    pub fn unknown(message: impl Into<String>) -> Self {
        Self::new(TransportErrorKind::Unknown, message)
    }

    /// Classify a non-success HTTP status
    pub fn from_status(status: u16, body: &str) -> Self {
        let error = match status {
            401 | 403 => Self::auth(format!("Authentication failed: {body}")),
            429 => Self::rate_limit(format!("Rate limited: {body}")),
            400 | 422 => Self::invalid_request(format!("Invalid request: {body}")),
            500..=599 => Self::server_error(format!("Server error: {body}")),
            _ => Self::unknown(format!("HTTP {status}: {body}")),
        };
        error.with_status(status)
    }
}

/// Error classification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportErrorKind {
    /// Connection refused, reset, DNS
    Network,
    /// Request exceeded the configured timeout
    Timeout,
    /// API key rejected (401, 403)
    Auth,
    /// Rate limited (429)
    RateLimit,
    /// Bad request (400, 422)
    InvalidRequest,
    /// Server error (5xx)
    ServerError,
    /// 2xx with a body that does not match the response contract
    MalformedBody,
    /// Unknown error
    Unknown,
}

impl TransportErrorKind {
    /// The service answered 2xx but broke the response contract
    pub fn is_malformed(self) -> bool {
        matches!(self, Self::MalformedBody)
    }
}
