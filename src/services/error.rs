//! Service error types

use thiserror::Error;

/// Adapter error with classification
#[derive(Debug, Error)]
#[error("{message}")]
pub struct ServiceError {
    pub kind: ServiceErrorKind,
    pub message: String,
}

impl ServiceError {
    pub fn new(kind: ServiceErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::new(ServiceErrorKind::Network, message)
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::new(ServiceErrorKind::InvalidRequest, message)
    }

    pub fn auth(message: impl Into<String>) -> Self {
        Self::new(ServiceErrorKind::Auth, message)
    }

    pub fn rate_limit(message: impl Into<String>) -> Self {
        Self::new(ServiceErrorKind::RateLimit, message)
    }

    pub fn server_error(message: impl Into<String>) -> Self {
        Self::new(ServiceErrorKind::ServerError, message)
    }

    pub fn decode(message: impl Into<String>) -> Self {
        Self::new(ServiceErrorKind::Decode, message)
    }

    pub fn unknown(message: impl Into<String>) -> Self {
        Self::new(ServiceErrorKind::Unknown, message)
    }
}

/// Error classification for logging and recovery hints
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceErrorKind {
    /// Network issues, timeouts - resubmitting may help
    Network,
    /// Bad request (400) - resubmitting the same input won't help
    InvalidRequest,
    /// Authentication failed (401, 403) - not retryable
    Auth,
    /// Rate limited (429) - resubmitting later may help
    RateLimit,
    /// Server error (5xx) - resubmitting may help
    ServerError,
    /// Response body matched no known shape
    Decode,
    /// Unknown error
    Unknown,
}

impl ServiceErrorKind {
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Network | Self::RateLimit | Self::ServerError)
    }
}
