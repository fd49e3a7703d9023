// crates/api-gateway-services/src/error.rs
// ============================================================================
// Module: Service Errors
// Description: Failures reported by backend service collaborators.
// Purpose: Give capability operations a single error type to wrap.
// Dependencies: thiserror
// ============================================================================

//! ## Overview
//! [`ServiceError`] messages are surfaced to callers through the dispatch
//! error chain. They name the service and the failing condition but never
//! include credentials or raw transport internals.

use thiserror::Error;

/// Backend service failure.
///
/// # Invariants
/// - Variants are stable for error mapping and tests.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ServiceError {
    /// Endpoint configuration could not be used.
    #[error("{service} service misconfigured: {message}")]
    Config {
        /// Service label.
        service: &'static str,
        /// Failure description.
        message: String,
    },
    /// Network or protocol failure before a response was received.
    #[error("{service} service unreachable: {message}")]
    Transport {
        /// Service label.
        service: &'static str,
        /// Failure description.
        message: String,
    },
    /// The call did not finish within its timeout.
    #[error("{service} service timed out")]
    Timeout {
        /// Service label.
        service: &'static str,
    },
    /// The call was abandoned because the invocation was cancelled.
    #[error("{service} service call cancelled")]
    Cancelled {
        /// Service label.
        service: &'static str,
    },
    /// The backend rejected the caller's credential.
    #[error("{service} service rejected credentials (status {status})")]
    Unauthorized {
        /// Service label.
        service: &'static str,
        /// HTTP status code.
        status: u16,
    },
    /// The requested record does not exist.
    #[error("{service} {resource} not found")]
    NotFound {
        /// Service label.
        service: &'static str,
        /// Resource description.
        resource: String,
    },
    /// The backend returned an unexpected status.
    #[error("{service} service returned status {status}: {message}")]
    Status {
        /// Service label.
        service: &'static str,
        /// HTTP status code.
        status: u16,
        /// Response body preview.
        message: String,
    },
    /// The backend response could not be decoded.
    #[error("{service} service sent an invalid response: {message}")]
    Decode {
        /// Service label.
        service: &'static str,
        /// Failure description.
        message: String,
    },
    /// The backend response exceeded the size limit.
    #[error("{service} service response exceeds {limit} bytes")]
    ResponseTooLarge {
        /// Service label.
        service: &'static str,
        /// Size limit in bytes.
        limit: usize,
    },
    /// Internal failure inside the gateway.
    #[error("{service} service internal error: {message}")]
    Internal {
        /// Service label.
        service: &'static str,
        /// Failure description.
        message: String,
    },
}

impl ServiceError {
    /// Returns a stable label for logs.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Config {
                ..
            } => "config",
            Self::Transport {
                ..
            } => "transport",
            Self::Timeout {
                ..
            } => "timeout",
            Self::Cancelled {
                ..
            } => "cancelled",
            Self::Unauthorized {
                ..
            } => "unauthorized",
            Self::NotFound {
                ..
            } => "not_found",
            Self::Status {
                ..
            } => "status",
            Self::Decode {
                ..
            } => "decode",
            Self::ResponseTooLarge {
                ..
            } => "response_too_large",
            Self::Internal {
                ..
            } => "internal",
        }
    }
}
