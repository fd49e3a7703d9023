// crates/api-gateway-core/src/context.rs
// ============================================================================
// Module: Execution Context
// Description: Per-invocation credential, deadline, and cancellation carrier.
// Purpose: Thread caller identity explicitly from dispatch to backend calls.
// Dependencies: tokio, tokio-util
// ============================================================================

//! ## Overview
//! Every backend call receives an [`ExecutionContext`] argument. The context
//! carries the caller's bearer credential (if any), an optional deadline, and
//! a cancellation token. Backends derive their outbound `Authorization`
//! header from [`ExecutionContext::authorization_header`], which is the one
//! place credentials are rendered for the wire.
//!
//! Security posture: the credential is propagated, never validated here.
//! Debug output redacts it.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;
use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Maximum inbound authorization header size accepted for parsing.
pub const MAX_AUTH_HEADER_BYTES: usize = 8 * 1024;

/// Authorization scheme used for propagated credentials.
const BEARER_SCHEME: &str = "Bearer";

// ============================================================================
// SECTION: Bearer Credential
// ============================================================================

/// Opaque bearer credential supplied by a caller.
///
/// # Invariants
/// - The token is non-empty and kept exactly as supplied.
#[derive(Clone, PartialEq, Eq)]
pub struct BearerCredential(String);

impl BearerCredential {
    /// Wraps a raw token, returning `None` for an empty token.
    #[must_use]
    pub fn new(token: &str) -> Option<Self> {
        if token.trim().is_empty() { None } else { Some(Self(token.to_string())) }
    }

    /// Extracts a bearer token from an `Authorization` header value.
    ///
    /// Returns `None` for oversized headers, non-bearer schemes, or an empty
    /// token. A missing credential is not an error at this layer.
    #[must_use]
    pub fn from_authorization_header(header: &str) -> Option<Self> {
        if header.len() > MAX_AUTH_HEADER_BYTES {
            return None;
        }
        let mut parts = header.trim().splitn(2, ' ');
        let scheme = parts.next().unwrap_or_default();
        let token = parts.next().unwrap_or_default().trim();
        if !scheme.eq_ignore_ascii_case("bearer") {
            return None;
        }
        Self::new(token)
    }

    /// Returns the raw token.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Renders the outbound `Authorization` header value.
    #[must_use]
    pub fn authorization_value(&self) -> String {
        format!("{BEARER_SCHEME} {}", self.0)
    }
}

impl fmt::Debug for BearerCredential {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str("BearerCredential(<redacted>)")
    }
}

// ============================================================================
// SECTION: Execution Context
// ============================================================================

/// Per-call execution context passed to every operation and backend call.
///
/// # Invariants
/// - Created per invocation and never shared across dispatches.
/// - Cancelling the token abandons any in-flight backend call made under it.
#[derive(Debug, Clone, Default)]
pub struct ExecutionContext {
    /// Outbound credential, when the caller supplied one.
    credential: Option<BearerCredential>,
    /// Absolute deadline for the invocation.
    deadline: Option<Instant>,
    /// Cancellation signal for the invocation.
    cancellation: CancellationToken,
    /// Correlation identifier for logs and audit records.
    request_id: Option<String>,
}

impl ExecutionContext {
    /// Returns an unauthenticated context with no deadline.
    #[must_use]
    pub fn unauthenticated() -> Self {
        Self::default()
    }

    /// Builds a context carrying `credential`; empty means unauthenticated.
    #[must_use]
    pub fn attach(credential: &str) -> Self {
        Self {
            credential: BearerCredential::new(credential),
            ..Self::default()
        }
    }

    /// Sets an absolute deadline.
    #[must_use]
    pub const fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Sets a deadline relative to now.
    #[must_use]
    pub fn with_timeout(self, timeout: Duration) -> Self {
        self.with_deadline(Instant::now() + timeout)
    }

    /// Replaces the cancellation token.
    #[must_use]
    pub fn with_cancellation(mut self, cancellation: CancellationToken) -> Self {
        self.cancellation = cancellation;
        self
    }

    /// Sets the correlation identifier.
    #[must_use]
    pub fn with_request_id(mut self, request_id: impl Into<String>) -> Self {
        self.request_id = Some(request_id.into());
        self
    }

    /// Returns the credential, if any.
    #[must_use]
    pub const fn credential(&self) -> Option<&BearerCredential> {
        self.credential.as_ref()
    }

    /// Returns the outbound `Authorization` header value, if authenticated.
    #[must_use]
    pub fn authorization_header(&self) -> Option<String> {
        self.credential.as_ref().map(BearerCredential::authorization_value)
    }

    /// Returns the absolute deadline, if any.
    #[must_use]
    pub const fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Returns time left before the deadline; zero once it has passed.
    #[must_use]
    pub fn remaining(&self) -> Option<Duration> {
        self.deadline.map(|deadline| deadline.saturating_duration_since(Instant::now()))
    }

    /// Returns the cancellation token.
    #[must_use]
    pub const fn cancellation(&self) -> &CancellationToken {
        &self.cancellation
    }

    /// Returns true once the invocation has been cancelled.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancellation.is_cancelled()
    }

    /// Returns the correlation identifier, if any.
    #[must_use]
    pub fn request_id(&self) -> Option<&str> {
        self.request_id.as_deref()
    }
}

// ============================================================================
// SECTION: Auth Context Propagator
// ============================================================================

/// Builds execution contexts for dispatch.
///
/// A single propagator is shared by every capability, so adding a
/// capability never needs its own auth wiring.
#[derive(Debug, Clone, Copy, Default)]
pub struct AuthPropagator {
    /// Deadline applied when the caller did not set one.
    default_timeout: Option<Duration>,
}

impl AuthPropagator {
    /// Creates a propagator with no default deadline.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            default_timeout: None,
        }
    }

    /// Creates a propagator applying `timeout` to contexts without a deadline.
    #[must_use]
    pub const fn with_default_timeout(timeout: Duration) -> Self {
        Self {
            default_timeout: Some(timeout),
        }
    }

    /// Builds a fresh context carrying `credential`.
    #[must_use]
    pub fn attach(&self, credential: &str) -> ExecutionContext {
        self.attach_with(credential, ExecutionContext::default())
    }

    /// Attaches `credential` to an existing context, applying the default deadline.
    ///
    /// An empty `credential` leaves any credential already on `base` in place.
    #[must_use]
    pub fn attach_with(&self, credential: &str, base: ExecutionContext) -> ExecutionContext {
        let mut ctx = base;
        if let Some(credential) = BearerCredential::new(credential) {
            ctx.credential = Some(credential);
        }
        self.apply_default_deadline(ctx)
    }

    /// Applies the default deadline to a context that has none.
    #[must_use]
    pub fn apply_default_deadline(&self, ctx: ExecutionContext) -> ExecutionContext {
        match (ctx.deadline, self.default_timeout) {
            (None, Some(timeout)) => ctx.with_timeout(timeout),
            _ => ctx,
        }
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
