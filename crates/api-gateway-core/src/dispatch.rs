// crates/api-gateway-core/src/dispatch.rs
// ============================================================================
// Module: Capability Dispatcher
// Description: Resolves, validates, and invokes capabilities by name.
// Purpose: Enforce validate-then-invoke with deadline and cancellation.
// Dependencies: tokio, thiserror, crate::{context, registry, value}
// ============================================================================

//! ## Overview
//! [`Dispatcher::execute`] runs the fixed pipeline:
//! 1. Look up the capability; unknown names fail with
//!    [`DispatchError::NotFound`].
//! 2. Build the [`ExecutionContext`] through the [`AuthPropagator`].
//! 3. Validate arguments against the declared schema. Nothing is invoked
//!    when validation fails.
//! 4. Invoke the operation, racing it against the context's deadline and
//!    cancellation token.
//! 5. Return the result, or wrap the backend failure with its cause intact.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;

use thiserror::Error;

use crate::context::AuthPropagator;
use crate::context::ExecutionContext;
use crate::registry::BoxError;
use crate::registry::CapabilityRegistry;
use crate::registry::OperationError;
use crate::value::Arguments;
use crate::value::DynamicValue;
use crate::value::ValidationError;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Dispatch failures returned to the transport layer.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// Capability name is not registered.
    #[error("tool {name} not found")]
    NotFound {
        /// Requested name.
        name: String,
    },
    /// Arguments failed validation.
    #[error("{capability}: {source}")]
    Validation {
        /// Capability being invoked.
        capability: String,
        /// Validation failure.
        #[source]
        source: ValidationError,
    },
    /// Backend operation failed. The display form names only the failure
    /// kind; the cause stays available through `source()` for logs.
    #[error("{capability}: backend call failed ({kind})")]
    Backend {
        /// Capability being invoked.
        capability: String,
        /// Stable failure label from the backend.
        kind: &'static str,
        /// Original backend error.
        #[source]
        cause: BoxError,
    },
    /// Deadline expired before the operation completed.
    #[error("{capability}: deadline exceeded")]
    DeadlineExceeded {
        /// Capability being invoked.
        capability: String,
    },
    /// Invocation was cancelled.
    #[error("{capability}: request cancelled")]
    Cancelled {
        /// Capability being invoked.
        capability: String,
    },
}

impl DispatchError {
    /// Returns a stable label for logs and audit records.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::NotFound {
                ..
            } => "not_found",
            Self::Validation {
                ..
            } => "validation",
            Self::Backend {
                ..
            } => "backend",
            Self::DeadlineExceeded {
                ..
            } => "deadline_exceeded",
            Self::Cancelled {
                ..
            } => "cancelled",
        }
    }

    /// Returns the offending parameter name for validation failures.
    #[must_use]
    pub fn parameter(&self) -> Option<&str> {
        match self {
            Self::Validation {
                source, ..
            } => Some(&source.parameter),
            _ => None,
        }
    }

    /// Returns the capability name the error refers to.
    #[must_use]
    pub fn capability(&self) -> &str {
        match self {
            Self::NotFound {
                name,
            } => name,
            Self::Validation {
                capability, ..
            }
            | Self::Backend {
                capability, ..
            }
            | Self::DeadlineExceeded {
                capability,
            }
            | Self::Cancelled {
                capability,
            } => capability,
        }
    }
}

// ============================================================================
// SECTION: Dispatcher
// ============================================================================

/// Executes capabilities from a sealed registry.
///
/// # Invariants
/// - Holds only shared read-only state; clones are cheap and independent.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    /// Sealed registry.
    registry: Arc<CapabilityRegistry>,
    /// Context builder.
    propagator: AuthPropagator,
}

impl Dispatcher {
    /// Creates a dispatcher over `registry`.
    #[must_use]
    pub const fn new(registry: Arc<CapabilityRegistry>, propagator: AuthPropagator) -> Self {
        Self {
            registry,
            propagator,
        }
    }

    /// Returns the registry being dispatched against.
    #[must_use]
    pub fn registry(&self) -> &CapabilityRegistry {
        &self.registry
    }

    /// Executes `name` with `args` under a fresh context carrying `credential`.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError`] on lookup, validation, backend, deadline, or
    /// cancellation failure.
    pub async fn execute(
        &self,
        name: &str,
        args: &Arguments,
        credential: &str,
    ) -> Result<DynamicValue, DispatchError> {
        self.execute_in(name, args, credential, ExecutionContext::default()).await
    }

    /// Executes `name` using `base` for cancellation, deadline, and request id.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError`] on lookup, validation, backend, deadline, or
    /// cancellation failure.
    pub async fn execute_in(
        &self,
        name: &str,
        args: &Arguments,
        credential: &str,
        base: ExecutionContext,
    ) -> Result<DynamicValue, DispatchError> {
        let descriptor = self.registry.lookup(name).map_err(|_| DispatchError::NotFound {
            name: name.to_string(),
        })?;
        let ctx = self.propagator.attach_with(credential, base);
        let capability = descriptor.name();

        descriptor.schema().validate(args).map_err(|source| DispatchError::Validation {
            capability: capability.to_string(),
            source,
        })?;
        if ctx.is_cancelled() {
            return Err(DispatchError::Cancelled {
                capability: capability.to_string(),
            });
        }

        let invocation = descriptor.operation().execute(args, &ctx);
        let outcome = match ctx.deadline() {
            Some(deadline) => tokio::select! {
                biased;
                () = ctx.cancellation().cancelled() => {
                    return Err(DispatchError::Cancelled { capability: capability.to_string() });
                }
                timed = tokio::time::timeout_at(deadline, invocation) => {
                    timed.map_err(|_| DispatchError::DeadlineExceeded {
                        capability: capability.to_string(),
                    })?
                }
            },
            None => tokio::select! {
                biased;
                () = ctx.cancellation().cancelled() => {
                    return Err(DispatchError::Cancelled { capability: capability.to_string() });
                }
                result = invocation => result,
            },
        };

        outcome.map_err(|error| match error {
            OperationError::Invalid(source) => DispatchError::Validation {
                capability: capability.to_string(),
                source,
            },
            OperationError::Backend {
                kind,
                source,
            } => DispatchError::Backend {
                capability: capability.to_string(),
                kind,
                cause: source,
            },
        })
    }
}
