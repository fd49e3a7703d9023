// crates/api-gateway-core/src/registry.rs
// ============================================================================
// Module: Capability Registry
// Description: Two-phase capability registry (building, then sealed).
// Purpose: Bind capability names to schemas and backend operations.
// Dependencies: async-trait, thiserror, crate::{context, schema, value}
// ============================================================================

//! ## Overview
//! Capabilities are collected by a [`RegistryBuilder`] during startup and
//! sealed into an immutable [`CapabilityRegistry`]. The sealed registry has
//! no mutating methods, so it can be shared behind an `Arc` by any number of
//! concurrent dispatches without locking.
//!
//! ## Invariants
//! - Names are unique. Registering a name twice fails and keeps the first
//!   descriptor.
//! - Registration order does not affect lookup or export.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::error::Error as StdError;
use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use crate::context::ExecutionContext;
use crate::schema::ParameterSchema;
use crate::value::Arguments;
use crate::value::DynamicValue;
use crate::value::ValidationError;

// ============================================================================
// SECTION: Operation Trait
// ============================================================================

/// Boxed error type returned by backend collaborators.
pub type BoxError = Box<dyn StdError + Send + Sync>;

/// Failure reported by a capability operation.
#[derive(Debug, Error)]
pub enum OperationError {
    /// Arguments passed schema validation but could not be decoded.
    #[error(transparent)]
    Invalid(#[from] ValidationError),
    /// Backend call failed.
    #[error("{source}")]
    Backend {
        /// Stable failure label safe to show to callers.
        kind: &'static str,
        /// Original backend error.
        #[source]
        source: BoxError,
    },
}

impl OperationError {
    /// Label used when the backend does not classify its failure.
    pub const UNCLASSIFIED: &'static str = "internal";

    /// Wraps an unclassified backend failure.
    pub fn backend(error: impl Into<BoxError>) -> Self {
        Self::backend_with_kind(Self::UNCLASSIFIED, error)
    }

    /// Wraps a backend failure labelled with `kind`.
    pub fn backend_with_kind(kind: &'static str, error: impl Into<BoxError>) -> Self {
        Self::Backend {
            kind,
            source: error.into(),
        }
    }
}

/// Behavior bound to a capability name.
///
/// Implementations decode the validated [`Arguments`], call their backend
/// collaborator with the supplied [`ExecutionContext`], and return a
/// JSON-like result.
#[async_trait]
pub trait Operation: Send + Sync {
    /// Executes the operation.
    ///
    /// # Errors
    ///
    /// Returns [`OperationError`] when decoding or the backend call fails.
    async fn execute(
        &self,
        args: &Arguments,
        ctx: &ExecutionContext,
    ) -> Result<DynamicValue, OperationError>;
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Registry errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// A capability with the same name is already registered.
    #[error("duplicate capability: {0}")]
    DuplicateCapability(String),
    /// Capability name is empty or contains whitespace.
    #[error("invalid capability name: {0:?}")]
    InvalidName(String),
    /// No capability is registered under the name.
    #[error("tool {0} not found")]
    NotFound(String),
}

// ============================================================================
// SECTION: Capability Descriptor
// ============================================================================

/// A named capability: description, parameter schema, and operation.
#[derive(Clone)]
pub struct CapabilityDescriptor {
    /// Unique registry key.
    name: String,
    /// Human-readable description.
    description: String,
    /// Declared parameters.
    schema: ParameterSchema,
    /// Bound behavior.
    operation: Arc<dyn Operation>,
}

impl CapabilityDescriptor {
    /// Builds a descriptor.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::InvalidName`] when `name` is empty or contains
    /// whitespace.
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        schema: ParameterSchema,
        operation: impl Operation + 'static,
    ) -> Result<Self, RegistryError> {
        Self::from_shared(name, description, schema, Arc::new(operation))
    }

    /// Builds a descriptor around an already shared operation.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::InvalidName`] when `name` is invalid.
    pub fn from_shared(
        name: impl Into<String>,
        description: impl Into<String>,
        schema: ParameterSchema,
        operation: Arc<dyn Operation>,
    ) -> Result<Self, RegistryError> {
        let name = name.into();
        if name.is_empty() || name.chars().any(char::is_whitespace) {
            return Err(RegistryError::InvalidName(name));
        }
        Ok(Self {
            name,
            description: description.into(),
            schema,
            operation,
        })
    }

    /// Returns the capability name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the description.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Returns the parameter schema.
    #[must_use]
    pub const fn schema(&self) -> &ParameterSchema {
        &self.schema
    }

    /// Returns the bound operation.
    #[must_use]
    pub fn operation(&self) -> &dyn Operation {
        self.operation.as_ref()
    }
}

impl fmt::Debug for CapabilityDescriptor {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("CapabilityDescriptor")
            .field("name", &self.name)
            .field("description", &self.description)
            .field("schema", &self.schema)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// SECTION: Registry Builder
// ============================================================================

/// Registry in the building phase.
#[derive(Debug, Default)]
pub struct RegistryBuilder {
    /// Descriptors collected so far.
    entries: BTreeMap<String, CapabilityDescriptor>,
}

impl RegistryBuilder {
    /// Creates an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a descriptor.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::DuplicateCapability`] when the name is taken;
    /// the existing descriptor is left unchanged.
    pub fn register(&mut self, descriptor: CapabilityDescriptor) -> Result<(), RegistryError> {
        if self.entries.contains_key(descriptor.name()) {
            return Err(RegistryError::DuplicateCapability(descriptor.name));
        }
        self.entries.insert(descriptor.name.clone(), descriptor);
        Ok(())
    }

    /// Returns the number of registered descriptors.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true when nothing has been registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Ends the building phase.
    #[must_use]
    pub fn seal(self) -> CapabilityRegistry {
        CapabilityRegistry {
            entries: self.entries,
        }
    }
}

// ============================================================================
// SECTION: Sealed Registry
// ============================================================================

/// Immutable capability registry.
#[derive(Debug, Clone, Default)]
pub struct CapabilityRegistry {
    /// Descriptors keyed by name.
    entries: BTreeMap<String, CapabilityDescriptor>,
}

impl CapabilityRegistry {
    /// Looks up a capability by name.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::NotFound`] when the name is unknown.
    pub fn lookup(&self, name: &str) -> Result<&CapabilityDescriptor, RegistryError> {
        self.entries.get(name).ok_or_else(|| RegistryError::NotFound(name.to_string()))
    }

    /// Returns every descriptor, ordered by name.
    pub fn list_all(&self) -> impl Iterator<Item = &CapabilityDescriptor> {
        self.entries.values()
    }

    /// Returns every capability name, sorted.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        self.entries.keys().map(String::as_str).collect()
    }

    /// Returns the number of capabilities.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true when the registry is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
