// crates/api-gateway-server/src/tools/mod.rs
// ============================================================================
// Module: Capability Population
// Description: Registers one capability per backend operation.
// Purpose: Build the sealed registry served by the HTTP surface.
// Dependencies: api-gateway-core, api-gateway-services, serde_json
// ============================================================================

//! ## Overview
//! Each operation family lives in its own module and contributes its
//! capabilities to a shared [`RegistryBuilder`]. [`build_registry`] runs every
//! family and seals the result; a duplicate name or an inconsistent schema
//! aborts startup.

// ============================================================================
// SECTION: Modules
// ============================================================================

mod announcements;
mod chat;
mod courses;
mod grades;
mod homework;
mod staff;
mod students;

// ============================================================================
// SECTION: Imports
// ============================================================================

use api_gateway_core::Arguments;
use api_gateway_core::CapabilityDescriptor;
use api_gateway_core::CapabilityFamily;
use api_gateway_core::CapabilityName;
use api_gateway_core::CapabilityRegistry;
use api_gateway_core::DynamicValue;
use api_gateway_core::Operation;
use api_gateway_core::OperationError;
use api_gateway_core::ParameterSchema;
use api_gateway_core::RegistryBuilder;
use api_gateway_core::RegistryError;
use api_gateway_core::SchemaError;
use api_gateway_services::ServiceError;
use api_gateway_services::Services;
use serde::Serialize;
use thiserror::Error;

pub use chat::chat_context;
pub use chat::chat_history;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Registry population failure. Fatal at startup.
#[derive(Debug, Error)]
pub enum RegistrationError {
    /// A declared schema is inconsistent.
    #[error("invalid schema for {capability}: {source}")]
    Schema {
        /// Capability being registered.
        capability: &'static str,
        /// Schema failure.
        #[source]
        source: SchemaError,
    },
    /// The registry rejected a descriptor.
    #[error(transparent)]
    Registry(#[from] RegistryError),
}

// ============================================================================
// SECTION: Registry Population
// ============================================================================

/// Builds the sealed capability registry over `services`.
///
/// # Errors
///
/// Returns [`RegistrationError`] when a schema is invalid or a capability
/// name is registered twice.
pub fn build_registry(services: &Services) -> Result<CapabilityRegistry, RegistrationError> {
    let mut builder = RegistryBuilder::new();
    for family in CapabilityFamily::all() {
        let before = builder.len();
        register_family(&mut builder, *family, services)?;
        tracing::debug!(
            family = family.as_str(),
            capabilities = builder.len() - before,
            "capability family registered"
        );
    }
    tracing::debug!(capabilities = builder.len(), "capability registry sealed");
    Ok(builder.seal())
}

/// Registers every capability of `family`.
fn register_family(
    builder: &mut RegistryBuilder,
    family: CapabilityFamily,
    services: &Services,
) -> Result<(), RegistrationError> {
    match family {
        CapabilityFamily::Student => students::register(builder, services),
        CapabilityFamily::Staff => staff::register(builder, services),
        CapabilityFamily::Course => courses::register(builder, services),
        CapabilityFamily::Grade => grades::register(builder, services),
        CapabilityFamily::Homework => homework::register(builder, services),
        CapabilityFamily::Announcement => announcements::register(builder, services),
        CapabilityFamily::Chat => chat::register(builder, services),
    }
}

/// Registers one capability under its canonical name.
fn register(
    builder: &mut RegistryBuilder,
    name: CapabilityName,
    description: &str,
    schema: Result<ParameterSchema, SchemaError>,
    operation: impl Operation + 'static,
) -> Result<(), RegistrationError> {
    let schema = schema.map_err(|source| RegistrationError::Schema {
        capability: name.as_str(),
        source,
    })?;
    builder.register(CapabilityDescriptor::new(name.as_str(), description, schema, operation)?)?;
    Ok(())
}

/// Converts a backend record into a dynamic result value.
fn to_value<T: Serialize>(record: &T) -> Result<DynamicValue, OperationError> {
    serde_json::to_value(record)
        .map(DynamicValue::from)
        .map_err(|err| OperationError::backend_with_kind("serialization", err))
}

/// Wraps a backend service failure, labelled with its kind.
fn service_failure(err: ServiceError) -> OperationError {
    OperationError::backend_with_kind(err.kind(), err)
}

/// Returns an optional string argument as an owned value.
fn optional_string(args: &Arguments, name: &str) -> Result<Option<String>, OperationError> {
    Ok(args.optional_str(name)?.map(str::to_string))
}
