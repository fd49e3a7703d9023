// crates/api-gateway-core/src/lib.rs
// ============================================================================
// Module: API Gateway Core Library
// Description: Public API surface for the capability registry and dispatcher.
// Purpose: Expose the registry, dispatch, and catalogue types.
// Dependencies: crate::{capability, catalogue, context, dispatch, registry, schema, value}
// ============================================================================

//! ## Overview
//! The gateway core declares a catalogue of named capabilities with
//! self-describing parameter schemas, validates caller arguments against those
//! schemas, threads the caller's bearer credential through an explicit
//! [`ExecutionContext`], and invokes the bound backend operation. It performs
//! no I/O of its own; backend operations are supplied through the
//! [`Operation`] trait.
//!
//! ## Lifecycle
//! A [`RegistryBuilder`] collects descriptors during startup and is consumed by
//! [`RegistryBuilder::seal`], producing an immutable [`CapabilityRegistry`].
//! Only the sealed registry can be dispatched against or exported.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod capability;
pub mod catalogue;
pub mod context;
pub mod dispatch;
pub mod registry;
pub mod schema;
pub mod value;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use capability::CapabilityFamily;
pub use capability::CapabilityName;
pub use catalogue::CatalogueEntry;
pub use catalogue::export_catalogue;
pub use catalogue::export_catalogue_json;
pub use context::AuthPropagator;
pub use context::BearerCredential;
pub use context::ExecutionContext;
pub use context::MAX_AUTH_HEADER_BYTES;
pub use dispatch::DispatchError;
pub use dispatch::Dispatcher;
pub use registry::BoxError;
pub use registry::CapabilityDescriptor;
pub use registry::CapabilityRegistry;
pub use registry::Operation;
pub use registry::OperationError;
pub use registry::RegistryBuilder;
pub use registry::RegistryError;
pub use schema::Parameter;
pub use schema::ParameterSchema;
pub use schema::ParameterSchemaBuilder;
pub use schema::ParameterType;
pub use schema::SchemaError;
pub use value::Arguments;
pub use value::DynamicValue;
pub use value::ValidationError;
pub use value::ValidationReason;
