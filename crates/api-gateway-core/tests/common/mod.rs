// crates/api-gateway-core/tests/common/mod.rs
// ============================================================================
// Module: Common Test Fixtures
// Description: Recording operations and sample registries for core tests.
// Purpose: Observe what the dispatcher passes to operations.
// Dependencies: api-gateway-core
// ============================================================================

//! ## Overview
//! [`RecordingOperation`] records every invocation (arguments and the
//! credential seen on the execution context) so tests can assert both what
//! was executed and what never was.

#![allow(dead_code, reason = "Shared test helpers may be unused in some cases.")]
#![allow(
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    reason = "Test-only helpers use unwrap for clarity."
)]

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;
use std::sync::Mutex;
use std::time::Duration;

use api_gateway_core::Arguments;
use api_gateway_core::CapabilityDescriptor;
use api_gateway_core::CapabilityRegistry;
use api_gateway_core::DynamicValue;
use api_gateway_core::ExecutionContext;
use api_gateway_core::Operation;
use api_gateway_core::OperationError;
use api_gateway_core::ParameterSchema;
use api_gateway_core::ParameterType;
use api_gateway_core::RegistryBuilder;
use async_trait::async_trait;

// ============================================================================
// SECTION: Recording Operation
// ============================================================================

/// Single observed invocation.
#[derive(Debug, Clone)]
pub struct Invocation {
    /// Arguments passed to the operation.
    pub args: Arguments,
    /// Outbound authorization header rendered from the context.
    pub authorization: Option<String>,
    /// Raw credential seen on the context.
    pub credential: Option<String>,
}

/// Operation behavior for tests.
#[derive(Debug, Clone)]
pub enum Behavior {
    /// Echo the `id` argument back in an object.
    Echo,
    /// Fail with a backend error carrying the message.
    Fail(String),
    /// Sleep before echoing.
    Delay(Duration),
}

/// Operation that records every call.
#[derive(Clone)]
pub struct RecordingOperation {
    /// Observed invocations.
    calls: Arc<Mutex<Vec<Invocation>>>,
    /// Behavior to apply.
    behavior: Behavior,
}

impl RecordingOperation {
    /// Creates an echoing operation.
    pub fn echo() -> Self {
        Self::with_behavior(Behavior::Echo)
    }

    /// Creates an operation with the given behavior.
    pub fn with_behavior(behavior: Behavior) -> Self {
        Self {
            calls: Arc::new(Mutex::new(Vec::new())),
            behavior,
        }
    }

    /// Returns all invocations so far.
    pub fn calls(&self) -> Vec<Invocation> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl Operation for RecordingOperation {
    async fn execute(
        &self,
        args: &Arguments,
        ctx: &ExecutionContext,
    ) -> Result<DynamicValue, OperationError> {
        self.calls.lock().unwrap().push(Invocation {
            args: args.clone(),
            authorization: ctx.authorization_header(),
            credential: ctx.credential().map(|credential| credential.as_str().to_string()),
        });
        match &self.behavior {
            Behavior::Echo => {}
            Behavior::Fail(message) => {
                return Err(OperationError::backend(message.clone()));
            }
            Behavior::Delay(delay) => tokio::time::sleep(*delay).await,
        }
        let id = args.get("id").cloned().unwrap_or_default();
        let mut result = std::collections::BTreeMap::new();
        result.insert("id".to_string(), id);
        Ok(DynamicValue::Object(result))
    }
}

// ============================================================================
// SECTION: Fixtures
// ============================================================================

/// Schema with a single required string `id`.
pub fn id_schema() -> ParameterSchema {
    ParameterSchema::builder()
        .required("id", ParameterType::String, "Identifier")
        .build()
        .unwrap()
}

/// Builds a descriptor named `name` over `operation`.
pub fn descriptor(name: &str, operation: &RecordingOperation) -> CapabilityDescriptor {
    CapabilityDescriptor::new(name, format!("{name} description"), id_schema(), operation.clone())
        .unwrap()
}

/// Builds a sealed registry with `get_student` and `get_course`.
pub fn sample_registry(
    student: &RecordingOperation,
    course: &RecordingOperation,
) -> CapabilityRegistry {
    let mut builder = RegistryBuilder::new();
    builder.register(descriptor("get_student", student)).unwrap();
    builder.register(descriptor("get_course", course)).unwrap();
    builder.seal()
}
