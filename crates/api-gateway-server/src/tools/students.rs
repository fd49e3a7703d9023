// crates/api-gateway-server/src/tools/students.rs
// ============================================================================
// Module: Student Capabilities
// Description: get_student and create_student.
// Purpose: Expose the students service through the registry.
// Dependencies: api-gateway-core, api-gateway-services
// ============================================================================

use std::sync::Arc;

use api_gateway_core::Arguments;
use api_gateway_core::CapabilityName;
use api_gateway_core::DynamicValue;
use api_gateway_core::ExecutionContext;
use api_gateway_core::Operation;
use api_gateway_core::OperationError;
use api_gateway_core::ParameterSchema;
use api_gateway_core::ParameterType;
use api_gateway_core::RegistryBuilder;
use api_gateway_services::NewStudent;
use api_gateway_services::Services;
use api_gateway_services::StudentsService;
use async_trait::async_trait;

use super::RegistrationError;
use super::register as register_capability;
use super::service_failure;
use super::to_value;

/// Registers the student capabilities.
pub(super) fn register(
    builder: &mut RegistryBuilder,
    services: &Services,
) -> Result<(), RegistrationError> {
    register_capability(
        builder,
        CapabilityName::GetStudent,
        "Get detailed information about a student by ID",
        ParameterSchema::builder()
            .required("id", ParameterType::String, "The ID of the student")
            .build(),
        GetStudent {
            students: Arc::clone(&services.students),
        },
    )?;
    register_capability(
        builder,
        CapabilityName::CreateStudent,
        "Create a new student",
        ParameterSchema::builder()
            .required("firstName", ParameterType::String, "Student's first name")
            .required("lastName", ParameterType::String, "Student's last name")
            .required("email", ParameterType::String, "Student's email address")
            .required("phoneNumber", ParameterType::String, "Student's phone number")
            .build(),
        CreateStudent {
            students: Arc::clone(&services.students),
        },
    )
}

/// Fetches one student.
struct GetStudent {
    /// Students backend.
    students: Arc<dyn StudentsService>,
}

#[async_trait]
impl Operation for GetStudent {
    async fn execute(
        &self,
        args: &Arguments,
        ctx: &ExecutionContext,
    ) -> Result<DynamicValue, OperationError> {
        let id = args.require_str("id")?;
        let student = self.students.get_student(ctx, id).await.map_err(service_failure)?;
        to_value(&student)
    }
}

/// Creates a student.
struct CreateStudent {
    /// Students backend.
    students: Arc<dyn StudentsService>,
}

#[async_trait]
impl Operation for CreateStudent {
    async fn execute(
        &self,
        args: &Arguments,
        ctx: &ExecutionContext,
    ) -> Result<DynamicValue, OperationError> {
        let input = NewStudent {
            first_name: args.require_str("firstName")?.to_string(),
            last_name: args.require_str("lastName")?.to_string(),
            email: args.require_str("email")?.to_string(),
            phone_number: args.require_str("phoneNumber")?.to_string(),
        };
        let student =
            self.students.create_student(ctx, input).await.map_err(service_failure)?;
        to_value(&student)
    }
}
