// crates/api-gateway-server/src/tools/homework.rs
// ============================================================================
// Module: Homework Capabilities
// Description: get_course_homework and create_homework.
// Purpose: Expose course homework through the registry.
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
use api_gateway_services::CoursesService;
use api_gateway_services::NewHomework;
use api_gateway_services::Services;
use async_trait::async_trait;

use super::RegistrationError;
use super::register as register_capability;
use super::service_failure;
use super::to_value;

/// Registers the homework capabilities.
pub(super) fn register(
    builder: &mut RegistryBuilder,
    services: &Services,
) -> Result<(), RegistrationError> {
    register_capability(
        builder,
        CapabilityName::GetCourseHomework,
        "Get all homework assignments for a specific course",
        ParameterSchema::builder()
            .required("courseId", ParameterType::String, "The ID of the course")
            .build(),
        GetCourseHomework {
            courses: Arc::clone(&services.courses),
        },
    )?;
    register_capability(
        builder,
        CapabilityName::CreateHomework,
        "Create a new homework assignment for a course",
        ParameterSchema::builder()
            .required("courseId", ParameterType::String, "The ID of the course")
            .required("title", ParameterType::String, "Title of the homework assignment")
            .required("description", ParameterType::String, "Detailed description of the homework")
            .required(
                "workflow",
                ParameterType::String,
                "Workflow/instructions for completing the homework",
            )
            .required(
                "dueDate",
                ParameterType::String,
                "Due date in ISO format (e.g., '2025-07-15T23:59:59Z')",
            )
            .build(),
        CreateHomework {
            courses: Arc::clone(&services.courses),
        },
    )
}

/// Lists homework for a course.
struct GetCourseHomework {
    /// Courses backend.
    courses: Arc<dyn CoursesService>,
}

#[async_trait]
impl Operation for GetCourseHomework {
    async fn execute(
        &self,
        args: &Arguments,
        ctx: &ExecutionContext,
    ) -> Result<DynamicValue, OperationError> {
        let course_id = args.require_str("courseId")?;
        let homework =
            self.courses.course_homework(ctx, course_id).await.map_err(service_failure)?;
        to_value(&homework)
    }
}

/// Creates a homework assignment.
struct CreateHomework {
    /// Courses backend.
    courses: Arc<dyn CoursesService>,
}

#[async_trait]
impl Operation for CreateHomework {
    async fn execute(
        &self,
        args: &Arguments,
        ctx: &ExecutionContext,
    ) -> Result<DynamicValue, OperationError> {
        let input = NewHomework {
            course_id: args.require_str("courseId")?.to_string(),
            title: args.require_str("title")?.to_string(),
            description: args.require_str("description")?.to_string(),
            workflow: args.require_str("workflow")?.to_string(),
            due_date: args.require_str("dueDate")?.to_string(),
        };
        let homework =
            self.courses.create_homework(ctx, input).await.map_err(service_failure)?;
        to_value(&homework)
    }
}
