// crates/api-gateway-server/src/tools/courses.rs
// ============================================================================
// Module: Course Capabilities
// Description: get_course, create_course, and get_course_students.
// Purpose: Expose course records and enrollment through the registry.
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
use api_gateway_services::NewCourse;
use api_gateway_services::Services;
use async_trait::async_trait;

use super::RegistrationError;
use super::optional_string;
use super::register as register_capability;
use super::service_failure;
use super::to_value;

/// Registers the course capabilities.
pub(super) fn register(
    builder: &mut RegistryBuilder,
    services: &Services,
) -> Result<(), RegistrationError> {
    register_capability(
        builder,
        CapabilityName::GetCourse,
        "Get detailed information about a course by ID",
        ParameterSchema::builder()
            .required("id", ParameterType::String, "The ID of the course")
            .build(),
        GetCourse {
            courses: Arc::clone(&services.courses),
        },
    )?;
    register_capability(
        builder,
        CapabilityName::CreateCourse,
        "Create a new course",
        ParameterSchema::builder()
            .required("name", ParameterType::String, "Course name")
            .required("semester", ParameterType::String, "Semester (e.g., 'Fall 2025')")
            .optional("description", ParameterType::String, "Course description")
            .build(),
        CreateCourse {
            courses: Arc::clone(&services.courses),
        },
    )?;
    register_capability(
        builder,
        CapabilityName::GetCourseStudents,
        "Get all students enrolled in a specific course",
        ParameterSchema::builder()
            .required("courseId", ParameterType::String, "The ID of the course")
            .build(),
        GetCourseStudents {
            courses: Arc::clone(&services.courses),
        },
    )
}

/// Fetches one course.
struct GetCourse {
    /// Courses backend.
    courses: Arc<dyn CoursesService>,
}

#[async_trait]
impl Operation for GetCourse {
    async fn execute(
        &self,
        args: &Arguments,
        ctx: &ExecutionContext,
    ) -> Result<DynamicValue, OperationError> {
        let id = args.require_str("id")?;
        let course = self.courses.get_course(ctx, id).await.map_err(service_failure)?;
        to_value(&course)
    }
}

/// Creates a course.
struct CreateCourse {
    /// Courses backend.
    courses: Arc<dyn CoursesService>,
}

#[async_trait]
impl Operation for CreateCourse {
    async fn execute(
        &self,
        args: &Arguments,
        ctx: &ExecutionContext,
    ) -> Result<DynamicValue, OperationError> {
        let input = NewCourse {
            name: args.require_str("name")?.to_string(),
            semester: args.require_str("semester")?.to_string(),
            description: optional_string(args, "description")?,
        };
        let course = self.courses.create_course(ctx, input).await.map_err(service_failure)?;
        to_value(&course)
    }
}

/// Lists students enrolled in a course.
struct GetCourseStudents {
    /// Courses backend.
    courses: Arc<dyn CoursesService>,
}

#[async_trait]
impl Operation for GetCourseStudents {
    async fn execute(
        &self,
        args: &Arguments,
        ctx: &ExecutionContext,
    ) -> Result<DynamicValue, OperationError> {
        let course_id = args.require_str("courseId")?;
        let students =
            self.courses.course_students(ctx, course_id).await.map_err(service_failure)?;
        to_value(&students)
    }
}
