// crates/api-gateway-server/src/tools/announcements.rs
// ============================================================================
// Module: Announcement Capabilities
// Description: get_course_announcements and create_announcement.
// Purpose: Expose course announcements through the registry.
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
use api_gateway_services::NewAnnouncement;
use api_gateway_services::Services;
use async_trait::async_trait;

use super::RegistrationError;
use super::register as register_capability;
use super::service_failure;
use super::to_value;

/// Registers the announcement capabilities.
pub(super) fn register(
    builder: &mut RegistryBuilder,
    services: &Services,
) -> Result<(), RegistrationError> {
    register_capability(
        builder,
        CapabilityName::GetCourseAnnouncements,
        "Get all announcements for a specific course",
        ParameterSchema::builder()
            .required("courseId", ParameterType::String, "The ID of the course")
            .build(),
        GetCourseAnnouncements {
            courses: Arc::clone(&services.courses),
        },
    )?;
    register_capability(
        builder,
        CapabilityName::CreateAnnouncement,
        "Create a new announcement for a course",
        ParameterSchema::builder()
            .required("courseId", ParameterType::String, "The ID of the course")
            .required("title", ParameterType::String, "Title of the announcement")
            .required("content", ParameterType::String, "Content of the announcement")
            .build(),
        CreateAnnouncement {
            courses: Arc::clone(&services.courses),
        },
    )
}

/// Lists announcements for a course.
struct GetCourseAnnouncements {
    /// Courses backend.
    courses: Arc<dyn CoursesService>,
}

#[async_trait]
impl Operation for GetCourseAnnouncements {
    async fn execute(
        &self,
        args: &Arguments,
        ctx: &ExecutionContext,
    ) -> Result<DynamicValue, OperationError> {
        let course_id = args.require_str("courseId")?;
        let announcements = self
            .courses
            .course_announcements(ctx, course_id)
            .await
            .map_err(service_failure)?;
        to_value(&announcements)
    }
}

/// Posts an announcement.
struct CreateAnnouncement {
    /// Courses backend.
    courses: Arc<dyn CoursesService>,
}

#[async_trait]
impl Operation for CreateAnnouncement {
    async fn execute(
        &self,
        args: &Arguments,
        ctx: &ExecutionContext,
    ) -> Result<DynamicValue, OperationError> {
        let input = NewAnnouncement {
            course_id: args.require_str("courseId")?.to_string(),
            title: args.require_str("title")?.to_string(),
            content: args.require_str("content")?.to_string(),
        };
        let announcement =
            self.courses.create_announcement(ctx, input).await.map_err(service_failure)?;
        to_value(&announcement)
    }
}
