// crates/api-gateway-server/src/tools/grades.rs
// ============================================================================
// Module: Grade Capabilities
// Description: get_student_course_grades and create_grade.
// Purpose: Expose the grades service through the registry.
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
use api_gateway_services::GradesService;
use api_gateway_services::NewGrade;
use api_gateway_services::Services;
use async_trait::async_trait;

use super::RegistrationError;
use super::optional_string;
use super::register as register_capability;
use super::service_failure;
use super::to_value;

/// Shared description of the semester parameter.
const SEMESTER_DESCRIPTION: &str = "The semester (e.g., 'Fall 2025')";

/// Registers the grade capabilities.
pub(super) fn register(
    builder: &mut RegistryBuilder,
    services: &Services,
) -> Result<(), RegistrationError> {
    register_capability(
        builder,
        CapabilityName::GetStudentCourseGrades,
        "Get all grades for a specific student in a specific course and semester",
        ParameterSchema::builder()
            .required("studentId", ParameterType::String, "The ID of the student")
            .required("courseId", ParameterType::String, "The ID of the course")
            .required("semester", ParameterType::String, SEMESTER_DESCRIPTION)
            .build(),
        GetStudentCourseGrades {
            grades: Arc::clone(&services.grades),
        },
    )?;
    register_capability(
        builder,
        CapabilityName::CreateGrade,
        "Create a new grade entry for a student",
        ParameterSchema::builder()
            .required("studentId", ParameterType::String, "The ID of the student")
            .required("courseId", ParameterType::String, "The ID of the course")
            .required("semester", ParameterType::String, SEMESTER_DESCRIPTION)
            .required(
                "gradeType",
                ParameterType::String,
                "Type of grade (e.g., 'quiz', 'exam', 'homework')",
            )
            .required(
                "itemId",
                ParameterType::String,
                "ID of the graded item (e.g., 'Quiz 1', 'Midterm')",
            )
            .required(
                "gradeValue",
                ParameterType::String,
                "The actual grade value (e.g., '95', 'A-')",
            )
            .optional(
                "gradedBy",
                ParameterType::String,
                "ID of the staff member who graded the item",
            )
            .optional("comments", ParameterType::String, "Comments on the grade")
            .build(),
        CreateGrade {
            grades: Arc::clone(&services.grades),
        },
    )
}

/// Lists a student's grades for one course and semester.
struct GetStudentCourseGrades {
    /// Grades backend.
    grades: Arc<dyn GradesService>,
}

#[async_trait]
impl Operation for GetStudentCourseGrades {
    async fn execute(
        &self,
        args: &Arguments,
        ctx: &ExecutionContext,
    ) -> Result<DynamicValue, OperationError> {
        let student_id = args.require_str("studentId")?;
        let course_id = args.require_str("courseId")?;
        let semester = args.require_str("semester")?;
        let grades = self
            .grades
            .student_course_grades(ctx, student_id, course_id, semester)
            .await
            .map_err(service_failure)?;
        to_value(&grades)
    }
}

/// Records a grade.
struct CreateGrade {
    /// Grades backend.
    grades: Arc<dyn GradesService>,
}

#[async_trait]
impl Operation for CreateGrade {
    async fn execute(
        &self,
        args: &Arguments,
        ctx: &ExecutionContext,
    ) -> Result<DynamicValue, OperationError> {
        let input = NewGrade {
            student_id: args.require_str("studentId")?.to_string(),
            course_id: args.require_str("courseId")?.to_string(),
            semester: args.require_str("semester")?.to_string(),
            grade_type: args.require_str("gradeType")?.to_string(),
            item_id: args.require_str("itemId")?.to_string(),
            grade_value: args.require_str("gradeValue")?.to_string(),
            graded_by: optional_string(args, "gradedBy")?,
            comments: optional_string(args, "comments")?,
        };
        let grade = self.grades.create_grade(ctx, input).await.map_err(service_failure)?;
        to_value(&grade)
    }
}
