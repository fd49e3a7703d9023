// crates/api-gateway-services/src/models.rs
// ============================================================================
// Module: Backend Models
// Description: Typed request and response records for each service family.
// Purpose: Strongly typed payloads used once a capability has decoded input.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! Records serialize with camelCase keys, matching the field names callers
//! see in capability results and the microservices' JSON payloads.
//! Optional fields serialize as `null` when absent.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;

// ============================================================================
// SECTION: Students
// ============================================================================

/// Student record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    /// Student identifier.
    pub id: String,
    /// First name.
    pub first_name: String,
    /// Last name.
    pub last_name: String,
    /// Email address.
    pub email: String,
    /// Phone number.
    pub phone_number: String,
}

/// Student creation request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewStudent {
    /// First name.
    pub first_name: String,
    /// Last name.
    pub last_name: String,
    /// Email address.
    pub email: String,
    /// Phone number.
    pub phone_number: String,
}

// ============================================================================
// SECTION: Staff
// ============================================================================

/// Staff record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Staff {
    /// Staff identifier.
    pub id: String,
    /// First name.
    pub first_name: String,
    /// Last name.
    pub last_name: String,
    /// Email address.
    pub email: String,
    /// Phone number.
    pub phone_number: String,
    /// Job title.
    #[serde(default)]
    pub title: Option<String>,
    /// Office location.
    #[serde(default)]
    pub office: Option<String>,
}

/// Staff creation request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewStaff {
    /// First name.
    pub first_name: String,
    /// Last name.
    pub last_name: String,
    /// Email address.
    pub email: String,
    /// Phone number.
    pub phone_number: String,
    /// Job title.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Office location.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub office: Option<String>,
}

// ============================================================================
// SECTION: Courses
// ============================================================================

/// Course record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Course {
    /// Course identifier.
    pub id: String,
    /// Course name.
    pub name: String,
    /// Semester label (e.g. `Fall 2024`).
    pub semester: String,
    /// Course description.
    #[serde(default)]
    pub description: Option<String>,
}

/// Course creation request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCourse {
    /// Course name.
    pub name: String,
    /// Semester label.
    pub semester: String,
    /// Course description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Homework assignment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Homework {
    /// Homework identifier.
    pub id: String,
    /// Owning course.
    pub course_id: String,
    /// Title.
    pub title: String,
    /// Description.
    pub description: String,
    /// Submission workflow (e.g. `individual`, `group`).
    pub workflow: String,
    /// Due date (ISO format).
    pub due_date: String,
}

/// Homework creation request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewHomework {
    /// Owning course.
    pub course_id: String,
    /// Title.
    pub title: String,
    /// Description.
    pub description: String,
    /// Submission workflow.
    pub workflow: String,
    /// Due date (ISO format).
    pub due_date: String,
}

/// Course announcement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Announcement {
    /// Announcement identifier.
    pub id: String,
    /// Owning course.
    pub course_id: String,
    /// Title.
    pub title: String,
    /// Body text.
    pub content: String,
}

/// Announcement creation request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAnnouncement {
    /// Owning course.
    pub course_id: String,
    /// Title.
    pub title: String,
    /// Body text.
    pub content: String,
}

// ============================================================================
// SECTION: Grades
// ============================================================================

/// Grader label surfaced when the backend only reports a timestamp.
pub const SYSTEM_GRADER: &str = "System";

/// Grade as returned to callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Grade {
    /// Grade identifier.
    pub id: String,
    /// Student identifier.
    pub student_id: String,
    /// Course identifier.
    pub course_id: String,
    /// Semester label.
    pub semester: String,
    /// Grade category (e.g. `exam`, `homework`).
    pub grade_type: String,
    /// Graded item identifier.
    pub item_id: String,
    /// Grade value.
    pub grade_value: String,
    /// Grader label.
    pub graded_by: Option<String>,
    /// Grader comments.
    pub comments: Option<String>,
    /// When the grade was recorded.
    pub graded_at: String,
    /// When the grade was last updated.
    pub updated_at: String,
}

/// Grade creation request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewGrade {
    /// Student identifier.
    pub student_id: String,
    /// Course identifier.
    pub course_id: String,
    /// Semester label.
    pub semester: String,
    /// Grade category.
    pub grade_type: String,
    /// Graded item identifier.
    pub item_id: String,
    /// Grade value.
    pub grade_value: String,
    /// Grader identity.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub graded_by: Option<String>,
    /// Grader comments.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comments: Option<String>,
}

/// Grade record as reported by the grades service.
///
/// The service reports the grading timestamp in `gradedBy`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GradeRecord {
    /// Grade identifier.
    pub grade_id: String,
    /// Student identifier.
    pub student_id: String,
    /// Course identifier.
    pub course_id: String,
    /// Semester label.
    pub semester: String,
    /// Grade category.
    pub grade_type: String,
    /// Graded item identifier.
    pub item_id: String,
    /// Grade value.
    pub grade_value: String,
    /// Grading timestamp.
    #[serde(default)]
    pub graded_by: String,
    /// Grader comments.
    #[serde(default)]
    pub comments: String,
}

impl From<GradeRecord> for Grade {
    fn from(record: GradeRecord) -> Self {
        let timestamp = record.graded_by;
        Self {
            id: record.grade_id,
            student_id: record.student_id,
            course_id: record.course_id,
            semester: record.semester,
            grade_type: record.grade_type,
            item_id: record.item_id,
            grade_value: record.grade_value,
            graded_by: Some(SYSTEM_GRADER.to_string()),
            comments: Some(record.comments),
            graded_at: timestamp.clone(),
            updated_at: timestamp,
        }
    }
}

// ============================================================================
// SECTION: Chat
// ============================================================================

/// One prior message in a chat transcript.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessageInput {
    /// Speaker role (`user` or `assistant`).
    pub role: String,
    /// Message text.
    pub content: String,
}

/// Session context for a chat message.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatContextInput {
    /// Caller identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    /// Caller role.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_role: Option<String>,
    /// Course the conversation concerns.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub course_id: Option<String>,
    /// Client-managed session identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
}

impl ChatContextInput {
    /// Returns true when no field is set.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.user_id.is_none()
            && self.user_role.is_none()
            && self.course_id.is_none()
            && self.session_id.is_none()
    }
}

/// Chat request: the new message plus the client-held transcript.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatHistoryInput {
    /// Message to answer.
    pub new_message: String,
    /// Prior messages, oldest first.
    pub chat_history: Vec<ChatMessageInput>,
    /// Optional session context.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<ChatContextInput>,
}

/// Chat reply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatResponse {
    /// Reply identifier.
    pub id: String,
    /// Reply text.
    pub content: String,
    /// RFC 3339 timestamp.
    pub timestamp: String,
}
