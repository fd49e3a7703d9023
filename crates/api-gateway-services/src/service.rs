// crates/api-gateway-services/src/service.rs
// ============================================================================
// Module: Service Traits
// Description: Async interfaces for each backend microservice.
// Purpose: Seams between capability operations and backend transports.
// Dependencies: async-trait, api-gateway-core, api-gateway-config
// ============================================================================

//! ## Overview
//! Each microservice is reached through one trait. Every method takes the
//! invocation's [`ExecutionContext`] explicitly; implementations derive the
//! outbound credential, deadline, and cancellation from it and from nothing
//! else.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;

use api_gateway_config::ServiceBackend;
use api_gateway_config::ServicesConfig;
use api_gateway_core::ExecutionContext;
use async_trait::async_trait;

use crate::chat::PlaceholderChatBot;
use crate::error::ServiceError;
use crate::http::HttpServices;
use crate::memory::InMemoryServices;
use crate::models::Announcement;
use crate::models::ChatHistoryInput;
use crate::models::ChatResponse;
use crate::models::Course;
use crate::models::Grade;
use crate::models::Homework;
use crate::models::NewAnnouncement;
use crate::models::NewCourse;
use crate::models::NewGrade;
use crate::models::NewHomework;
use crate::models::NewStaff;
use crate::models::NewStudent;
use crate::models::Staff;
use crate::models::Student;

// ============================================================================
// SECTION: Traits
// ============================================================================

/// Students microservice.
#[async_trait]
pub trait StudentsService: Send + Sync {
    /// Fetches a student by id.
    async fn get_student(&self, ctx: &ExecutionContext, id: &str) -> Result<Student, ServiceError>;

    /// Creates a student.
    async fn create_student(
        &self,
        ctx: &ExecutionContext,
        input: NewStudent,
    ) -> Result<Student, ServiceError>;
}

/// Staff microservice.
#[async_trait]
pub trait StaffService: Send + Sync {
    /// Fetches a staff member by id.
    async fn get_staff(&self, ctx: &ExecutionContext, id: &str) -> Result<Staff, ServiceError>;

    /// Creates a staff member.
    async fn create_staff(
        &self,
        ctx: &ExecutionContext,
        input: NewStaff,
    ) -> Result<Staff, ServiceError>;
}

/// Courses microservice, including homework and announcements.
#[async_trait]
pub trait CoursesService: Send + Sync {
    /// Fetches a course by id.
    async fn get_course(&self, ctx: &ExecutionContext, id: &str) -> Result<Course, ServiceError>;

    /// Creates a course.
    async fn create_course(
        &self,
        ctx: &ExecutionContext,
        input: NewCourse,
    ) -> Result<Course, ServiceError>;

    /// Lists students enrolled in a course.
    async fn course_students(
        &self,
        ctx: &ExecutionContext,
        course_id: &str,
    ) -> Result<Vec<Student>, ServiceError>;

    /// Lists homework for a course.
    async fn course_homework(
        &self,
        ctx: &ExecutionContext,
        course_id: &str,
    ) -> Result<Vec<Homework>, ServiceError>;

    /// Creates a homework assignment.
    async fn create_homework(
        &self,
        ctx: &ExecutionContext,
        input: NewHomework,
    ) -> Result<Homework, ServiceError>;

    /// Lists announcements for a course.
    async fn course_announcements(
        &self,
        ctx: &ExecutionContext,
        course_id: &str,
    ) -> Result<Vec<Announcement>, ServiceError>;

    /// Posts an announcement.
    async fn create_announcement(
        &self,
        ctx: &ExecutionContext,
        input: NewAnnouncement,
    ) -> Result<Announcement, ServiceError>;
}

/// Grades microservice.
#[async_trait]
pub trait GradesService: Send + Sync {
    /// Lists a student's grades for a course and semester.
    async fn student_course_grades(
        &self,
        ctx: &ExecutionContext,
        student_id: &str,
        course_id: &str,
        semester: &str,
    ) -> Result<Vec<Grade>, ServiceError>;

    /// Records a grade.
    async fn create_grade(
        &self,
        ctx: &ExecutionContext,
        input: NewGrade,
    ) -> Result<Grade, ServiceError>;
}

/// Chat assistant.
#[async_trait]
pub trait ChatService: Send + Sync {
    /// Produces a reply to the newest message.
    async fn process_message(
        &self,
        ctx: &ExecutionContext,
        input: ChatHistoryInput,
    ) -> Result<ChatResponse, ServiceError>;
}

// ============================================================================
// SECTION: Service Bundle
// ============================================================================

/// Shared handles to every backend collaborator.
#[derive(Clone)]
pub struct Services {
    /// Students service.
    pub students: Arc<dyn StudentsService>,
    /// Staff service.
    pub staff: Arc<dyn StaffService>,
    /// Courses service.
    pub courses: Arc<dyn CoursesService>,
    /// Grades service.
    pub grades: Arc<dyn GradesService>,
    /// Chat assistant.
    pub chat: Arc<dyn ChatService>,
}

impl Services {
    /// Builds the bundle selected by `config.backend`.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::Config`] when HTTP clients cannot be built.
    pub fn from_config(config: &ServicesConfig) -> Result<Self, ServiceError> {
        match config.backend {
            ServiceBackend::Http => Self::http(config),
            ServiceBackend::Memory => Ok(Self::from_memory(Arc::new(InMemoryServices::new()))),
        }
    }

    /// Builds HTTP clients for every microservice endpoint.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::Config`] when an endpoint or client is invalid.
    pub fn http(config: &ServicesConfig) -> Result<Self, ServiceError> {
        let http = Arc::new(HttpServices::from_config(config)?);
        Ok(Self {
            students: http.clone(),
            staff: http.clone(),
            courses: http.clone(),
            grades: http,
            chat: Arc::new(PlaceholderChatBot::new()),
        })
    }

    /// Builds the bundle over a shared in-memory backend.
    #[must_use]
    pub fn from_memory(memory: Arc<InMemoryServices>) -> Self {
        Self {
            students: memory.clone(),
            staff: memory.clone(),
            courses: memory.clone(),
            grades: memory,
            chat: Arc::new(PlaceholderChatBot::new()),
        }
    }
}

impl std::fmt::Debug for Services {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter.debug_struct("Services").finish_non_exhaustive()
    }
}
