// crates/api-gateway-services/src/memory.rs
// ============================================================================
// Module: In-Memory Services
// Description: Deterministic in-process backend for tests and local runs.
// Purpose: Serve every microservice trait without network dependencies.
// Dependencies: time, api-gateway-core
// ============================================================================

//! ## Overview
//! [`InMemoryServices`] keeps records in a mutex-guarded map and assigns
//! sequential identifiers (`student-1`, `course-1`, ...). Every call is
//! recorded together with the credential seen on its execution context, so
//! tests can assert exactly what reached the backend. The call log holds at
//! most [`MAX_OBSERVED_CALLS`] entries; older calls are evicted first.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::MutexGuard;

use api_gateway_core::ExecutionContext;
use async_trait::async_trait;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

use crate::error::ServiceError;
use crate::models::Announcement;
use crate::models::Course;
use crate::models::Grade;
use crate::models::Homework;
use crate::models::NewAnnouncement;
use crate::models::NewCourse;
use crate::models::NewGrade;
use crate::models::NewHomework;
use crate::models::NewStaff;
use crate::models::NewStudent;
use crate::models::SYSTEM_GRADER;
use crate::models::Staff;
use crate::models::Student;
use crate::service::CoursesService;
use crate::service::GradesService;
use crate::service::StaffService;
use crate::service::StudentsService;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Number of observed calls retained before the oldest are dropped.
pub const MAX_OBSERVED_CALLS: usize = 1024;

/// A backend call observed by the in-memory services.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObservedCall {
    /// Backend operation name (e.g. `get_student`).
    pub operation: &'static str,
    /// Raw credential carried by the context.
    pub credential: Option<String>,
    /// Correlation identifier carried by the context.
    pub request_id: Option<String>,
}

/// Mutable backend state.
#[derive(Debug, Default)]
struct MemoryState {
    /// Students keyed by id.
    students: BTreeMap<String, Student>,
    /// Staff keyed by id.
    staff: BTreeMap<String, Staff>,
    /// Courses keyed by id.
    courses: BTreeMap<String, Course>,
    /// Enrolled student ids keyed by course id.
    enrollments: BTreeMap<String, Vec<String>>,
    /// Homework in creation order.
    homework: Vec<Homework>,
    /// Announcements in creation order.
    announcements: Vec<Announcement>,
    /// Grades in creation order.
    grades: Vec<Grade>,
    /// Last identifier issued.
    next_id: u64,
    /// Most recent observed calls in order.
    calls: VecDeque<ObservedCall>,
}

impl MemoryState {
    /// Issues the next identifier with `prefix`.
    fn issue_id(&mut self, prefix: &str) -> String {
        self.next_id += 1;
        format!("{prefix}-{}", self.next_id)
    }

    /// Records a call made under `ctx`.
    fn observe(&mut self, operation: &'static str, ctx: &ExecutionContext) {
        if self.calls.len() >= MAX_OBSERVED_CALLS {
            self.calls.pop_front();
        }
        self.calls.push_back(ObservedCall {
            operation,
            credential: ctx.credential().map(|credential| credential.as_str().to_string()),
            request_id: ctx.request_id().map(str::to_string),
        });
    }
}

/// In-process implementation of the four microservice traits.
#[derive(Debug, Default)]
pub struct InMemoryServices {
    /// Shared state.
    state: Mutex<MemoryState>,
}

impl InMemoryServices {
    /// Creates an empty backend.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the retained observed calls, oldest first.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::Internal`] when the state lock is poisoned.
    pub fn calls(&self) -> Result<Vec<ObservedCall>, ServiceError> {
        Ok(self.lock("memory")?.calls.iter().cloned().collect())
    }

    /// Enrolls an existing student in an existing course.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::NotFound`] when either record is missing.
    pub fn enroll(&self, course_id: &str, student_id: &str) -> Result<(), ServiceError> {
        let mut state = self.lock("courses")?;
        if !state.courses.contains_key(course_id) {
            return Err(not_found("courses", "course", course_id));
        }
        if !state.students.contains_key(student_id) {
            return Err(not_found("students", "student", student_id));
        }
        let enrolled = state.enrollments.entry(course_id.to_string()).or_default();
        if !enrolled.iter().any(|id| id == student_id) {
            enrolled.push(student_id.to_string());
        }
        Ok(())
    }

    /// Acquires the state lock.
    fn lock(&self, service: &'static str) -> Result<MutexGuard<'_, MemoryState>, ServiceError> {
        self.state.lock().map_err(|_| ServiceError::Internal {
            service,
            message: "state lock poisoned".to_string(),
        })
    }
}

/// Builds a not-found error.
fn not_found(service: &'static str, kind: &str, id: &str) -> ServiceError {
    ServiceError::NotFound {
        service,
        resource: format!("{kind} {id}"),
    }
}

/// Returns the current time as RFC 3339.
fn now_rfc3339(service: &'static str) -> Result<String, ServiceError> {
    OffsetDateTime::now_utc().format(&Rfc3339).map_err(|err| ServiceError::Internal {
        service,
        message: err.to_string(),
    })
}

// ============================================================================
// SECTION: Trait Implementations
// ============================================================================

#[async_trait]
impl StudentsService for InMemoryServices {
    async fn get_student(&self, ctx: &ExecutionContext, id: &str) -> Result<Student, ServiceError> {
        let mut state = self.lock("students")?;
        state.observe("get_student", ctx);
        state.students.get(id).cloned().ok_or_else(|| not_found("students", "student", id))
    }

    async fn create_student(
        &self,
        ctx: &ExecutionContext,
        input: NewStudent,
    ) -> Result<Student, ServiceError> {
        let mut state = self.lock("students")?;
        state.observe("create_student", ctx);
        let student = Student {
            id: state.issue_id("student"),
            first_name: input.first_name,
            last_name: input.last_name,
            email: input.email,
            phone_number: input.phone_number,
        };
        state.students.insert(student.id.clone(), student.clone());
        Ok(student)
    }
}

#[async_trait]
impl StaffService for InMemoryServices {
    async fn get_staff(&self, ctx: &ExecutionContext, id: &str) -> Result<Staff, ServiceError> {
        let mut state = self.lock("staff")?;
        state.observe("get_staff", ctx);
        state.staff.get(id).cloned().ok_or_else(|| not_found("staff", "staff member", id))
    }

    async fn create_staff(
        &self,
        ctx: &ExecutionContext,
        input: NewStaff,
    ) -> Result<Staff, ServiceError> {
        let mut state = self.lock("staff")?;
        state.observe("create_staff", ctx);
        let staff = Staff {
            id: state.issue_id("staff"),
            first_name: input.first_name,
            last_name: input.last_name,
            email: input.email,
            phone_number: input.phone_number,
            title: input.title,
            office: input.office,
        };
        state.staff.insert(staff.id.clone(), staff.clone());
        Ok(staff)
    }
}

#[async_trait]
impl CoursesService for InMemoryServices {
    async fn get_course(&self, ctx: &ExecutionContext, id: &str) -> Result<Course, ServiceError> {
        let mut state = self.lock("courses")?;
        state.observe("get_course", ctx);
        state.courses.get(id).cloned().ok_or_else(|| not_found("courses", "course", id))
    }

    async fn create_course(
        &self,
        ctx: &ExecutionContext,
        input: NewCourse,
    ) -> Result<Course, ServiceError> {
        let mut state = self.lock("courses")?;
        state.observe("create_course", ctx);
        let course = Course {
            id: state.issue_id("course"),
            name: input.name,
            semester: input.semester,
            description: input.description,
        };
        state.courses.insert(course.id.clone(), course.clone());
        Ok(course)
    }

    async fn course_students(
        &self,
        ctx: &ExecutionContext,
        course_id: &str,
    ) -> Result<Vec<Student>, ServiceError> {
        let mut state = self.lock("courses")?;
        state.observe("course_students", ctx);
        if !state.courses.contains_key(course_id) {
            return Err(not_found("courses", "course", course_id));
        }
        let enrolled = state.enrollments.get(course_id).cloned().unwrap_or_default();
        Ok(enrolled.iter().filter_map(|id| state.students.get(id).cloned()).collect())
    }

    async fn course_homework(
        &self,
        ctx: &ExecutionContext,
        course_id: &str,
    ) -> Result<Vec<Homework>, ServiceError> {
        let mut state = self.lock("courses")?;
        state.observe("course_homework", ctx);
        Ok(state.homework.iter().filter(|item| item.course_id == course_id).cloned().collect())
    }

    async fn create_homework(
        &self,
        ctx: &ExecutionContext,
        input: NewHomework,
    ) -> Result<Homework, ServiceError> {
        let mut state = self.lock("courses")?;
        state.observe("create_homework", ctx);
        if !state.courses.contains_key(&input.course_id) {
            return Err(not_found("courses", "course", &input.course_id));
        }
        let homework = Homework {
            id: state.issue_id("homework"),
            course_id: input.course_id,
            title: input.title,
            description: input.description,
            workflow: input.workflow,
            due_date: input.due_date,
        };
        state.homework.push(homework.clone());
        Ok(homework)
    }

    async fn course_announcements(
        &self,
        ctx: &ExecutionContext,
        course_id: &str,
    ) -> Result<Vec<Announcement>, ServiceError> {
        let mut state = self.lock("courses")?;
        state.observe("course_announcements", ctx);
        Ok(state
            .announcements
            .iter()
            .filter(|item| item.course_id == course_id)
            .cloned()
            .collect())
    }

    async fn create_announcement(
        &self,
        ctx: &ExecutionContext,
        input: NewAnnouncement,
    ) -> Result<Announcement, ServiceError> {
        let mut state = self.lock("courses")?;
        state.observe("create_announcement", ctx);
        if !state.courses.contains_key(&input.course_id) {
            return Err(not_found("courses", "course", &input.course_id));
        }
        let announcement = Announcement {
            id: state.issue_id("announcement"),
            course_id: input.course_id,
            title: input.title,
            content: input.content,
        };
        state.announcements.push(announcement.clone());
        Ok(announcement)
    }
}

#[async_trait]
impl GradesService for InMemoryServices {
    async fn student_course_grades(
        &self,
        ctx: &ExecutionContext,
        student_id: &str,
        course_id: &str,
        semester: &str,
    ) -> Result<Vec<Grade>, ServiceError> {
        let mut state = self.lock("grades")?;
        state.observe("student_course_grades", ctx);
        Ok(state
            .grades
            .iter()
            .filter(|grade| {
                grade.student_id == student_id
                    && grade.course_id == course_id
                    && grade.semester == semester
            })
            .cloned()
            .collect())
    }

    async fn create_grade(
        &self,
        ctx: &ExecutionContext,
        input: NewGrade,
    ) -> Result<Grade, ServiceError> {
        let timestamp = now_rfc3339("grades")?;
        let mut state = self.lock("grades")?;
        state.observe("create_grade", ctx);
        let grade = Grade {
            id: state.issue_id("grade"),
            student_id: input.student_id,
            course_id: input.course_id,
            semester: input.semester,
            grade_type: input.grade_type,
            item_id: input.item_id,
            grade_value: input.grade_value,
            graded_by: Some(input.graded_by.unwrap_or_else(|| SYSTEM_GRADER.to_string())),
            comments: input.comments,
            graded_at: timestamp.clone(),
            updated_at: timestamp,
        };
        state.grades.push(grade.clone());
        Ok(grade)
    }
}
