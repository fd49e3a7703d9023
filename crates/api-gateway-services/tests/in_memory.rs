// crates/api-gateway-services/tests/in_memory.rs
// ============================================================================
// Module: In-Memory Backend Tests
// Description: Record lifecycle and call observation for the in-memory backend.
// Purpose: Keep the local backend faithful to the microservice contracts.
// Dependencies: api-gateway-services, tokio, time
// ============================================================================

//! In-memory backend tests.

#![allow(
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    reason = "Test-only assertions use unwrap for clarity."
)]

use std::sync::Arc;

use api_gateway_config::ServiceBackend;
use api_gateway_config::ServicesConfig;
use api_gateway_core::ExecutionContext;
use api_gateway_services::ChatHistoryInput;
use api_gateway_services::ChatService;
use api_gateway_services::CoursesService;
use api_gateway_services::GradesService;
use api_gateway_services::InMemoryServices;
use api_gateway_services::MAX_OBSERVED_CALLS;
use api_gateway_services::NewAnnouncement;
use api_gateway_services::NewCourse;
use api_gateway_services::NewGrade;
use api_gateway_services::NewStaff;
use api_gateway_services::NewStudent;
use api_gateway_services::ServiceError;
use api_gateway_services::Services;
use api_gateway_services::StaffService;
use api_gateway_services::StudentsService;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

/// Builds a student creation payload.
fn new_student(first_name: &str) -> NewStudent {
    NewStudent {
        first_name: first_name.to_string(),
        last_name: "Tester".to_string(),
        email: format!("{first_name}@example.edu"),
        phone_number: "555-0199".to_string(),
    }
}

/// Builds a course creation payload.
fn new_course(name: &str) -> NewCourse {
    NewCourse {
        name: name.to_string(),
        semester: "Fall 2024".to_string(),
        description: None,
    }
}

#[tokio::test]
async fn created_student_can_be_fetched() {
    let memory = InMemoryServices::new();
    let ctx = ExecutionContext::attach("t");

    let created = memory.create_student(&ctx, new_student("ada")).await.unwrap();
    let fetched = memory.get_student(&ctx, &created.id).await.unwrap();

    assert_eq!(created, fetched);
    assert_eq!(fetched.email, "ada@example.edu");
}

#[tokio::test]
async fn unknown_records_are_not_found() {
    let memory = InMemoryServices::new();
    let ctx = ExecutionContext::attach("t");

    let err = memory.get_student(&ctx, "student-404").await.unwrap_err();
    assert_eq!(
        err,
        ServiceError::NotFound {
            service: "students",
            resource: "student student-404".to_string(),
        }
    );
    assert_eq!(memory.get_course(&ctx, "nope").await.unwrap_err().kind(), "not_found");
    assert_eq!(memory.get_staff(&ctx, "nope").await.unwrap_err().kind(), "not_found");
}

#[tokio::test]
async fn staff_optional_fields_survive() {
    let memory = InMemoryServices::new();
    let ctx = ExecutionContext::attach("t");
    let input = NewStaff {
        first_name: "Grace".to_string(),
        last_name: "Hopper".to_string(),
        email: "grace@example.edu".to_string(),
        phone_number: "555-0101".to_string(),
        title: Some("Professor".to_string()),
        office: None,
    };

    let staff = memory.create_staff(&ctx, input).await.unwrap();

    assert_eq!(staff.title.as_deref(), Some("Professor"));
    assert_eq!(staff.office, None);
}

#[tokio::test]
async fn enrollment_lists_course_students() {
    let memory = InMemoryServices::new();
    let ctx = ExecutionContext::attach("t");
    let course = memory.create_course(&ctx, new_course("Compilers")).await.unwrap();
    let ada = memory.create_student(&ctx, new_student("ada")).await.unwrap();
    let alan = memory.create_student(&ctx, new_student("alan")).await.unwrap();

    memory.enroll(&course.id, &ada.id).unwrap();
    memory.enroll(&course.id, &alan.id).unwrap();
    memory.enroll(&course.id, &ada.id).unwrap();

    let students = memory.course_students(&ctx, &course.id).await.unwrap();
    assert_eq!(students, vec![ada, alan]);
    assert!(memory.enroll("course-404", "student-1").is_err());
}

#[tokio::test]
async fn announcements_are_scoped_to_their_course() {
    let memory = InMemoryServices::new();
    let ctx = ExecutionContext::attach("t");
    let first = memory.create_course(&ctx, new_course("Compilers")).await.unwrap();
    let second = memory.create_course(&ctx, new_course("Databases")).await.unwrap();
    for course in [&first, &second] {
        memory
            .create_announcement(
                &ctx,
                NewAnnouncement {
                    course_id: course.id.clone(),
                    title: format!("Welcome to {}", course.name),
                    content: "Syllabus posted".to_string(),
                },
            )
            .await
            .unwrap();
    }

    let listed = memory.course_announcements(&ctx, &first.id).await.unwrap();

    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].title, "Welcome to Compilers");
}

#[tokio::test]
async fn grade_defaults_grader_and_stamps_times() {
    let memory = InMemoryServices::new();
    let ctx = ExecutionContext::attach("t");
    let input = NewGrade {
        student_id: "s-1".to_string(),
        course_id: "c-1".to_string(),
        semester: "Fall 2024".to_string(),
        grade_type: "exam".to_string(),
        item_id: "final".to_string(),
        grade_value: "A-".to_string(),
        graded_by: None,
        comments: None,
    };

    let grade = memory.create_grade(&ctx, input).await.unwrap();

    assert_eq!(grade.graded_by.as_deref(), Some("System"));
    assert_eq!(grade.graded_at, grade.updated_at);
    OffsetDateTime::parse(&grade.graded_at, &Rfc3339).unwrap();

    let listed = memory.student_course_grades(&ctx, "s-1", "c-1", "Fall 2024").await.unwrap();
    assert_eq!(listed, vec![grade]);
    let other = memory.student_course_grades(&ctx, "s-1", "c-1", "Spring 2025").await.unwrap();
    assert!(other.is_empty());
}

#[tokio::test]
async fn calls_record_credential_per_context() {
    let memory = InMemoryServices::new();
    let first = ExecutionContext::attach("alpha").with_request_id("r-1");
    let second = ExecutionContext::unauthenticated();

    let _ = memory.get_student(&first, "x").await;
    let _ = memory.get_course(&second, "y").await;

    let calls = memory.calls().unwrap();
    assert_eq!(calls.len(), 2);
    assert_eq!(calls[0].operation, "get_student");
    assert_eq!(calls[0].credential.as_deref(), Some("alpha"));
    assert_eq!(calls[0].request_id.as_deref(), Some("r-1"));
    assert_eq!(calls[1].operation, "get_course");
    assert_eq!(calls[1].credential, None);
}

#[tokio::test]
async fn call_log_keeps_only_the_newest_calls() {
    let memory = InMemoryServices::new();
    let overflow = 5;
    for index in 0..MAX_OBSERVED_CALLS + overflow {
        let ctx = ExecutionContext::attach("t").with_request_id(format!("r-{index}"));
        let _ = memory.get_student(&ctx, "missing").await;
    }

    let calls = memory.calls().unwrap();
    assert_eq!(calls.len(), MAX_OBSERVED_CALLS);
    assert_eq!(calls[0].request_id.as_deref(), Some(format!("r-{overflow}").as_str()));
    let last = format!("r-{}", MAX_OBSERVED_CALLS + overflow - 1);
    assert_eq!(calls[MAX_OBSERVED_CALLS - 1].request_id.as_deref(), Some(last.as_str()));
}

#[tokio::test]
async fn memory_backend_bundle_shares_state() {
    let config = ServicesConfig {
        backend: ServiceBackend::Memory,
        ..ServicesConfig::default()
    };
    let services = Services::from_config(&config).unwrap();
    let ctx = ExecutionContext::attach("t");

    let created = services.students.create_student(&ctx, new_student("ada")).await.unwrap();
    let fetched = services.students.get_student(&ctx, &created.id).await.unwrap();
    assert_eq!(created, fetched);

    let shared = Arc::new(InMemoryServices::new());
    let bundle = Services::from_memory(Arc::clone(&shared));
    let _ = bundle.courses.get_course(&ctx, "c").await;
    assert_eq!(shared.calls().unwrap().len(), 1);
}

#[tokio::test]
async fn placeholder_chat_replies_through_bundle() {
    let services = Services::from_memory(Arc::new(InMemoryServices::new()));
    let input = ChatHistoryInput {
        new_message: "When is the exam?".to_string(),
        chat_history: Vec::new(),
        context: None,
    };

    let reply = services
        .chat
        .process_message(&ExecutionContext::unauthenticated(), input)
        .await
        .unwrap();

    assert!(reply.content.starts_with("Thank you for your message!"));
    assert!(!reply.id.is_empty());
}
