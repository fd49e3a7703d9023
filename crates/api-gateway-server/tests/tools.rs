// crates/api-gateway-server/tests/tools.rs
// ============================================================================
// Module: Capability Registry Tests
// Description: Population, schemas, and dispatch against the in-memory backend.
// Purpose: Keep the tool catalogue aligned with the backend operations.
// Dependencies: api-gateway-server, api-gateway-services, tokio
// ============================================================================

//! Capability registry tests.

#![allow(
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    reason = "Test-only assertions use unwrap for clarity."
)]

use std::sync::Arc;

use api_gateway_core::Arguments;
use api_gateway_core::AuthPropagator;
use api_gateway_core::CapabilityFamily;
use api_gateway_core::CapabilityName;
use api_gateway_core::CapabilityRegistry;
use api_gateway_core::DispatchError;
use api_gateway_core::Dispatcher;
use api_gateway_core::DynamicValue;
use api_gateway_core::ParameterType;
use api_gateway_server::build_registry;
use api_gateway_services::InMemoryServices;
use api_gateway_services::Services;
use serde_json::Value;
use serde_json::json;

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Builds a dispatcher over a fresh in-memory backend.
fn dispatcher() -> (Arc<InMemoryServices>, Dispatcher) {
    let memory = Arc::new(InMemoryServices::new());
    let registry = build_registry(&Services::from_memory(Arc::clone(&memory))).unwrap();
    (memory, Dispatcher::new(Arc::new(registry), AuthPropagator::new()))
}

/// Builds a registry over a fresh in-memory backend.
fn registry() -> CapabilityRegistry {
    build_registry(&Services::from_memory(Arc::new(InMemoryServices::new()))).unwrap()
}

/// Converts a JSON object literal into arguments.
fn args(value: Value) -> Arguments {
    serde_json::from_value(value).unwrap()
}

/// Converts a dispatch result into plain JSON.
fn plain(value: DynamicValue) -> Value {
    Value::from(value)
}

/// Creates a student and returns its id.
async fn create_student(dispatcher: &Dispatcher, first_name: &str) -> String {
    let created = dispatcher
        .execute(
            "create_student",
            &args(json!({
                "firstName": first_name,
                "lastName": "Lovelace",
                "email": "ada@example.edu",
                "phoneNumber": "555-0100"
            })),
            "token-a",
        )
        .await
        .unwrap();
    plain(created)["id"].as_str().unwrap().to_string()
}

/// Creates a course and returns its id.
async fn create_course(dispatcher: &Dispatcher) -> String {
    let created = dispatcher
        .execute(
            "create_course",
            &args(json!({"name": "Compilers", "semester": "Fall 2025"})),
            "token-a",
        )
        .await
        .unwrap();
    plain(created)["id"].as_str().unwrap().to_string()
}

// ============================================================================
// SECTION: Population
// ============================================================================

#[test]
fn every_capability_is_registered_once() {
    let registry = registry();
    assert_eq!(registry.len(), CapabilityName::all().len());
    for name in CapabilityName::all() {
        assert!(registry.lookup(name.as_str()).is_ok(), "missing {}", name.as_str());
    }
}

#[test]
fn descriptions_match_backend_operations() {
    let registry = registry();
    let description = |name: &str| registry.lookup(name).unwrap().description().to_string();
    assert_eq!(description("get_student"), "Get detailed information about a student by ID");
    assert_eq!(description("create_grade"), "Create a new grade entry for a student");
    assert_eq!(
        description("process_chat_message"),
        "Process a chat message with context and history"
    );
}

#[test]
fn create_grade_schema_marks_grader_and_comments_optional() {
    let registry = registry();
    let schema = registry.lookup("create_grade").unwrap().schema();
    assert_eq!(
        schema.required_names(),
        vec!["studentId", "courseId", "semester", "gradeType", "itemId", "gradeValue"]
    );
    assert!(!schema.parameter("gradedBy").unwrap().required);
    assert!(!schema.parameter("comments").unwrap().required);
}

#[test]
fn chat_history_is_the_only_array_parameter() {
    let registry = registry();
    for descriptor in registry.list_all() {
        for parameter in descriptor.schema().parameters() {
            let expected = if parameter.name == "chatHistory" {
                ParameterType::Array
            } else {
                ParameterType::String
            };
            assert_eq!(parameter.param_type, expected, "{}.{}", descriptor.name(), parameter.name);
        }
    }
}

// ============================================================================
// SECTION: Dispatch
// ============================================================================

#[tokio::test]
async fn create_then_get_student_round_trips_through_backend() {
    let (memory, dispatcher) = dispatcher();
    let id = create_student(&dispatcher, "Ada").await;

    let fetched = dispatcher.execute("get_student", &args(json!({"id": id})), "token-b").await;
    let fetched = plain(fetched.unwrap());
    assert_eq!(fetched["firstName"], json!("Ada"));

    let calls = memory.calls().unwrap();
    assert_eq!(calls.len(), 2);
    assert_eq!(calls[0].operation, "create_student");
    assert_eq!(calls[0].credential.as_deref(), Some("token-a"));
    assert_eq!(calls[1].credential.as_deref(), Some("token-b"));
}

#[tokio::test]
async fn missing_required_parameter_never_reaches_backend() {
    let (memory, dispatcher) = dispatcher();
    let err = dispatcher
        .execute("create_course", &args(json!({"name": "Compilers"})), "token")
        .await
        .unwrap_err();
    assert!(matches!(err, DispatchError::Validation { .. }));
    assert_eq!(err.parameter(), Some("semester"));
    assert!(memory.calls().unwrap().is_empty());
}

#[tokio::test]
async fn backend_not_found_surfaces_as_backend_error() {
    let (_memory, dispatcher) = dispatcher();
    let err =
        dispatcher.execute("get_course", &args(json!({"id": "nope"})), "token").await.unwrap_err();
    assert!(matches!(err, DispatchError::Backend { kind: "not_found", .. }));
    assert_eq!(err.to_string(), "get_course: backend call failed (not_found)");
    let cause = std::error::Error::source(&err).unwrap().to_string();
    assert!(cause.contains("course nope not found"));
}

#[test]
fn every_family_contributes_its_capabilities() {
    let registry = registry();
    for family in CapabilityFamily::all() {
        let registered: Vec<CapabilityName> = registry
            .list_all()
            .filter_map(|descriptor| CapabilityName::parse(descriptor.name()))
            .filter(|name| name.family() == *family)
            .collect();
        assert!(!registered.is_empty(), "family {} registered nothing", family.as_str());
        assert_eq!(registered.len(), family.members().count(), "family {}", family.as_str());
    }
}

#[tokio::test]
async fn create_grade_defaults_grader_to_system() {
    let (_memory, dispatcher) = dispatcher();
    let grade = dispatcher
        .execute(
            "create_grade",
            &args(json!({
                "studentId": "student-1",
                "courseId": "course-1",
                "semester": "Fall 2025",
                "gradeType": "quiz",
                "itemId": "Quiz 1",
                "gradeValue": "95"
            })),
            "token",
        )
        .await
        .unwrap();
    let grade = plain(grade);
    assert_eq!(grade["gradedBy"], json!("System"));
    assert_eq!(grade["gradedAt"], grade["updatedAt"]);

    let listed = dispatcher
        .execute(
            "get_student_course_grades",
            &args(json!({
                "studentId": "student-1",
                "courseId": "course-1",
                "semester": "Fall 2025"
            })),
            "token",
        )
        .await
        .unwrap();
    assert_eq!(plain(listed).as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn course_students_lists_enrolled_students() {
    let (memory, dispatcher) = dispatcher();
    let course_id = create_course(&dispatcher).await;
    let ada = create_student(&dispatcher, "Ada").await;
    let _grace = create_student(&dispatcher, "Grace").await;
    memory.enroll(&course_id, &ada).unwrap();

    let students = dispatcher
        .execute("get_course_students", &args(json!({"courseId": course_id})), "token")
        .await
        .unwrap();
    let students = plain(students);
    let students = students.as_array().unwrap();
    assert_eq!(students.len(), 1);
    assert_eq!(students[0]["id"], json!(ada));
}

#[tokio::test]
async fn homework_and_announcements_are_scoped_to_course() {
    let (_memory, dispatcher) = dispatcher();
    let course_id = create_course(&dispatcher).await;
    dispatcher
        .execute(
            "create_homework",
            &args(json!({
                "courseId": course_id,
                "title": "Lexer",
                "description": "Write a lexer",
                "workflow": "Fork, implement, submit",
                "dueDate": "2025-07-15T23:59:59Z"
            })),
            "token",
        )
        .await
        .unwrap();
    dispatcher
        .execute(
            "create_announcement",
            &args(json!({"courseId": course_id, "title": "Welcome", "content": "Hello class"})),
            "token",
        )
        .await
        .unwrap();

    let homework = dispatcher
        .execute("get_course_homework", &args(json!({"courseId": course_id})), "token")
        .await
        .unwrap();
    assert_eq!(plain(homework)[0]["title"], json!("Lexer"));

    let announcements = dispatcher
        .execute("get_course_announcements", &args(json!({"courseId": "other"})), "token")
        .await
        .unwrap();
    assert!(plain(announcements).as_array().unwrap().is_empty());
}

#[tokio::test]
async fn chat_reply_reflects_supplied_context() {
    let (_memory, dispatcher) = dispatcher();
    let reply = dispatcher
        .execute(
            "process_chat_message",
            &args(json!({
                "newMessage": "When is the exam?",
                "chatHistory": [{"role": "user", "content": "hi"}, "junk"],
                "userRole": "student",
                "courseId": "course-9"
            })),
            "token",
        )
        .await
        .unwrap();
    let content = plain(reply)["content"].as_str().unwrap().to_string();
    assert!(content.starts_with("Thank you for your message!"));
    assert!(content.contains(" As a student,"));
    assert!(content.contains(" regarding course course-9,"));
}

#[tokio::test]
async fn chat_history_must_be_an_array() {
    let (_memory, dispatcher) = dispatcher();
    let err = dispatcher
        .execute(
            "process_chat_message",
            &args(json!({"newMessage": "hi", "chatHistory": "not a list"})),
            "token",
        )
        .await
        .unwrap_err();
    assert_eq!(err.parameter(), Some("chatHistory"));
}

#[tokio::test]
async fn concurrent_dispatches_keep_their_own_credentials() {
    let (memory, dispatcher) = dispatcher();
    let dispatcher = Arc::new(dispatcher);
    let mut handles = Vec::new();
    for index in 0 .. 16 {
        let dispatcher = Arc::clone(&dispatcher);
        handles.push(tokio::spawn(async move {
            let token = format!("token-{index}");
            dispatcher
                .execute(
                    "create_course",
                    &args(json!({"name": format!("Course {index}"), "semester": "Fall 2025"})),
                    &token,
                )
                .await
                .unwrap()
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }
    let calls = memory.calls().unwrap();
    assert_eq!(calls.len(), 16);
    let mut seen: Vec<String> = calls.into_iter().filter_map(|call| call.credential).collect();
    seen.sort();
    seen.dedup();
    assert_eq!(seen.len(), 16);
}
