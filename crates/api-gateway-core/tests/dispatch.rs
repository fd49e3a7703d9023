// crates/api-gateway-core/tests/dispatch.rs
// ============================================================================
// Module: Dispatcher Tests
// Description: Lookup, validation, credential propagation, and cancellation.
// Purpose: Validate the validate-then-invoke contract of the dispatcher.
// Dependencies: api-gateway-core, tokio, tokio-util
// ============================================================================

//! Dispatcher behavior tests.

#![allow(
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    reason = "Test-only assertions use unwrap for clarity."
)]

mod common;

use std::sync::Arc;
use std::time::Duration;

use api_gateway_core::Arguments;
use api_gateway_core::AuthPropagator;
use api_gateway_core::CapabilityDescriptor;
use api_gateway_core::DispatchError;
use api_gateway_core::Dispatcher;
use api_gateway_core::DynamicValue;
use api_gateway_core::ExecutionContext;
use api_gateway_core::ParameterSchema;
use api_gateway_core::ParameterType;
use api_gateway_core::RegistryBuilder;
use api_gateway_core::ValidationReason;
use tokio_util::sync::CancellationToken;

use crate::common::Behavior;
use crate::common::RecordingOperation;
use crate::common::descriptor;
use crate::common::sample_registry;

fn dispatcher(student: &RecordingOperation, course: &RecordingOperation) -> Dispatcher {
    Dispatcher::new(Arc::new(sample_registry(student, course)), AuthPropagator::new())
}

fn single(operation: &RecordingOperation, propagator: AuthPropagator) -> Dispatcher {
    let mut builder = RegistryBuilder::new();
    builder.register(descriptor("get_student", operation)).unwrap();
    Dispatcher::new(Arc::new(builder.seal()), propagator)
}

#[tokio::test]
async fn unknown_capability_fails_without_invoking_anything() {
    let student = RecordingOperation::echo();
    let course = RecordingOperation::echo();
    let dispatcher = dispatcher(&student, &course);

    let err = dispatcher.execute("nonexistent_tool", &Arguments::new(), "").await.unwrap_err();
    assert!(matches!(err, DispatchError::NotFound { ref name } if name == "nonexistent_tool"));
    assert_eq!(err.code(), "not_found");
    assert!(student.calls().is_empty());
    assert!(course.calls().is_empty());
}

#[tokio::test]
async fn missing_required_parameter_is_rejected_before_invocation() {
    let student = RecordingOperation::echo();
    let course = RecordingOperation::echo();
    let dispatcher = dispatcher(&student, &course);

    let err = dispatcher.execute("get_student", &Arguments::new(), "token").await.unwrap_err();
    assert_eq!(err.parameter(), Some("id"));
    assert_eq!(err.capability(), "get_student");
    match err {
        DispatchError::Validation {
            source, ..
        } => assert_eq!(source.reason, ValidationReason::Missing),
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(student.calls().is_empty());
}

#[tokio::test]
async fn type_mismatch_is_rejected_before_invocation() {
    let student = RecordingOperation::echo();
    let dispatcher = single(&student, AuthPropagator::new());

    let args = Arguments::new().with("id", true);
    let err = dispatcher.execute("get_student", &args, "token").await.unwrap_err();
    assert_eq!(err.parameter(), Some("id"));
    assert!(err.to_string().contains("expected string"));
    assert!(student.calls().is_empty());
}

#[tokio::test]
async fn optional_parameter_of_wrong_type_is_rejected() {
    let operation = RecordingOperation::echo();
    let schema = ParameterSchema::builder()
        .required("id", ParameterType::String, "Identifier")
        .optional("office", ParameterType::String, "Office")
        .build()
        .unwrap();
    let mut builder = RegistryBuilder::new();
    let descriptor =
        CapabilityDescriptor::new("create_staff", "d", schema, operation.clone()).unwrap();
    builder.register(descriptor).unwrap();
    let dispatcher = Dispatcher::new(Arc::new(builder.seal()), AuthPropagator::new());

    let bad = Arguments::new().with("id", "1").with("office", true);
    let err = dispatcher.execute("create_staff", &bad, "").await.unwrap_err();
    assert_eq!(err.parameter(), Some("office"));

    let null_optional = Arguments::new().with("id", "1").with("office", DynamicValue::Null);
    dispatcher.execute("create_staff", &null_optional, "").await.unwrap();
    assert_eq!(operation.calls().len(), 1);
}

#[tokio::test]
async fn credential_reaches_operation_exactly_as_supplied() {
    let student = RecordingOperation::echo();
    let course = RecordingOperation::echo();
    let dispatcher = dispatcher(&student, &course);

    let args = Arguments::new().with("id", "42");
    let result = dispatcher.execute("get_student", &args, "42...token").await.unwrap();
    assert_eq!(result.as_object().unwrap()["id"], DynamicValue::from("42"));

    let calls = student.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].credential.as_deref(), Some("42...token"));
    assert_eq!(calls[0].authorization.as_deref(), Some("Bearer 42...token"));
}

#[tokio::test]
async fn empty_credential_dispatches_unauthenticated() {
    let student = RecordingOperation::echo();
    let dispatcher = single(&student, AuthPropagator::new());

    let args = Arguments::new().with("id", "7");
    dispatcher.execute("get_student", &args, "").await.unwrap();
    let calls = student.calls();
    assert_eq!(calls[0].credential, None);
    assert_eq!(calls[0].authorization, None);
}

#[tokio::test]
async fn backend_failure_preserves_cause() {
    let student = RecordingOperation::with_behavior(Behavior::Fail("student 9 not found".into()));
    let dispatcher = single(&student, AuthPropagator::new());

    let args = Arguments::new().with("id", "9");
    let err = dispatcher.execute("get_student", &args, "t").await.unwrap_err();
    assert_eq!(err.code(), "backend");
    match &err {
        DispatchError::Backend {
            capability,
            kind,
            cause,
        } => {
            assert_eq!(capability, "get_student");
            assert_eq!(*kind, "internal");
            assert_eq!(cause.to_string(), "student 9 not found");
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(std::error::Error::source(&err).is_some());
}

#[tokio::test]
async fn backend_failure_display_omits_cause() {
    let student = RecordingOperation::with_behavior(Behavior::Fail(
        "error sending request for url (http://10.0.0.7:50052/students/9)".into(),
    ));
    let dispatcher = single(&student, AuthPropagator::new());

    let args = Arguments::new().with("id", "9");
    let err = dispatcher.execute("get_student", &args, "t").await.unwrap_err();
    assert_eq!(err.to_string(), "get_student: backend call failed (internal)");
}

#[tokio::test(start_paused = true)]
async fn deadline_expiry_yields_deadline_exceeded() {
    let student =
        RecordingOperation::with_behavior(Behavior::Delay(Duration::from_secs(30)));
    let dispatcher = single(&student, AuthPropagator::with_default_timeout(Duration::from_secs(1)));

    let args = Arguments::new().with("id", "1");
    let err = dispatcher.execute("get_student", &args, "").await.unwrap_err();
    assert_eq!(err.code(), "deadline_exceeded");
}

#[tokio::test(start_paused = true)]
async fn cancellation_abandons_in_flight_invocation() {
    let student =
        RecordingOperation::with_behavior(Behavior::Delay(Duration::from_secs(30)));
    let dispatcher = single(&student, AuthPropagator::new());
    let token = CancellationToken::new();
    let base = ExecutionContext::default().with_cancellation(token.clone());

    let canceller = tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(10)).await;
        token.cancel();
    });
    let args = Arguments::new().with("id", "1");
    let err = dispatcher.execute_in("get_student", &args, "", base).await.unwrap_err();
    canceller.await.unwrap();
    assert_eq!(err.code(), "cancelled");
    assert_eq!(student.calls().len(), 1);
}

#[tokio::test]
async fn already_cancelled_context_never_invokes() {
    let student = RecordingOperation::echo();
    let dispatcher = single(&student, AuthPropagator::new());
    let token = CancellationToken::new();
    token.cancel();
    let base = ExecutionContext::default().with_cancellation(token);

    let args = Arguments::new().with("id", "1");
    let err = dispatcher.execute_in("get_student", &args, "", base).await.unwrap_err();
    assert_eq!(err.code(), "cancelled");
    assert!(student.calls().is_empty());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_dispatches_do_not_share_arguments_or_credentials() {
    let student = RecordingOperation::echo();
    let course = RecordingOperation::echo();
    let dispatcher = dispatcher(&student, &course);

    let mut handles = Vec::new();
    for index in 0 .. 32 {
        let dispatcher = dispatcher.clone();
        handles.push(tokio::spawn(async move {
            let (name, id, token) = if index % 2 == 0 {
                ("get_student", format!("s-{index}"), format!("student-token-{index}"))
            } else {
                ("get_course", format!("c-{index}"), format!("course-token-{index}"))
            };
            let args = Arguments::new().with("id", id.clone());
            let result = dispatcher.execute(name, &args, &token).await.unwrap();
            assert_eq!(result.as_object().unwrap()["id"], DynamicValue::from(id));
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    let student_calls = student.calls();
    let course_calls = course.calls();
    assert_eq!(student_calls.len(), 16);
    assert_eq!(course_calls.len(), 16);
    for call in student_calls {
        let id = call.args.require_str("id").unwrap().to_string();
        let index = id.trim_start_matches("s-");
        assert_eq!(call.credential, Some(format!("student-token-{index}")));
    }
    for call in course_calls {
        let id = call.args.require_str("id").unwrap().to_string();
        let index = id.trim_start_matches("c-");
        assert_eq!(call.credential, Some(format!("course-token-{index}")));
    }
}
