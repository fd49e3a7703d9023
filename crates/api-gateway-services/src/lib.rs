// crates/api-gateway-services/src/lib.rs
// ============================================================================
// Module: API Gateway Services
// Description: Backend collaborators reached by capability operations.
// Purpose: Service traits, HTTP clients, an in-memory backend, and the chatbot.
// Dependencies: api-gateway-core, api-gateway-config, reqwest, tokio
// ============================================================================

//! ## Overview
//! Capability operations never talk to a transport directly. They call the
//! async service traits in [`service`], which are implemented by
//! [`HttpServices`] for deployed microservices and by [`InMemoryServices`]
//! for tests and local runs. [`Services`] bundles one handle per service and
//! is selected from [`api_gateway_config::ServicesConfig`].

pub mod chat;
pub mod error;
pub mod http;
pub mod memory;
pub mod models;
pub mod service;

pub use chat::PlaceholderChatBot;
pub use error::ServiceError;
pub use http::HttpServices;
pub use http::MAX_RESPONSE_BYTES;
pub use memory::InMemoryServices;
pub use memory::MAX_OBSERVED_CALLS;
pub use memory::ObservedCall;
pub use models::Announcement;
pub use models::ChatContextInput;
pub use models::ChatHistoryInput;
pub use models::ChatMessageInput;
pub use models::ChatResponse;
pub use models::Course;
pub use models::Grade;
pub use models::GradeRecord;
pub use models::Homework;
pub use models::NewAnnouncement;
pub use models::NewCourse;
pub use models::NewGrade;
pub use models::NewHomework;
pub use models::NewStaff;
pub use models::NewStudent;
pub use models::SYSTEM_GRADER;
pub use models::Staff;
pub use models::Student;
pub use service::ChatService;
pub use service::CoursesService;
pub use service::GradesService;
pub use service::Services;
pub use service::StaffService;
pub use service::StudentsService;
