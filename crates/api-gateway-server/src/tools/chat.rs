// crates/api-gateway-server/src/tools/chat.rs
// ============================================================================
// Module: Chat Capability
// Description: process_chat_message and its argument shaping.
// Purpose: Turn loosely typed chat arguments into a chat service request.
// Dependencies: api-gateway-core, api-gateway-services
// ============================================================================

//! ## Overview
//! Chat history arrives as an array of arbitrary values. Entries that are not
//! objects, or whose `role` or `content` is missing or empty, are dropped. A
//! context is attached only when at least one of `userId`, `userRole`,
//! `courseId`, or `sessionId` is present.

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
use api_gateway_core::ValidationError;
use api_gateway_services::ChatContextInput;
use api_gateway_services::ChatHistoryInput;
use api_gateway_services::ChatMessageInput;
use api_gateway_services::ChatService;
use api_gateway_services::Services;
use async_trait::async_trait;

use super::RegistrationError;
use super::register as register_capability;
use super::service_failure;
use super::to_value;

// ============================================================================
// SECTION: Registration
// ============================================================================

/// Registers the chat capability.
pub(super) fn register(
    builder: &mut RegistryBuilder,
    services: &Services,
) -> Result<(), RegistrationError> {
    register_capability(
        builder,
        CapabilityName::ProcessChatMessage,
        "Process a chat message with context and history",
        ParameterSchema::builder()
            .required("newMessage", ParameterType::String, "The new message to process")
            .required(
                "chatHistory",
                ParameterType::Array,
                "Array of previous chat messages in the format [{role: 'user|assistant', \
                 content: 'message'}]",
            )
            .optional("userId", ParameterType::String, "ID of the user")
            .optional(
                "userRole",
                ParameterType::String,
                "Role of the user (e.g., 'student', 'staff')",
            )
            .optional(
                "courseId",
                ParameterType::String,
                "ID of the course if the chat is course-specific",
            )
            .optional("sessionId", ParameterType::String, "ID of the chat session")
            .build(),
        ProcessChatMessage {
            chat: Arc::clone(&services.chat),
        },
    )
}

// ============================================================================
// SECTION: Argument Shaping
// ============================================================================

/// Keeps the well-formed history entries, oldest first.
#[must_use]
pub fn chat_history(entries: &[DynamicValue]) -> Vec<ChatMessageInput> {
    entries
        .iter()
        .filter_map(|entry| {
            let object = entry.as_object()?;
            let role = object.get("role").and_then(DynamicValue::as_str)?;
            let content = object.get("content").and_then(DynamicValue::as_str)?;
            if role.is_empty() || content.is_empty() {
                return None;
            }
            Some(ChatMessageInput {
                role: role.to_string(),
                content: content.to_string(),
            })
        })
        .collect()
}

/// Builds the session context, or `None` when no context field is supplied.
///
/// # Errors
///
/// Returns [`ValidationError`] when a context field is present but not a string.
pub fn chat_context(args: &Arguments) -> Result<Option<ChatContextInput>, ValidationError> {
    let owned = |name: &str| -> Result<Option<String>, ValidationError> {
        Ok(args.optional_str(name)?.map(str::to_string))
    };
    let context = ChatContextInput {
        user_id: owned("userId")?,
        user_role: owned("userRole")?,
        course_id: owned("courseId")?,
        session_id: owned("sessionId")?,
    };
    Ok((!context.is_empty()).then_some(context))
}

// ============================================================================
// SECTION: Operation
// ============================================================================

/// Answers a chat message.
struct ProcessChatMessage {
    /// Chat backend.
    chat: Arc<dyn ChatService>,
}

#[async_trait]
impl Operation for ProcessChatMessage {
    async fn execute(
        &self,
        args: &Arguments,
        ctx: &ExecutionContext,
    ) -> Result<DynamicValue, OperationError> {
        let input = ChatHistoryInput {
            new_message: args.require_str("newMessage")?.to_string(),
            chat_history: chat_history(args.require_array("chatHistory")?),
            context: chat_context(args)?,
        };
        let response =
            self.chat.process_message(ctx, input).await.map_err(service_failure)?;
        to_value(&response)
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, reason = "Test-only assertions use unwrap for clarity.")]

    use serde_json::json;

    use super::*;

    /// Converts a JSON literal into a dynamic value.
    fn dynamic(value: serde_json::Value) -> DynamicValue {
        DynamicValue::from(value)
    }

    #[test]
    fn history_drops_malformed_entries() {
        let entries = vec![
            dynamic(json!({"role": "user", "content": "hello"})),
            dynamic(json!("not an object")),
            dynamic(json!({"role": "", "content": "empty role"})),
            dynamic(json!({"role": "assistant"})),
            dynamic(json!({"role": "assistant", "content": 7})),
            dynamic(json!({"role": "assistant", "content": "hi there"})),
        ];
        let history = chat_history(&entries);
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].role, "user");
        assert_eq!(history[1].content, "hi there");
    }

    #[test]
    fn context_absent_when_no_field_supplied() {
        let args = Arguments::new().with("newMessage", "hi");
        assert_eq!(chat_context(&args).unwrap(), None);
    }

    #[test]
    fn context_built_from_any_single_field() {
        let args = Arguments::new().with("courseId", "course-1");
        let context = chat_context(&args).unwrap().unwrap();
        assert_eq!(context.course_id.as_deref(), Some("course-1"));
        assert_eq!(context.user_role, None);
    }

    #[test]
    fn context_rejects_non_string_field() {
        let args = Arguments::new().with("userRole", true);
        let err = chat_context(&args).unwrap_err();
        assert_eq!(err.parameter, "userRole");
    }
}
