// crates/api-gateway-services/src/chat.rs
// ============================================================================
// Module: Placeholder Chatbot
// Description: Stateless chat assistant stand-in.
// Purpose: Answer chat capability calls until a real assistant is wired in.
// Dependencies: time, uuid
// ============================================================================

//! ## Overview
//! The placeholder keeps no conversation state; clients send the whole
//! transcript each time. Replies acknowledge the caller's role and course
//! when the context carries them.

use api_gateway_core::ExecutionContext;
use async_trait::async_trait;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;
use uuid::Uuid;

use crate::error::ServiceError;
use crate::models::ChatHistoryInput;
use crate::models::ChatResponse;
use crate::service::ChatService;

/// Service label used in errors.
const SERVICE: &str = "chat";

/// Opening of every reply.
const GREETING: &str = "Thank you for your message!";

/// Closing of every reply.
const DISCLAIMER: &str = " I'm a placeholder chatbot. In a real implementation, I would process \
                          your full chat history and provide helpful responses based on your \
                          class content.";

/// Stateless placeholder assistant.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlaceholderChatBot;

impl PlaceholderChatBot {
    /// Creates the chatbot.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Composes the reply text for `input`.
    #[must_use]
    pub fn compose(input: &ChatHistoryInput) -> String {
        let mut reply = String::from(GREETING);
        if let Some(context) = &input.context {
            if let Some(role) = context.user_role.as_deref().filter(|role| !role.is_empty()) {
                reply.push_str(" As a ");
                reply.push_str(role);
                reply.push(',');
            }
            if let Some(course) = context.course_id.as_deref().filter(|course| !course.is_empty())
            {
                reply.push_str(" regarding course ");
                reply.push_str(course);
                reply.push(',');
            }
        }
        reply.push_str(DISCLAIMER);
        reply
    }
}

#[async_trait]
impl ChatService for PlaceholderChatBot {
    async fn process_message(
        &self,
        _ctx: &ExecutionContext,
        input: ChatHistoryInput,
    ) -> Result<ChatResponse, ServiceError> {
        let timestamp =
            OffsetDateTime::now_utc().format(&Rfc3339).map_err(|err| ServiceError::Internal {
                service: SERVICE,
                message: err.to_string(),
            })?;
        tracing::debug!(history = input.chat_history.len(), "placeholder chat reply");
        Ok(ChatResponse {
            id: Uuid::new_v4().to_string(),
            content: Self::compose(&input),
            timestamp,
        })
    }
}
