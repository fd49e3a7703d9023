// crates/api-gateway-server/src/auth.rs
// ============================================================================
// Module: Inbound Request Context
// Description: Bearer credential and request id extraction from HTTP headers.
// Purpose: Give each tool request its caller credential and correlation id.
// Dependencies: api-gateway-core, axum, uuid
// ============================================================================

//! ## Overview
//! The gateway does not validate credentials. It extracts an optional bearer
//! token from the `Authorization` header and forwards it unchanged to the
//! backends. Malformed or non-bearer headers are treated as absent. Each
//! request also gets a correlation id, taken from `x-request-id` when the
//! caller supplies a usable one.

// ============================================================================
// SECTION: Imports
// ============================================================================

use api_gateway_core::BearerCredential;
use axum::http::HeaderMap;
use axum::http::header::AUTHORIZATION;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Header carrying the caller's correlation id.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Maximum accepted length of a caller-supplied request id.
const MAX_REQUEST_ID_LEN: usize = 128;

// ============================================================================
// SECTION: Request Context
// ============================================================================

/// Inbound request metadata for one tool request.
#[derive(Debug, Clone)]
pub struct RequestContext {
    /// Bearer credential, when supplied.
    pub credential: Option<BearerCredential>,
    /// Correlation id.
    pub request_id: String,
}

impl RequestContext {
    /// Extracts credential and request id from request headers.
    #[must_use]
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let credential = headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(BearerCredential::from_authorization_header);
        let request_id = headers
            .get(REQUEST_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .filter(|value| is_valid_request_id(value))
            .map_or_else(|| uuid::Uuid::new_v4().to_string(), str::to_string);
        Self {
            credential,
            request_id,
        }
    }

    /// Returns the raw credential or an empty string when absent.
    #[must_use]
    pub fn credential_str(&self) -> &str {
        self.credential.as_ref().map_or("", BearerCredential::as_str)
    }

    /// Returns true when a credential was supplied.
    #[must_use]
    pub const fn has_credential(&self) -> bool {
        self.credential.is_some()
    }
}

/// Accepts short, printable ASCII request ids.
fn is_valid_request_id(value: &str) -> bool {
    !value.is_empty()
        && value.len() <= MAX_REQUEST_ID_LEN
        && value.bytes().all(|byte| byte.is_ascii_graphic())
}

// ============================================================================
// SECTION: Tests
// ============================================================================
