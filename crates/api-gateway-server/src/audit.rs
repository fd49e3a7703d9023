// crates/api-gateway-server/src/audit.rs
// ============================================================================
// Module: Gateway Audit Logging
// Description: Structured audit events for tool surface requests.
// Purpose: Emit one JSON line per request without leaking credentials.
// Dependencies: api-gateway-config, serde, serde_json
// ============================================================================

//! ## Overview
//! Every request to the tool surface produces one [`GatewayAuditEvent`]. The
//! event records whether a bearer credential was present but never the
//! credential itself. Sinks write JSON lines to stderr or an append-only file,
//! or discard events entirely.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs::OpenOptions;
use std::io;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use std::sync::Mutex;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use api_gateway_config::AuditConfig;
use serde::Serialize;

use crate::telemetry::GatewayOutcome;
use crate::telemetry::GatewayRoute;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Gateway request audit event payload.
#[derive(Debug, Clone, Serialize)]
pub struct GatewayAuditEvent {
    /// Event identifier.
    pub event: &'static str,
    /// Event timestamp (milliseconds since epoch).
    pub timestamp_ms: u128,
    /// Request identifier.
    pub request_id: String,
    /// Route that served the request.
    pub route: GatewayRoute,
    /// Capability name when the request targeted one.
    pub capability: Option<String>,
    /// Request outcome.
    pub outcome: GatewayOutcome,
    /// Normalized error kind label.
    pub error_kind: Option<&'static str>,
    /// HTTP status returned.
    pub status: u16,
    /// Request body size in bytes.
    pub request_bytes: usize,
    /// Response body size in bytes.
    pub response_bytes: usize,
    /// Whether the request carried a bearer credential.
    pub credential_present: bool,
}

/// Inputs required to construct a gateway audit event.
pub struct GatewayAuditEventParams {
    /// Request identifier.
    pub request_id: String,
    /// Route that served the request.
    pub route: GatewayRoute,
    /// Capability name when the request targeted one.
    pub capability: Option<String>,
    /// Request outcome.
    pub outcome: GatewayOutcome,
    /// Normalized error kind label.
    pub error_kind: Option<&'static str>,
    /// HTTP status returned.
    pub status: u16,
    /// Request body size in bytes.
    pub request_bytes: usize,
    /// Response body size in bytes.
    pub response_bytes: usize,
    /// Whether the request carried a bearer credential.
    pub credential_present: bool,
}

impl GatewayAuditEvent {
    /// Creates a new audit event with a consistent timestamp.
    #[must_use]
    pub fn new(params: GatewayAuditEventParams) -> Self {
        let timestamp_ms =
            SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_millis();
        Self {
            event: "gateway_request",
            timestamp_ms,
            request_id: params.request_id,
            route: params.route,
            capability: params.capability,
            outcome: params.outcome,
            error_kind: params.error_kind,
            status: params.status,
            request_bytes: params.request_bytes,
            response_bytes: params.response_bytes,
            credential_present: params.credential_present,
        }
    }
}

// ============================================================================
// SECTION: Trait
// ============================================================================

/// Audit sink for gateway request events.
pub trait GatewayAuditSink: Send + Sync {
    /// Record an audit event.
    fn record(&self, event: &GatewayAuditEvent);
}

/// Audit sink that logs JSON lines to stderr.
pub struct GatewayStderrAuditSink;

impl GatewayAuditSink for GatewayStderrAuditSink {
    fn record(&self, event: &GatewayAuditEvent) {
        if let Ok(payload) = serde_json::to_string(event) {
            let _ = writeln!(std::io::stderr(), "{payload}");
        }
    }
}

/// Audit sink that logs JSON lines to a file.
pub struct GatewayFileAuditSink {
    /// File handle used for append-only logging.
    file: Mutex<std::fs::File>,
}

impl GatewayFileAuditSink {
    /// Opens the audit log file in append mode.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened.
    pub fn new(path: &Path) -> io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            file: Mutex::new(file),
        })
    }
}

impl GatewayAuditSink for GatewayFileAuditSink {
    fn record(&self, event: &GatewayAuditEvent) {
        if let Ok(payload) = serde_json::to_string(event)
            && let Ok(mut file) = self.file.lock()
        {
            let _ = writeln!(file, "{payload}");
            let _ = file.flush();
        }
    }
}

/// No-op audit sink.
pub struct GatewayNoopAuditSink;

impl GatewayAuditSink for GatewayNoopAuditSink {
    fn record(&self, _event: &GatewayAuditEvent) {}
}

// ============================================================================
// SECTION: Construction
// ============================================================================

/// Builds the audit sink selected by `config`.
///
/// Disabled auditing discards events; a configured path appends to that
/// file; otherwise events go to stderr.
///
/// # Errors
///
/// Returns an error when the audit file cannot be opened.
pub fn audit_sink_from_config(config: &AuditConfig) -> io::Result<Arc<dyn GatewayAuditSink>> {
    if !config.enabled {
        return Ok(Arc::new(GatewayNoopAuditSink));
    }
    match config.path.as_deref() {
        Some(path) => Ok(Arc::new(GatewayFileAuditSink::new(Path::new(path))?)),
        None => Ok(Arc::new(GatewayStderrAuditSink)),
    }
}
