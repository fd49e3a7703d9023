// crates/api-gateway-server/src/lib.rs
// ============================================================================
// Module: API Gateway Server
// Description: Capability registry population and the HTTP tool surface.
// Purpose: Wire backend services into a dispatcher and serve it over HTTP.
// Dependencies: api-gateway-config, api-gateway-core, api-gateway-services, axum
// ============================================================================

//! ## Overview
//! The server crate turns configured backend services into a sealed
//! capability registry and serves it on `GET /tools` and
//! `POST /tools/execute`. Every request is audited and measured through
//! pluggable sinks.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod audit;
pub mod auth;
pub mod server;
pub mod telemetry;
pub mod tools;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use audit::GatewayAuditEvent;
pub use audit::GatewayAuditEventParams;
pub use audit::GatewayAuditSink;
pub use audit::GatewayFileAuditSink;
pub use audit::GatewayNoopAuditSink;
pub use audit::GatewayStderrAuditSink;
pub use audit::audit_sink_from_config;
pub use auth::REQUEST_ID_HEADER;
pub use auth::RequestContext;
pub use server::GatewayServer;
pub use server::ServerError;
pub use telemetry::GATEWAY_LATENCY_BUCKETS_MS;
pub use telemetry::GatewayMetricEvent;
pub use telemetry::GatewayMetrics;
pub use telemetry::GatewayOutcome;
pub use telemetry::GatewayRoute;
pub use telemetry::NoopMetrics;
pub use tools::RegistrationError;
pub use tools::build_registry;
