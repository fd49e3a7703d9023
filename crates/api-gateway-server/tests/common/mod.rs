// crates/api-gateway-server/tests/common/mod.rs
// ============================================================================
// Module: Common Server Test Fixtures
// Description: In-memory backends, recording sinks, and request helpers.
// Purpose: Drive the gateway router in-process and observe its side effects.
// Dependencies: api-gateway-server, axum, http-body-util, tower
// ============================================================================

//! ## Overview
//! Builds a [`GatewayServer`] over [`InMemoryServices`] with sinks that keep
//! every audit event and metric for later assertions.

#![allow(dead_code, reason = "Shared test helpers may be unused in some cases.")]
#![allow(
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    reason = "Test-only helpers use unwrap for clarity."
)]

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;
use std::sync::Mutex;
use std::time::Duration;

use api_gateway_config::ServerConfig;
use api_gateway_core::CapabilityRegistry;
use api_gateway_server::GatewayAuditEvent;
use api_gateway_server::GatewayAuditSink;
use api_gateway_server::GatewayMetricEvent;
use api_gateway_server::GatewayMetrics;
use api_gateway_server::GatewayServer;
use api_gateway_server::build_registry;
use api_gateway_services::InMemoryServices;
use api_gateway_services::Services;
use axum::Router;
use axum::body::Body;
use axum::http::Request;
use axum::http::StatusCode;
use axum::http::header::AUTHORIZATION;
use axum::http::header::CONTENT_TYPE;
use http_body_util::BodyExt;
use tower::ServiceExt;

// ============================================================================
// SECTION: Recording Sinks
// ============================================================================

/// Audit sink keeping every event.
#[derive(Default)]
pub struct TestAudit {
    /// Recorded events in order.
    pub events: Mutex<Vec<GatewayAuditEvent>>,
}

impl TestAudit {
    /// Returns a snapshot of recorded events.
    pub fn events(&self) -> Vec<GatewayAuditEvent> {
        self.events.lock().unwrap().clone()
    }
}

impl GatewayAuditSink for TestAudit {
    fn record(&self, event: &GatewayAuditEvent) {
        self.events.lock().unwrap().push(event.clone());
    }
}

/// Metrics sink keeping every counter event and latency sample.
#[derive(Default)]
pub struct TestMetrics {
    /// Counter events in order.
    pub requests: Mutex<Vec<GatewayMetricEvent>>,
    /// Latency samples in order.
    pub latencies: Mutex<Vec<Duration>>,
}

impl GatewayMetrics for TestMetrics {
    fn record_request(&self, event: GatewayMetricEvent) {
        self.requests.lock().unwrap().push(event);
    }

    fn record_latency(&self, _event: GatewayMetricEvent, latency: Duration) {
        self.latencies.lock().unwrap().push(latency);
    }
}

// ============================================================================
// SECTION: Gateway Fixture
// ============================================================================

/// Gateway wired to an in-memory backend with recording sinks.
pub struct Gateway {
    /// Shared backend state.
    pub memory: Arc<InMemoryServices>,
    /// Audit events.
    pub audit: Arc<TestAudit>,
    /// Metric events.
    pub metrics: Arc<TestMetrics>,
    /// Server under test.
    pub server: GatewayServer,
}

impl Gateway {
    /// Builds the gateway with default server limits.
    pub fn new() -> Self {
        Self::with_config(&test_server_config())
    }

    /// Builds the gateway with `config`.
    pub fn with_config(config: &ServerConfig) -> Self {
        let memory = Arc::new(InMemoryServices::new());
        let registry = build_registry(&Services::from_memory(Arc::clone(&memory))).unwrap();
        Self::over(memory, registry, config)
    }

    /// Builds the gateway over an explicit registry.
    pub fn over(
        memory: Arc<InMemoryServices>,
        registry: CapabilityRegistry,
        config: &ServerConfig,
    ) -> Self {
        let audit = Arc::new(TestAudit::default());
        let metrics = Arc::new(TestMetrics::default());
        let server = GatewayServer::new(registry, config)
            .unwrap()
            .with_audit(Arc::clone(&audit) as Arc<dyn GatewayAuditSink>)
            .with_metrics(Arc::clone(&metrics) as Arc<dyn GatewayMetrics>);
        Self {
            memory,
            audit,
            metrics,
            server,
        }
    }

    /// Returns a fresh router for one request.
    pub fn router(&self) -> Router {
        self.server.router()
    }
}

/// Server limits suitable for in-process tests.
pub fn test_server_config() -> ServerConfig {
    ServerConfig {
        bind: "127.0.0.1:0".to_string(),
        max_body_bytes: 64 * 1024,
        shutdown_timeout_ms: 1_000,
        request_timeout_ms: 5_000,
    }
}

// ============================================================================
// SECTION: Request Helpers
// ============================================================================

/// Collected response.
pub struct Reply {
    /// HTTP status.
    pub status: StatusCode,
    /// Content type header, if any.
    pub content_type: Option<String>,
    /// Echoed request id header, if any.
    pub request_id: Option<String>,
    /// Body as text.
    pub body: String,
}

impl Reply {
    /// Parses the body as JSON.
    pub fn json(&self) -> serde_json::Value {
        serde_json::from_str(&self.body).unwrap()
    }
}

/// Sends `request` through `router` and collects the response.
pub async fn send(router: Router, request: Request<Body>) -> Reply {
    let response = router.oneshot(request).await.unwrap();
    let status = response.status();
    let header = |name: &str| {
        response.headers().get(name).and_then(|value| value.to_str().ok()).map(str::to_string)
    };
    let content_type = header(CONTENT_TYPE.as_str());
    let request_id = header("x-request-id");
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    Reply {
        status,
        content_type,
        request_id,
        body: String::from_utf8(bytes.to_vec()).unwrap(),
    }
}

/// Builds `POST /tools/execute` with an optional bearer token.
pub fn execute_request(body: impl Into<Body>, token: Option<&str>) -> Request<Body> {
    let mut builder =
        Request::post("/tools/execute").header(CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(body.into()).unwrap()
}

/// Builds a tool call body.
pub fn tool_call(tool_name: &str, params: serde_json::Value) -> String {
    serde_json::json!({"tool_name": tool_name, "params": params}).to_string()
}
