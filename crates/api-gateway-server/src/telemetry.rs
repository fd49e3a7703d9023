// crates/api-gateway-server/src/telemetry.rs
// ============================================================================
// Module: Gateway Telemetry
// Description: Metric hooks for the tool surface.
// Purpose: Provide request counters and latency observations without hard deps.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! A thin metrics interface for gateway request counters and latency
//! histograms. Deployments plug in their own exporter by implementing
//! [`GatewayMetrics`]; the default discards everything. Labels never carry
//! credentials or argument values.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::time::Duration;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default latency buckets in milliseconds for request histograms.
pub const GATEWAY_LATENCY_BUCKETS_MS: &[u64] =
    &[1, 2, 5, 10, 25, 50, 100, 250, 500, 1_000, 2_500, 5_000, 10_000, 30_000];

// ============================================================================
// SECTION: Metric Labels
// ============================================================================

/// Gateway route classification.
///
/// # Invariants
/// - Variants are stable for telemetry labeling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub enum GatewayRoute {
    /// `GET /tools`.
    #[serde(rename = "/tools")]
    ListTools,
    /// `POST /tools/execute`.
    #[serde(rename = "/tools/execute")]
    ExecuteTool,
}

impl GatewayRoute {
    /// Returns a stable label for the route.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ListTools => "/tools",
            Self::ExecuteTool => "/tools/execute",
        }
    }
}

/// Gateway request outcome classification.
///
/// # Invariants
/// - Variants are stable for telemetry labeling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GatewayOutcome {
    /// Successful request.
    Ok,
    /// Failed request.
    Error,
}

impl GatewayOutcome {
    /// Returns a stable label for the outcome.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ok => "ok",
            Self::Error => "error",
        }
    }
}

/// Gateway request metric event payload.
#[derive(Debug, Clone)]
pub struct GatewayMetricEvent {
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
}

// ============================================================================
// SECTION: Trait
// ============================================================================

/// Metrics sink for gateway requests and latencies.
pub trait GatewayMetrics: Send + Sync {
    /// Records a request counter event.
    fn record_request(&self, event: GatewayMetricEvent);
    /// Records a latency observation for the request.
    fn record_latency(&self, event: GatewayMetricEvent, latency: Duration);
}

/// No-op metrics sink.
pub struct NoopMetrics;

impl GatewayMetrics for NoopMetrics {
    fn record_request(&self, _event: GatewayMetricEvent) {}

    fn record_latency(&self, _event: GatewayMetricEvent, _latency: Duration) {}
}
