// crates/api-gateway-server/src/server.rs
// ============================================================================
// Module: Gateway HTTP Server
// Description: Tool catalogue and tool execution over HTTP.
// Purpose: Serve the capability registry to machine callers with graceful shutdown.
// Dependencies: api-gateway-core, api-gateway-services, axum, tokio, tokio-util
// ============================================================================

//! ## Overview
//! Two routes are served:
//! - `GET /tools` returns the capability catalogue as JSON.
//! - `POST /tools/execute` takes `{tool_name, params}`, forwards the caller's
//!   bearer credential through the dispatcher, and returns
//!   `{success: true, result}` or a plain-text error.
//!
//! Each execution runs under a child of the server's request token; the guard
//! cancels it when the handler future is dropped, so a client disconnect
//! abandons the backend call. On shutdown the listener stops accepting, and
//! in-flight requests get the configured drain window before being cancelled.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use std::time::Instant;

use api_gateway_config::GatewayConfig;
use api_gateway_config::ServerConfig;
use api_gateway_core::Arguments;
use api_gateway_core::AuthPropagator;
use api_gateway_core::CapabilityRegistry;
use api_gateway_core::DispatchError;
use api_gateway_core::Dispatcher;
use api_gateway_core::DynamicValue;
use api_gateway_core::ExecutionContext;
use api_gateway_core::export_catalogue_json;
use api_gateway_services::Services;
use axum::Router;
use axum::body::Bytes;
use axum::extract::DefaultBodyLimit;
use axum::extract::State;
use axum::extract::rejection::BytesRejection;
use axum::http::HeaderMap;
use axum::http::HeaderValue;
use axum::http::StatusCode;
use axum::http::header::CONTENT_TYPE;
use axum::response::IntoResponse;
use axum::response::Response;
use axum::routing::get;
use axum::routing::post;
use serde::Deserialize;
use serde::Serialize;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

use crate::audit::GatewayAuditEvent;
use crate::audit::GatewayAuditEventParams;
use crate::audit::GatewayAuditSink;
use crate::audit::GatewayNoopAuditSink;
use crate::audit::audit_sink_from_config;
use crate::auth::REQUEST_ID_HEADER;
use crate::auth::RequestContext;
use crate::telemetry::GatewayMetricEvent;
use crate::telemetry::GatewayMetrics;
use crate::telemetry::GatewayOutcome;
use crate::telemetry::GatewayRoute;
use crate::telemetry::NoopMetrics;
use crate::tools::build_registry;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Content type for JSON responses.
const JSON_CONTENT_TYPE: &str = "application/json";

/// Content type for plain-text error responses.
const TEXT_CONTENT_TYPE: &str = "text/plain; charset=utf-8";

/// Time allowed for cancelled requests to unwind after the drain window.
const CANCEL_GRACE: Duration = Duration::from_secs(1);

// ============================================================================
// SECTION: Gateway Server
// ============================================================================

/// HTTP server exposing the capability registry.
pub struct GatewayServer {
    /// Dispatcher over the sealed registry.
    dispatcher: Arc<Dispatcher>,
    /// Listener address.
    bind: SocketAddr,
    /// Maximum accepted request body size.
    max_body_bytes: usize,
    /// Drain window for in-flight requests on shutdown.
    shutdown_timeout: Duration,
    /// Request audit sink.
    audit: Arc<dyn GatewayAuditSink>,
    /// Request metrics sink.
    metrics: Arc<dyn GatewayMetrics>,
    /// Parent token for every in-flight execution.
    requests: CancellationToken,
}

impl GatewayServer {
    /// Builds a server over `registry` with no-op audit and metrics sinks.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError::Config`] when the bind address is invalid.
    pub fn new(registry: CapabilityRegistry, config: &ServerConfig) -> Result<Self, ServerError> {
        let bind = config.bind_addr().map_err(|err| ServerError::Config(err.to_string()))?;
        let propagator = AuthPropagator::with_default_timeout(config.request_timeout());
        Ok(Self {
            dispatcher: Arc::new(Dispatcher::new(Arc::new(registry), propagator)),
            bind,
            max_body_bytes: config.max_body_bytes,
            shutdown_timeout: config.shutdown_timeout(),
            audit: Arc::new(GatewayNoopAuditSink),
            metrics: Arc::new(NoopMetrics),
            requests: CancellationToken::new(),
        })
    }

    /// Builds a server, its backends, and its audit sink from configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError`] when configuration is invalid or initialization fails.
    pub fn from_config(config: &GatewayConfig) -> Result<Self, ServerError> {
        config.validate().map_err(|err| ServerError::Config(err.to_string()))?;
        let services = Services::from_config(&config.services)
            .map_err(|err| ServerError::Init(err.to_string()))?;
        let registry =
            build_registry(&services).map_err(|err| ServerError::Init(err.to_string()))?;
        let audit = audit_sink_from_config(&config.audit)
            .map_err(|err| ServerError::Init(format!("audit sink: {err}")))?;
        tracing::info!(
            backend = config.services.backend.as_str(),
            capabilities = registry.len(),
            "gateway initialised"
        );
        Ok(Self::new(registry, &config.server)?.with_audit(audit))
    }

    /// Replaces the audit sink.
    #[must_use]
    pub fn with_audit(mut self, audit: Arc<dyn GatewayAuditSink>) -> Self {
        self.audit = audit;
        self
    }

    /// Replaces the metrics sink.
    #[must_use]
    pub fn with_metrics(mut self, metrics: Arc<dyn GatewayMetrics>) -> Self {
        self.metrics = metrics;
        self
    }

    /// Returns the configured listener address.
    #[must_use]
    pub const fn bind_addr(&self) -> SocketAddr {
        self.bind
    }

    /// Returns the parent token of every in-flight execution.
    ///
    /// Cancelling it aborts all running tool calls with `503`.
    #[must_use]
    pub fn request_cancellation(&self) -> CancellationToken {
        self.requests.clone()
    }

    /// Builds the axum router for the tool surface.
    #[must_use]
    pub fn router(&self) -> Router {
        let state = Arc::new(ServerState {
            dispatcher: Arc::clone(&self.dispatcher),
            max_body_bytes: self.max_body_bytes,
            audit: Arc::clone(&self.audit),
            metrics: Arc::clone(&self.metrics),
            requests: self.requests.clone(),
        });
        Router::new()
            .route("/tools", get(handle_list))
            .route("/tools/execute", post(handle_execute))
            .layer(DefaultBodyLimit::max(self.max_body_bytes))
            .with_state(state)
    }

    /// Binds the configured address and serves until `shutdown` is cancelled.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError::Transport`] when binding or serving fails.
    pub async fn serve(self, shutdown: CancellationToken) -> Result<(), ServerError> {
        let listener = TcpListener::bind(self.bind)
            .await
            .map_err(|err| ServerError::Transport(format!("bind {} failed: {err}", self.bind)))?;
        self.serve_with_listener(listener, shutdown).await
    }

    /// Serves on an already bound listener until `shutdown` is cancelled.
    ///
    /// After `shutdown` fires, new connections are refused and in-flight
    /// requests get the drain window. Requests still running afterwards are
    /// cancelled.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError::Transport`] when the server fails.
    pub async fn serve_with_listener(
        self,
        listener: TcpListener,
        shutdown: CancellationToken,
    ) -> Result<(), ServerError> {
        if let Ok(addr) = listener.local_addr() {
            tracing::info!(addr = %addr, "gateway listening");
        }
        let app = self.router();
        let server = axum::serve(listener, app)
            .with_graceful_shutdown(shutdown.clone().cancelled_owned())
            .into_future();
        let mut server = std::pin::pin!(server);

        tokio::select! {
            result = &mut server => return result.map_err(transport_error),
            () = shutdown.cancelled() => {}
        }

        tracing::info!(
            drain_ms = u64::try_from(self.shutdown_timeout.as_millis()).unwrap_or(u64::MAX),
            "shutdown requested; draining in-flight requests"
        );
        if let Ok(result) = tokio::time::timeout(self.shutdown_timeout, &mut server).await {
            return result.map_err(transport_error);
        }
        tracing::warn!("drain window elapsed; cancelling in-flight requests");
        self.requests.cancel();
        match tokio::time::timeout(CANCEL_GRACE, &mut server).await {
            Ok(result) => result.map_err(transport_error),
            Err(_) => {
                tracing::warn!("connections still open after cancellation; exiting");
                Ok(())
            }
        }
    }
}

/// Wraps a serve failure.
fn transport_error(err: std::io::Error) -> ServerError {
    ServerError::Transport(format!("http server failed: {err}"))
}

// ============================================================================
// SECTION: Handlers
// ============================================================================

/// Shared state for the tool handlers.
struct ServerState {
    /// Dispatcher over the sealed registry.
    dispatcher: Arc<Dispatcher>,
    /// Maximum accepted request body size.
    max_body_bytes: usize,
    /// Request audit sink.
    audit: Arc<dyn GatewayAuditSink>,
    /// Request metrics sink.
    metrics: Arc<dyn GatewayMetrics>,
    /// Parent token for every in-flight execution.
    requests: CancellationToken,
}

/// Tool execution request body.
#[derive(Debug, Deserialize)]
struct ExecuteRequest {
    /// Capability to invoke.
    tool_name: String,
    /// Named arguments; absent or null means none.
    #[serde(default)]
    params: Option<Arguments>,
}

/// Successful tool execution body.
#[derive(Serialize)]
struct ExecuteResponse<'a> {
    /// Always true.
    success: bool,
    /// Operation result.
    result: &'a DynamicValue,
}

/// Result of handling one request, before audit and response framing.
struct Handled {
    /// HTTP status.
    status: StatusCode,
    /// Response content type.
    content_type: &'static str,
    /// Response body.
    body: Vec<u8>,
    /// Capability targeted, when known.
    capability: Option<String>,
    /// Error label when the request failed.
    error_kind: Option<&'static str>,
}

impl Handled {
    /// Successful JSON response.
    fn json(body: Vec<u8>, capability: Option<String>) -> Self {
        Self {
            status: StatusCode::OK,
            content_type: JSON_CONTENT_TYPE,
            body,
            capability,
            error_kind: None,
        }
    }

    /// Plain-text error response.
    fn error(
        status: StatusCode,
        error_kind: &'static str,
        message: String,
        capability: Option<String>,
    ) -> Self {
        Self {
            status,
            content_type: TEXT_CONTENT_TYPE,
            body: message.into_bytes(),
            capability,
            error_kind: Some(error_kind),
        }
    }
}

/// Serves the capability catalogue.
async fn handle_list(State(state): State<Arc<ServerState>>, headers: HeaderMap) -> Response {
    let started = Instant::now();
    let context = RequestContext::from_headers(&headers);
    let handled = match export_catalogue_json(state.dispatcher.registry()) {
        Ok(catalogue) => Handled::json(catalogue.into_bytes(), None),
        Err(err) => {
            tracing::error!(
                request_id = %context.request_id,
                error = %err,
                "catalogue export failed"
            );
            Handled::error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "serialization",
                "failed to export tool catalogue".to_string(),
                None,
            )
        }
    };
    finish(&state, &context, GatewayRoute::ListTools, 0, handled, started)
}

/// Executes one tool call.
async fn handle_execute(
    State(state): State<Arc<ServerState>>,
    headers: HeaderMap,
    body: Result<Bytes, BytesRejection>,
) -> Response {
    let started = Instant::now();
    let context = RequestContext::from_headers(&headers);
    let (request_bytes, handled) = match body {
        Ok(bytes) => (bytes.len(), execute(&state, &context, &bytes).await),
        Err(rejection) => {
            let status = rejection.status();
            let handled = if status == StatusCode::PAYLOAD_TOO_LARGE {
                body_too_large()
            } else {
                Handled::error(
                    StatusCode::BAD_REQUEST,
                    "invalid_request",
                    format!("invalid request body: {}", rejection.body_text()),
                    None,
                )
            };
            (0, handled)
        }
    };
    finish(&state, &context, GatewayRoute::ExecuteTool, request_bytes, handled, started)
}

/// Decodes the request and dispatches it.
async fn execute(state: &ServerState, context: &RequestContext, bytes: &Bytes) -> Handled {
    if bytes.len() > state.max_body_bytes {
        return body_too_large();
    }
    let request: ExecuteRequest = match serde_json::from_slice(bytes) {
        Ok(request) => request,
        Err(err) => {
            return Handled::error(
                StatusCode::BAD_REQUEST,
                "invalid_request",
                format!("invalid request body: {err}"),
                None,
            );
        }
    };
    let args = request.params.unwrap_or_default();
    let cancellation = state.requests.child_token();
    let _guard = cancellation.clone().drop_guard();
    let base = ExecutionContext::default()
        .with_cancellation(cancellation)
        .with_request_id(context.request_id.clone());

    let capability = Some(request.tool_name.clone());
    match state
        .dispatcher
        .execute_in(&request.tool_name, &args, context.credential_str(), base)
        .await
    {
        Ok(result) => {
            let body = ExecuteResponse {
                success: true,
                result: &result,
            };
            match serde_json::to_vec(&body) {
                Ok(body) => Handled::json(body, capability),
                Err(_) => Handled::error(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "serialization",
                    format!("{}: failed to encode result", request.tool_name),
                    capability,
                ),
            }
        }
        Err(err) => {
            if let DispatchError::Backend {
                capability: tool,
                kind,
                cause,
            } = &err
            {
                tracing::warn!(
                    request_id = %context.request_id,
                    capability = %tool,
                    kind = *kind,
                    cause = %cause,
                    "backend call failed"
                );
            }
            Handled::error(dispatch_status(&err), err.code(), err.to_string(), capability)
        }
    }
}

/// 413 response for an oversized body.
fn body_too_large() -> Handled {
    Handled::error(
        StatusCode::PAYLOAD_TOO_LARGE,
        "body_too_large",
        "request body too large".to_string(),
        None,
    )
}

/// Maps a dispatch failure onto an HTTP status.
const fn dispatch_status(err: &DispatchError) -> StatusCode {
    match err {
        DispatchError::NotFound {
            ..
        }
        | DispatchError::Validation {
            ..
        } => StatusCode::BAD_REQUEST,
        DispatchError::Backend {
            ..
        } => StatusCode::BAD_GATEWAY,
        DispatchError::DeadlineExceeded {
            ..
        } => StatusCode::GATEWAY_TIMEOUT,
        DispatchError::Cancelled {
            ..
        } => StatusCode::SERVICE_UNAVAILABLE,
    }
}

/// Emits audit, metrics, and logs, then frames the response.
fn finish(
    state: &ServerState,
    context: &RequestContext,
    route: GatewayRoute,
    request_bytes: usize,
    handled: Handled,
    started: Instant,
) -> Response {
    let latency = started.elapsed();
    let outcome =
        if handled.status.is_success() { GatewayOutcome::Ok } else { GatewayOutcome::Error };
    let status = handled.status.as_u16();
    let response_bytes = handled.body.len();

    state.audit.record(&GatewayAuditEvent::new(GatewayAuditEventParams {
        request_id: context.request_id.clone(),
        route,
        capability: handled.capability.clone(),
        outcome,
        error_kind: handled.error_kind,
        status,
        request_bytes,
        response_bytes,
        credential_present: context.has_credential(),
    }));
    let metric = GatewayMetricEvent {
        route,
        capability: handled.capability.clone(),
        outcome,
        error_kind: handled.error_kind,
        status,
        request_bytes,
        response_bytes,
    };
    state.metrics.record_request(metric.clone());
    state.metrics.record_latency(metric, latency);

    let latency_ms = u64::try_from(latency.as_millis()).unwrap_or(u64::MAX);
    let capability = handled.capability.as_deref().unwrap_or("-");
    match handled.error_kind {
        None => tracing::info!(
            request_id = %context.request_id,
            route = route.as_str(),
            capability,
            status,
            latency_ms,
            "request completed"
        ),
        Some(error_kind) => tracing::warn!(
            request_id = %context.request_id,
            route = route.as_str(),
            capability,
            status,
            error_kind,
            latency_ms,
            "request failed"
        ),
    }

    let mut response =
        (handled.status, [(CONTENT_TYPE, handled.content_type)], handled.body).into_response();
    if let Ok(value) = HeaderValue::from_str(&context.request_id) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }
    response
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Gateway server errors.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// Configuration errors.
    #[error("config error: {0}")]
    Config(String),
    /// Initialization errors.
    #[error("init error: {0}")]
    Init(String),
    /// Transport errors.
    #[error("transport error: {0}")]
    Transport(String),
}
