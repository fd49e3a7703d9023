// crates/api-gateway-config/src/lib.rs
// ============================================================================
// Module: API Gateway Config Library
// Description: Canonical config model, environment overrides, and validation.
// Purpose: Single source of truth for api-gateway.toml semantics.
// Dependencies: serde, toml, url
// ============================================================================

//! ## Overview
//! `api-gateway-config` defines the gateway's configuration model. Files are
//! resolved from an explicit path, the `API_GATEWAY_CONFIG` environment
//! variable, or `api-gateway.toml` in the working directory. Legacy
//! deployment variables (`API_GATEWAY_PORT` and the per-service `*_PORT`
//! endpoints) override file values. Validation is fail-closed.
//!
//! Security posture: config inputs are untrusted.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod config;
pub mod env;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use config::*;
pub use env::apply_env_overrides;
pub use env::normalize_endpoint;
