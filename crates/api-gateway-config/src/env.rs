// crates/api-gateway-config/src/env.rs
// ============================================================================
// Module: Environment Overrides
// Description: Deployment environment variables layered over file config.
// Purpose: Keep the historical PORT-style variables working.
// Dependencies: crate::config
// ============================================================================

//! ## Overview
//! Deployments configure the gateway with `API_GATEWAY_PORT` and one
//! `*_PORT` variable per backend holding a `host:port` endpoint. These are
//! applied on top of the file (or default) configuration. Blank values are
//! ignored.

use std::net::SocketAddr;

use crate::config::ConfigError;
use crate::config::GatewayConfig;

/// Listener port override.
pub const GATEWAY_PORT_VAR: &str = "API_GATEWAY_PORT";
/// Grades endpoint override.
pub const GRADES_PORT_VAR: &str = "GRADES_PORT";
/// Students endpoint override.
pub const STUDENTS_PORT_VAR: &str = "STUDENTS_PORT";
/// Courses endpoint override.
pub const COURSES_PORT_VAR: &str = "COURSES_PORT";
/// Staff endpoint override.
pub const STAFF_PORT_VAR: &str = "STAFF_PORT";

/// Applies environment overrides using `lookup` to read variables.
///
/// # Errors
///
/// Returns [`ConfigError::Invalid`] when `API_GATEWAY_PORT` is not a port
/// number or the configured bind address cannot take a port.
pub fn apply_env_overrides<F>(config: &mut GatewayConfig, lookup: &F) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let read = |key: &str| {
        lookup(key).map(|value| value.trim().to_string()).filter(|value| !value.is_empty())
    };

    if let Some(port) = read(GATEWAY_PORT_VAR) {
        let port = port.trim_start_matches(':').parse::<u16>().map_err(|_| {
            ConfigError::Invalid(format!("{GATEWAY_PORT_VAR} must be a port number"))
        })?;
        let mut addr: SocketAddr = config.server.bind_addr()?;
        addr.set_port(port);
        config.server.bind = addr.to_string();
    }
    if let Some(endpoint) = read(GRADES_PORT_VAR) {
        config.services.grades = normalize_endpoint(&endpoint);
    }
    if let Some(endpoint) = read(STUDENTS_PORT_VAR) {
        config.services.students = normalize_endpoint(&endpoint);
    }
    if let Some(endpoint) = read(COURSES_PORT_VAR) {
        config.services.courses = normalize_endpoint(&endpoint);
    }
    if let Some(endpoint) = read(STAFF_PORT_VAR) {
        config.services.staff = normalize_endpoint(&endpoint);
    }
    Ok(())
}

/// Normalizes a `host:port` endpoint into an `http://` base URL.
///
/// Values that already carry a scheme are returned unchanged. A bare
/// `:port` binds to `localhost`.
#[must_use]
pub fn normalize_endpoint(endpoint: &str) -> String {
    let endpoint = endpoint.trim().trim_end_matches('/');
    if endpoint.contains("://") {
        return endpoint.to_string();
    }
    if endpoint.starts_with(':') {
        return format!("http://localhost{endpoint}");
    }
    format!("http://{endpoint}")
}
