// crates/api-gateway-config/src/config.rs
// ============================================================================
// Module: Gateway Configuration
// Description: Configuration model, loading, and validation.
// Purpose: Parse api-gateway.toml and enforce fail-closed limits.
// Dependencies: serde, thiserror, toml, url
// ============================================================================

//! ## Overview
//! [`GatewayConfig`] is loaded from TOML with every section optional. A
//! missing default file falls back to built-in defaults; a missing explicit
//! file is an error. Environment overrides are applied before validation so
//! the validated values are the ones the server runs with.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs;
use std::io::ErrorKind;
use std::net::SocketAddr;
use std::path::Path;
use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;
use url::Url;

use crate::env::apply_env_overrides;

// ============================================================================
// SECTION: Limits and Defaults
// ============================================================================

/// Default config filename.
const DEFAULT_CONFIG_NAME: &str = "api-gateway.toml";
/// Environment variable for config path.
pub const CONFIG_ENV_VAR: &str = "API_GATEWAY_CONFIG";
/// Maximum config file size in bytes.
pub(crate) const MAX_CONFIG_FILE_SIZE: usize = 1024 * 1024;
/// Maximum length of a single path component.
pub(crate) const MAX_PATH_COMPONENT_LENGTH: usize = 255;
/// Maximum total path length.
pub(crate) const MAX_TOTAL_PATH_LENGTH: usize = 4096;
/// Upper bound for request bodies.
pub(crate) const MAX_BODY_BYTES_LIMIT: usize = 16 * 1024 * 1024;
/// Upper bound for the graceful drain window.
pub(crate) const MAX_SHUTDOWN_TIMEOUT_MS: u64 = 300_000;
/// Lower bound for the per-dispatch deadline.
pub(crate) const MIN_DISPATCH_TIMEOUT_MS: u64 = 100;
/// Upper bound for the per-dispatch deadline.
pub(crate) const MAX_DISPATCH_TIMEOUT_MS: u64 = 300_000;
/// Lower bound for backend connect timeouts.
pub(crate) const MIN_SERVICE_CONNECT_TIMEOUT_MS: u64 = 100;
/// Upper bound for backend connect timeouts.
pub(crate) const MAX_SERVICE_CONNECT_TIMEOUT_MS: u64 = 30_000;
/// Lower bound for backend request timeouts.
pub(crate) const MIN_SERVICE_REQUEST_TIMEOUT_MS: u64 = 500;
/// Upper bound for backend request timeouts.
pub(crate) const MAX_SERVICE_REQUEST_TIMEOUT_MS: u64 = 120_000;
/// Maximum length for the log filter directive.
pub(crate) const MAX_LOG_FILTER_LENGTH: usize = 1024;

// ============================================================================
// SECTION: Config Root
// ============================================================================

/// Gateway configuration root.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GatewayConfig {
    /// HTTP listener settings.
    #[serde(default)]
    pub server: ServerConfig,
    /// Backend microservice settings.
    #[serde(default)]
    pub services: ServicesConfig,
    /// Request audit settings.
    #[serde(default)]
    pub audit: AuditConfig,
    /// Operational logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl GatewayConfig {
    /// Loads configuration using the default resolution rules and the
    /// process environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when loading or validation fails.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        Self::load_with(path, |key| std::env::var(key).ok())
    }

    /// Loads configuration using `lookup` for environment variables.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when loading or validation fails.
    pub fn load_with<F>(path: Option<&Path>, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let config = Self::load_unvalidated_with(path, lookup)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads configuration and environment overrides from the process
    /// environment without validating. Callers layering further overrides
    /// must call [`Self::validate`] afterwards.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the file cannot be read or parsed, or an
    /// environment override is malformed.
    pub fn load_unvalidated(path: Option<&Path>) -> Result<Self, ConfigError> {
        Self::load_unvalidated_with(path, |key| std::env::var(key).ok())
    }

    /// Loads configuration using `lookup` for environment variables, without
    /// validating.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the file cannot be read or parsed, or an
    /// environment override is malformed.
    pub fn load_unvalidated_with<F>(path: Option<&Path>, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let source = resolve_path(path, &lookup)?;
        let mut config = match &source {
            ConfigSource::Explicit(path) => Self::read(path)?,
            ConfigSource::Default(path) => match fs::metadata(path) {
                Ok(_) => Self::read(path)?,
                Err(err) if err.kind() == ErrorKind::NotFound => Self::default(),
                Err(err) => return Err(ConfigError::Io(err.to_string())),
            },
        };
        apply_env_overrides(&mut config, &lookup)?;
        Ok(config)
    }

    /// Parses configuration from TOML text and validates it.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when parsing or validation fails.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self =
            toml::from_str(content).map_err(|err| ConfigError::Parse(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reads and parses a config file without validating it.
    fn read(path: &Path) -> Result<Self, ConfigError> {
        validate_path(path)?;
        let bytes = fs::read(path).map_err(|err| ConfigError::Io(err.to_string()))?;
        if bytes.len() > MAX_CONFIG_FILE_SIZE {
            return Err(ConfigError::Invalid("config file exceeds size limit".to_string()));
        }
        let content = std::str::from_utf8(&bytes)
            .map_err(|_| ConfigError::Invalid("config file must be utf-8".to_string()))?;
        toml::from_str(content).map_err(|err| ConfigError::Parse(err.to_string()))
    }

    /// Validates the configuration for internal consistency.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when configuration is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.server.validate()?;
        self.services.validate()?;
        self.audit.validate()?;
        self.logging.validate()
    }
}

// ============================================================================
// SECTION: Server
// ============================================================================

/// HTTP listener configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Socket address to bind.
    #[serde(default = "default_bind")]
    pub bind: String,
    /// Maximum request body size in bytes.
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
    /// Time allowed for in-flight requests to drain on shutdown.
    #[serde(default = "default_shutdown_timeout_ms")]
    pub shutdown_timeout_ms: u64,
    /// Default deadline applied to each dispatch.
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            max_body_bytes: default_max_body_bytes(),
            shutdown_timeout_ms: default_shutdown_timeout_ms(),
            request_timeout_ms: default_request_timeout_ms(),
        }
    }
}

impl ServerConfig {
    /// Returns the parsed bind address.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] when the address does not parse.
    pub fn bind_addr(&self) -> Result<SocketAddr, ConfigError> {
        self.bind.trim().parse().map_err(|_| {
            ConfigError::Invalid(format!("server.bind is not a socket address: {}", self.bind))
        })
    }

    /// Returns the graceful drain window.
    #[must_use]
    pub const fn shutdown_timeout(&self) -> Duration {
        Duration::from_millis(self.shutdown_timeout_ms)
    }

    /// Returns the default dispatch deadline.
    #[must_use]
    pub const fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    /// Validates server configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        self.bind_addr()?;
        if self.max_body_bytes == 0 || self.max_body_bytes > MAX_BODY_BYTES_LIMIT {
            return Err(ConfigError::Invalid(format!(
                "server.max_body_bytes must be between 1 and {MAX_BODY_BYTES_LIMIT}"
            )));
        }
        if self.shutdown_timeout_ms > MAX_SHUTDOWN_TIMEOUT_MS {
            return Err(ConfigError::Invalid(format!(
                "server.shutdown_timeout_ms must be at most {MAX_SHUTDOWN_TIMEOUT_MS}"
            )));
        }
        validate_range(
            "server.request_timeout_ms",
            self.request_timeout_ms,
            MIN_DISPATCH_TIMEOUT_MS,
            MAX_DISPATCH_TIMEOUT_MS,
        )
    }
}

// ============================================================================
// SECTION: Services
// ============================================================================

/// Backend implementation used to serve capabilities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceBackend {
    /// HTTP/JSON microservices.
    #[default]
    Http,
    /// In-process in-memory backend for local development.
    Memory,
}

impl ServiceBackend {
    /// Returns the stable label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Http => "http",
            Self::Memory => "memory",
        }
    }
}

/// Backend microservice configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServicesConfig {
    /// Backend implementation.
    #[serde(default)]
    pub backend: ServiceBackend,
    /// Connect timeout for backend calls.
    #[serde(default = "default_service_connect_timeout_ms")]
    pub connect_timeout_ms: u64,
    /// Per-call request timeout for backend calls.
    #[serde(default = "default_service_request_timeout_ms")]
    pub request_timeout_ms: u64,
    /// Grades service base URL.
    #[serde(default = "default_grades_url")]
    pub grades: String,
    /// Students service base URL.
    #[serde(default = "default_students_url")]
    pub students: String,
    /// Courses service base URL (also serves homework and announcements).
    #[serde(default = "default_courses_url")]
    pub courses: String,
    /// Staff service base URL.
    #[serde(default = "default_staff_url")]
    pub staff: String,
}

impl Default for ServicesConfig {
    fn default() -> Self {
        Self {
            backend: ServiceBackend::default(),
            connect_timeout_ms: default_service_connect_timeout_ms(),
            request_timeout_ms: default_service_request_timeout_ms(),
            grades: default_grades_url(),
            students: default_students_url(),
            courses: default_courses_url(),
            staff: default_staff_url(),
        }
    }
}

impl ServicesConfig {
    /// Returns the backend connect timeout.
    #[must_use]
    pub const fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    /// Returns the backend request timeout.
    #[must_use]
    pub const fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    /// Validates service configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        validate_range(
            "services.connect_timeout_ms",
            self.connect_timeout_ms,
            MIN_SERVICE_CONNECT_TIMEOUT_MS,
            MAX_SERVICE_CONNECT_TIMEOUT_MS,
        )?;
        validate_range(
            "services.request_timeout_ms",
            self.request_timeout_ms,
            MIN_SERVICE_REQUEST_TIMEOUT_MS,
            MAX_SERVICE_REQUEST_TIMEOUT_MS,
        )?;
        if self.backend == ServiceBackend::Memory {
            return Ok(());
        }
        validate_service_url("services.grades", &self.grades)?;
        validate_service_url("services.students", &self.students)?;
        validate_service_url("services.courses", &self.courses)?;
        validate_service_url("services.staff", &self.staff)
    }
}

// ============================================================================
// SECTION: Audit and Logging
// ============================================================================

/// Request audit configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AuditConfig {
    /// Enable structured audit records.
    #[serde(default = "default_audit_enabled")]
    pub enabled: bool,
    /// Optional audit log path (JSON lines); stderr when omitted.
    #[serde(default)]
    pub path: Option<String>,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            enabled: default_audit_enabled(),
            path: None,
        }
    }
}

impl AuditConfig {
    /// Validates audit configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        if let Some(path) = &self.path {
            validate_path_string("audit.path", path)?;
        }
        Ok(())
    }
}

/// Operational logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// `tracing-subscriber` filter directive; `RUST_LOG` takes precedence.
    #[serde(default = "default_log_filter")]
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: default_log_filter(),
        }
    }
}

impl LoggingConfig {
    /// Validates logging configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        let filter = self.filter.trim();
        if filter.is_empty() {
            return Err(ConfigError::Invalid("logging.filter must be non-empty".to_string()));
        }
        if filter.len() > MAX_LOG_FILTER_LENGTH {
            return Err(ConfigError::Invalid("logging.filter exceeds max length".to_string()));
        }
        Ok(())
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Configuration loading or validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// I/O failure while reading configuration.
    #[error("config io error: {0}")]
    Io(String),
    /// TOML parsing error.
    #[error("config parse error: {0}")]
    Parse(String),
    /// Invalid configuration data.
    #[error("invalid config: {0}")]
    Invalid(String),
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Where the config path came from.
enum ConfigSource {
    /// CLI flag or environment variable; must exist.
    Explicit(PathBuf),
    /// Working-directory default; may be absent.
    Default(PathBuf),
}

/// Resolves the config path from CLI or environment defaults.
fn resolve_path<F>(path: Option<&Path>, lookup: &F) -> Result<ConfigSource, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(path) = path {
        return Ok(ConfigSource::Explicit(path.to_path_buf()));
    }
    if let Some(env_path) = lookup(CONFIG_ENV_VAR).filter(|value| !value.trim().is_empty()) {
        if env_path.len() > MAX_TOTAL_PATH_LENGTH {
            return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
        }
        return Ok(ConfigSource::Explicit(PathBuf::from(env_path)));
    }
    Ok(ConfigSource::Default(PathBuf::from(DEFAULT_CONFIG_NAME)))
}

/// Validates the resolved path against security limits.
fn validate_path(path: &Path) -> Result<(), ConfigError> {
    let text = path.to_string_lossy();
    if text.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
    }
    for component in path.components() {
        let value = component.as_os_str().to_string_lossy();
        if value.len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Invalid("config path component too long".to_string()));
        }
    }
    Ok(())
}

/// Validates a path string against length constraints.
fn validate_path_string(field: &str, value: &str) -> Result<(), ConfigError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ConfigError::Invalid(format!("{field} must be non-empty")));
    }
    if trimmed.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid(format!("{field} exceeds max length")));
    }
    for component in Path::new(trimmed).components() {
        if component.as_os_str().len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Invalid(format!("{field} path component too long")));
        }
    }
    Ok(())
}

/// Validates a backend base URL.
fn validate_service_url(field: &str, value: &str) -> Result<(), ConfigError> {
    let url = Url::parse(value.trim())
        .map_err(|err| ConfigError::Invalid(format!("{field} is not a valid url: {err}")))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::Invalid(format!("{field} must use http or https")));
    }
    if url.host_str().is_none_or(str::is_empty) {
        return Err(ConfigError::Invalid(format!("{field} must include a host")));
    }
    if url.query().is_some() || url.fragment().is_some() {
        return Err(ConfigError::Invalid(format!("{field} must not include query or fragment")));
    }
    Ok(())
}

/// Validates an inclusive numeric range.
fn validate_range(field: &str, value: u64, min: u64, max: u64) -> Result<(), ConfigError> {
    if value < min || value > max {
        return Err(ConfigError::Invalid(format!("{field} must be between {min} and {max}")));
    }
    Ok(())
}

/// Default bind address.
fn default_bind() -> String {
    "0.0.0.0:8080".to_string()
}

/// Default maximum request body size.
pub(crate) const fn default_max_body_bytes() -> usize {
    1024 * 1024
}

/// Default graceful drain window.
pub(crate) const fn default_shutdown_timeout_ms() -> u64 {
    15_000
}

/// Default dispatch deadline.
pub(crate) const fn default_request_timeout_ms() -> u64 {
    30_000
}

/// Default backend connect timeout.
pub(crate) const fn default_service_connect_timeout_ms() -> u64 {
    2_000
}

/// Default backend request timeout.
pub(crate) const fn default_service_request_timeout_ms() -> u64 {
    10_000
}

/// Default grades endpoint.
fn default_grades_url() -> String {
    "http://localhost:50051".to_string()
}

/// Default students endpoint.
fn default_students_url() -> String {
    "http://localhost:50052".to_string()
}

/// Default courses endpoint.
fn default_courses_url() -> String {
    "http://localhost:50054".to_string()
}

/// Default staff endpoint.
fn default_staff_url() -> String {
    "http://localhost:50055".to_string()
}

/// Audit records are on unless disabled.
pub(crate) const fn default_audit_enabled() -> bool {
    true
}

/// Default log filter.
fn default_log_filter() -> String {
    "info".to_string()
}

// ============================================================================
// SECTION: Tests
// ============================================================================
