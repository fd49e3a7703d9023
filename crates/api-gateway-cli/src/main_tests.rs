// crates/api-gateway-cli/src/main_tests.rs
// ============================================================================
// Module: CLI Main Helpers Tests
// Description: Unit tests for argument parsing and command helpers.
// Purpose: Keep the command surface and its overrides stable.
// Dependencies: api-gateway-cli main helpers
// ============================================================================

//! ## Overview
//! Exercises clap parsing, the `--backend` override, and catalogue rendering.

#![allow(
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    reason = "Test-only assertions use unwrap for clarity."
)]

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs;
use std::path::Path;
use std::sync::Arc;

use api_gateway_config::GatewayConfig;
use api_gateway_config::ServiceBackend;
use api_gateway_server::build_registry;
use api_gateway_services::InMemoryServices;
use api_gateway_services::Services;
use clap::Parser;

use super::BackendArg;
use super::Cli;
use super::Commands;
use super::ConfigCommand;
use super::ServeCommand;
use super::ToolsCommand;
use super::apply_backend_override;
use super::load_serve_config;
use super::render_catalogue;
use super::validation_summary;

// ============================================================================
// SECTION: Parsing
// ============================================================================

#[test]
fn serve_accepts_config_and_backend() {
    let cli =
        Cli::try_parse_from(["api-gateway", "serve", "--config", "gw.toml", "--backend", "memory"])
            .unwrap();
    let Commands::Serve(command) = cli.command else {
        panic!("expected serve");
    };
    assert_eq!(command.config.as_deref(), Some(Path::new("gw.toml")));
    assert_eq!(command.backend, Some(BackendArg::Memory));
}

#[test]
fn serve_rejects_unknown_backend() {
    assert!(Cli::try_parse_from(["api-gateway", "serve", "--backend", "grpc"]).is_err());
}

#[test]
fn tools_list_parses_pretty_flag() {
    let cli = Cli::try_parse_from(["api-gateway", "tools", "list", "--pretty"]).unwrap();
    let Commands::Tools {
        command: ToolsCommand::List(command),
    } = cli.command
    else {
        panic!("expected tools list");
    };
    assert!(command.pretty);
}

#[test]
fn config_validate_config_path_is_optional() {
    let cli = Cli::try_parse_from(["api-gateway", "config", "validate"]).unwrap();
    let Commands::Config {
        command: ConfigCommand::Validate(command),
    } = cli.command
    else {
        panic!("expected config validate");
    };
    assert!(command.config.is_none());
}

#[test]
fn subcommand_is_required() {
    assert!(Cli::try_parse_from(["api-gateway"]).is_err());
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

#[test]
fn backend_flag_overrides_config() {
    let mut config = GatewayConfig::default();
    apply_backend_override(&mut config, None);
    assert_eq!(config.services.backend, ServiceBackend::Http);
    apply_backend_override(&mut config, Some(BackendArg::Memory));
    assert_eq!(config.services.backend, ServiceBackend::Memory);
}

#[test]
fn memory_backend_flag_skips_unused_service_urls() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("gateway.toml");
    fs::write(&path, "[services]\ngrades = \"not a url\"\n").unwrap();

    let mut command = ServeCommand {
        config: Some(path),
        backend: None,
    };
    let err = load_serve_config(&command).unwrap_err();
    assert!(err.to_string().contains("services.grades"), "{err}");

    command.backend = Some(BackendArg::Memory);
    let config = load_serve_config(&command).unwrap();
    assert_eq!(config.services.backend, ServiceBackend::Memory);
}

#[test]
fn serve_config_is_still_validated_after_overrides() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("gateway.toml");
    fs::write(&path, "[server]\nmax_body_bytes = 0\n").unwrap();
    let command = ServeCommand {
        config: Some(path),
        backend: Some(BackendArg::Memory),
    };
    let err = load_serve_config(&command).unwrap_err();
    assert!(err.to_string().contains("server.max_body_bytes"), "{err}");
}

#[test]
fn pretty_and_compact_catalogues_hold_the_same_entries() {
    let services = Services::from_memory(Arc::new(InMemoryServices::new()));
    let registry = build_registry(&services).unwrap();
    let compact = render_catalogue(&registry, false).unwrap();
    let pretty = render_catalogue(&registry, true).unwrap();
    assert!(!compact.contains('\n'));
    assert!(pretty.contains('\n'));
    let compact: serde_json::Value = serde_json::from_str(&compact).unwrap();
    let pretty: serde_json::Value = serde_json::from_str(&pretty).unwrap();
    assert_eq!(compact, pretty);
    assert_eq!(compact.as_array().unwrap().len(), 14);
}

#[test]
fn validation_summary_names_bind_and_backend() {
    let summary = validation_summary(&GatewayConfig::default());
    assert_eq!(summary, "config ok: bind 0.0.0.0:8080, backend http, audit on");
}
