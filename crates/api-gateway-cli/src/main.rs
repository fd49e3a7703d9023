// crates/api-gateway-cli/src/main.rs
// ============================================================================
// Module: API Gateway CLI Entry Point
// Description: Command dispatcher for the gateway server and its tooling.
// Purpose: Start the HTTP gateway, export the tool catalogue, check configs.
// Dependencies: clap, dotenvy, tokio, tracing-subscriber, api-gateway-server
// ============================================================================

//! ## Overview
//! `api-gateway serve` loads configuration, initialises logging, and serves
//! the capability registry until SIGINT or SIGTERM. `api-gateway tools list`
//! prints the catalogue without contacting any backend, and
//! `api-gateway config validate` checks a configuration file and exits.
//!
//! A `.env` file in the working directory is loaded before configuration so
//! its variables participate in environment overrides.

// ============================================================================
// SECTION: Modules
// ============================================================================

#[cfg(test)]
mod main_tests;

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use api_gateway_config::GatewayConfig;
use api_gateway_config::LoggingConfig;
use api_gateway_config::ServiceBackend;
use api_gateway_core::CapabilityRegistry;
use api_gateway_core::export_catalogue;
use api_gateway_core::export_catalogue_json;
use api_gateway_server::GatewayServer;
use api_gateway_server::build_registry;
use api_gateway_services::InMemoryServices;
use api_gateway_services::Services;
use clap::Args;
use clap::Parser;
use clap::Subcommand;
use clap::ValueEnum;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

// ============================================================================
// SECTION: CLI Types
// ============================================================================

/// Top-level CLI definition.
#[derive(Parser, Debug)]
#[command(name = "api-gateway", version, disable_help_subcommand = true)]
struct Cli {
    /// Selected subcommand to execute.
    #[command(subcommand)]
    command: Commands,
}

/// Supported CLI subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the HTTP gateway.
    Serve(ServeCommand),
    /// Capability catalogue utilities.
    Tools {
        /// Selected tools subcommand.
        #[command(subcommand)]
        command: ToolsCommand,
    },
    /// Configuration utilities.
    Config {
        /// Selected config subcommand.
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

/// Arguments for `serve`.
#[derive(Args, Debug)]
struct ServeCommand {
    /// Path to the gateway config file.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
    /// Overrides `services.backend` from the config file.
    #[arg(long, value_enum, value_name = "BACKEND")]
    backend: Option<BackendArg>,
}

/// Backend selection accepted on the command line.
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum BackendArg {
    /// HTTP/JSON microservices.
    Http,
    /// In-process in-memory backend.
    Memory,
}

impl From<BackendArg> for ServiceBackend {
    fn from(value: BackendArg) -> Self {
        match value {
            BackendArg::Http => Self::Http,
            BackendArg::Memory => Self::Memory,
        }
    }
}

/// Tools subcommands.
#[derive(Subcommand, Debug)]
enum ToolsCommand {
    /// Print the capability catalogue as JSON.
    List(ToolsListCommand),
}

/// Arguments for `tools list`.
#[derive(Args, Debug)]
struct ToolsListCommand {
    /// Pretty-print the catalogue.
    #[arg(long)]
    pretty: bool,
}

/// Config subcommands.
#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Load and validate a configuration file.
    Validate(ConfigValidateCommand),
}

/// Arguments for `config validate`.
#[derive(Args, Debug)]
struct ConfigValidateCommand {
    /// Path to the gateway config file.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// CLI error wrapper carrying the message shown to the operator.
#[derive(Debug, Error)]
#[error("{message}")]
struct CliError {
    /// Human-readable error message.
    message: String,
}

impl CliError {
    /// Constructs a new [`CliError`].
    const fn new(message: String) -> Self {
        Self {
            message,
        }
    }
}

/// CLI result alias for fallible operations.
type CliResult<T> = Result<T, CliError>;

// ============================================================================
// SECTION: Entry Point
// ============================================================================

/// CLI entry point returning an exit code.
#[tokio::main(flavor = "multi_thread")]
async fn main() -> ExitCode {
    match run().await {
        Ok(code) => code,
        Err(err) => emit_error(&err.to_string()),
    }
}

/// Executes the CLI command dispatcher.
async fn run() -> CliResult<ExitCode> {
    let cli = Cli::parse();
    let _ = dotenvy::dotenv();

    match cli.command {
        Commands::Serve(command) => command_serve(command).await,
        Commands::Tools {
            command,
        } => match command {
            ToolsCommand::List(command) => command_tools_list(&command),
        },
        Commands::Config {
            command,
        } => match command {
            ConfigCommand::Validate(command) => command_config_validate(&command),
        },
    }
}

// ============================================================================
// SECTION: Serve Command
// ============================================================================

/// Executes the `serve` command.
async fn command_serve(command: ServeCommand) -> CliResult<ExitCode> {
    let config = load_serve_config(&command)?;
    init_logging(&config.logging)?;

    let server = GatewayServer::from_config(&config)
        .map_err(|err| CliError::new(format!("failed to initialise gateway: {err}")))?;
    let shutdown = CancellationToken::new();
    tokio::spawn(watch_shutdown_signals(shutdown.clone()));
    server.serve(shutdown).await.map_err(|err| CliError::new(format!("gateway failed: {err}")))?;

    tracing::info!("gateway stopped");
    Ok(ExitCode::SUCCESS)
}

/// Loads the serve configuration, applying command-line overrides before
/// validation.
fn load_serve_config(command: &ServeCommand) -> CliResult<GatewayConfig> {
    let mut config = GatewayConfig::load_unvalidated(command.config.as_deref())
        .map_err(|err| CliError::new(format!("failed to load config: {err}")))?;
    apply_backend_override(&mut config, command.backend);
    config.validate().map_err(|err| CliError::new(format!("failed to load config: {err}")))?;
    Ok(config)
}

/// Applies the `--backend` flag over the loaded configuration.
fn apply_backend_override(config: &mut GatewayConfig, backend: Option<BackendArg>) {
    if let Some(backend) = backend {
        config.services.backend = backend.into();
    }
}

/// Installs the global tracing subscriber. `RUST_LOG` wins over the config.
fn init_logging(logging: &LoggingConfig) -> CliResult<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(logging.filter.trim()))
        .map_err(|err| CliError::new(format!("invalid log filter: {err}")))?;
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init()
        .map_err(|err| CliError::new(format!("failed to initialise logging: {err}")))
}

/// Cancels `shutdown` on SIGINT or SIGTERM.
async fn watch_shutdown_signals(shutdown: CancellationToken) {
    let interrupt = async {
        if tokio::signal::ctrl_c().await.is_err() {
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(_) => std::future::pending::<()>().await,
        }
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = interrupt => tracing::info!(signal = "SIGINT", "shutdown requested"),
        () = terminate => tracing::info!(signal = "SIGTERM", "shutdown requested"),
    }
    shutdown.cancel();
}

// ============================================================================
// SECTION: Tools Command
// ============================================================================

/// Executes `tools list`.
fn command_tools_list(command: &ToolsListCommand) -> CliResult<ExitCode> {
    let services = Services::from_memory(Arc::new(InMemoryServices::new()));
    let registry = build_registry(&services)
        .map_err(|err| CliError::new(format!("failed to build registry: {err}")))?;
    let output = render_catalogue(&registry, command.pretty)
        .map_err(|err| CliError::new(format!("failed to serialize catalogue: {err}")))?;
    write_stdout_line(&output).map_err(|err| CliError::new(output_error("stdout", &err)))?;
    Ok(ExitCode::SUCCESS)
}

/// Renders the catalogue of `registry` as JSON.
fn render_catalogue(
    registry: &CapabilityRegistry,
    pretty: bool,
) -> Result<String, serde_json::Error> {
    if pretty {
        serde_json::to_string_pretty(&export_catalogue(registry))
    } else {
        export_catalogue_json(registry)
    }
}

// ============================================================================
// SECTION: Config Command
// ============================================================================

/// Executes `config validate`.
fn command_config_validate(command: &ConfigValidateCommand) -> CliResult<ExitCode> {
    let config = GatewayConfig::load(command.config.as_deref())
        .map_err(|err| CliError::new(format!("failed to load config: {err}")))?;
    write_stdout_line(&validation_summary(&config))
        .map_err(|err| CliError::new(output_error("stdout", &err)))?;
    Ok(ExitCode::SUCCESS)
}

/// Summarises a validated configuration in one line.
fn validation_summary(config: &GatewayConfig) -> String {
    format!(
        "config ok: bind {}, backend {}, audit {}",
        config.server.bind,
        config.services.backend.as_str(),
        if config.audit.enabled { "on" } else { "off" }
    )
}

// ============================================================================
// SECTION: Output Helpers
// ============================================================================

/// Writes a single line to stdout.
fn write_stdout_line(message: &str) -> std::io::Result<()> {
    let mut stdout = std::io::stdout();
    writeln!(&mut stdout, "{message}")
}

/// Writes a single line to stderr.
fn write_stderr_line(message: &str) -> std::io::Result<()> {
    let mut stderr = std::io::stderr();
    writeln!(&mut stderr, "{message}")
}

/// Formats an output failure for `stream`.
fn output_error(stream: &str, error: &std::io::Error) -> String {
    format!("failed to write to {stream}: {error}")
}

/// Emits an error message to stderr and returns a failure exit code.
fn emit_error(message: &str) -> ExitCode {
    let _ = write_stderr_line(message);
    ExitCode::FAILURE
}
