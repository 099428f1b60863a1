// crates/admin-gate-cli/src/main.rs
// ============================================================================
// Module: Admin Gate CLI Entry Point
// Description: Command dispatcher for the Admin Gate MCP server.
// Purpose: Start the server and inspect configuration and proposal tokens.
// Dependencies: clap, admin-gate-config, admin-gate-core, admin-gate-mcp, tokio
// ============================================================================

//! ## Overview
//! The Admin Gate CLI starts the MCP server and offers offline helpers:
//! configuration validation, the tool catalogue, and proposal token
//! inspection. Tokens are only decoded after their signature verifies.

// ============================================================================
// SECTION: Modules
// ============================================================================


// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

use admin_gate_config::AdminGateConfig;
use admin_gate_core::TokenCodec;
use admin_gate_mcp::McpServer;
use admin_gate_mcp::ServerInfo;
use admin_gate_mcp::tooling::tool_definitions;
use clap::ArgAction;
use clap::Args;
use clap::Parser;
use clap::Subcommand;
use serde_json::Value;
use serde_json::json;
use thiserror::Error;

// ============================================================================
// SECTION: CLI Types
// ============================================================================

/// Top-level CLI definition.
#[derive(Parser, Debug)]
#[command(name = "admin-gate", disable_help_subcommand = true, disable_version_flag = true)]
struct Cli {
    /// Print version information and exit.
    #[arg(long = "version", action = ArgAction::SetTrue, global = true)]
    show_version: bool,
    /// Selected subcommand to execute.
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Supported CLI subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the Admin Gate MCP server.
    Serve(ConfigArgs),
    /// Configuration utilities.
    Config {
        /// Selected config subcommand.
        #[command(subcommand)]
        command: ConfigCommand,
    },
    /// Tool catalogue utilities.
    Tools {
        /// Selected tools subcommand.
        #[command(subcommand)]
        command: ToolsCommand,
    },
    /// Proposal token utilities.
    Token {
        /// Selected token subcommand.
        #[command(subcommand)]
        command: TokenCommand,
    },
}

/// Shared config path argument.
#[derive(Args, Debug)]
struct ConfigArgs {
    /// Optional config file path (defaults to admin-gate.toml or `ADMIN_GATE_CONFIG`).
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
}

/// Config subcommands.
#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Validate configuration and print the non-secret summary.
    Validate(ConfigArgs),
}

/// Tools subcommands.
#[derive(Subcommand, Debug)]
enum ToolsCommand {
    /// Print the tool catalogue with input schemas as JSON.
    List,
}

/// Token subcommands.
#[derive(Subcommand, Debug)]
enum TokenCommand {
    /// Verify a confirm token with the configured secret and print its claims.
    Inspect(TokenInspectCommand),
}

/// Arguments for `token inspect`.
#[derive(Args, Debug)]
struct TokenInspectCommand {
    /// Confirm token returned by a gated tool.
    #[arg(long, value_name = "TOKEN")]
    token: String,
    /// Config source for the signing secret.
    #[command(flatten)]
    config: ConfigArgs,
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// CLI error wrapper.
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
    match run(Cli::parse()).await {
        Ok(code) => code,
        Err(err) => emit_error(&err.to_string()),
    }
}

/// Executes the CLI command dispatcher.
async fn run(cli: Cli) -> CliResult<ExitCode> {
    if cli.show_version {
        write_stdout_line(&format!("admin-gate {}", env!("CARGO_PKG_VERSION")))?;
        return Ok(ExitCode::SUCCESS);
    }
    let Some(command) = cli.command else {
        return Err(CliError::new("no command given; try --help".to_string()));
    };
    match command {
        Commands::Serve(args) => command_serve(&args).await,
        Commands::Config {
            command: ConfigCommand::Validate(args),
        } => command_config_validate(&args),
        Commands::Tools {
            command: ToolsCommand::List,
        } => command_tools_list(),
        Commands::Token {
            command: TokenCommand::Inspect(command),
        } => command_token_inspect(&command),
    }
}

// ============================================================================
// SECTION: Commands
// ============================================================================

/// Executes the `serve` command.
async fn command_serve(args: &ConfigArgs) -> CliResult<ExitCode> {
    let config = load_config(args)?;
    let transport = config.server.transport;
    let server = McpServer::from_config(config)
        .map_err(|err| CliError::new(format!("server init failed: {err}")))?;
    write_stderr_line(&format!("admin-gate: serving MCP over {}", transport.as_str()))?;
    server.serve().await.map_err(|err| CliError::new(format!("server failed: {err}")))?;
    Ok(ExitCode::SUCCESS)
}

/// Executes `config validate`.
fn command_config_validate(args: &ConfigArgs) -> CliResult<ExitCode> {
    let config = load_config(args)?;
    let summary = serde_json::to_value(ServerInfo::from_config(&config))
        .map_err(|err| CliError::new(format!("summary serialization failed: {err}")))?;
    write_json_value(&json!({ "ok": true, "config": summary }))?;
    Ok(ExitCode::SUCCESS)
}

/// Executes `tools list`.
fn command_tools_list() -> CliResult<ExitCode> {
    let tools = serde_json::to_value(tool_definitions())
        .map_err(|err| CliError::new(format!("tool serialization failed: {err}")))?;
    write_json_value(&json!({ "tools": tools }))?;
    Ok(ExitCode::SUCCESS)
}

/// Executes `token inspect`.
fn command_token_inspect(command: &TokenInspectCommand) -> CliResult<ExitCode> {
    let config = load_config(&command.config)?;
    let claims = inspect_token(&config, &command.token)?;
    write_json_value(&claims)?;
    Ok(ExitCode::SUCCESS)
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Loads and validates configuration.
fn load_config(args: &ConfigArgs) -> CliResult<AdminGateConfig> {
    AdminGateConfig::load(args.config.as_deref())
        .map_err(|err| CliError::new(format!("failed to load config: {err}")))
}

/// Verifies `token` with the configured secret and renders its claims.
fn inspect_token(config: &AdminGateConfig, token: &str) -> CliResult<Value> {
    let secret = config
        .confirm
        .signing_secret()
        .ok_or_else(|| CliError::new("confirm.secret is not configured".to_string()))?;
    let codec = TokenCodec::new(secret.as_bytes()).map_err(|err| CliError::new(err.to_string()))?;
    let claims = codec.inspect(token).map_err(|err| CliError::new(err.to_string()))?;
    serde_json::to_value(&claims)
        .map_err(|err| CliError::new(format!("claims serialization failed: {err}")))
}

/// Writes a canonical JSON value to stdout.
fn write_json_value(value: &Value) -> CliResult<()> {
    let mut bytes = serde_jcs::to_vec(value)
        .map_err(|err| CliError::new(format!("json encoding failed: {err}")))?;
    bytes.push(b'\n');
    let mut stdout = std::io::stdout();
    stdout.write_all(&bytes).map_err(|err| output_error("stdout", &err))
}

/// Writes a single line to stdout.
fn write_stdout_line(message: &str) -> CliResult<()> {
    let mut stdout = std::io::stdout();
    writeln!(&mut stdout, "{message}").map_err(|err| output_error("stdout", &err))
}

/// Writes a single line to stderr.
fn write_stderr_line(message: &str) -> CliResult<()> {
    let mut stderr = std::io::stderr();
    writeln!(&mut stderr, "{message}").map_err(|err| output_error("stderr", &err))
}

/// Formats an output failure.
fn output_error(stream: &str, error: &std::io::Error) -> CliError {
    CliError::new(format!("failed to write to {stream}: {error}"))
}

/// Emits an error message to stderr and returns a failure exit code.
fn emit_error(message: &str) -> ExitCode {
    let _ = write_stderr_line(message);
    ExitCode::FAILURE
}
