// catalog-sync-cli/src/main.rs
// ============================================================================
// Module: Catalog Sync CLI Entry Point
// Description: Command dispatcher for the server and offline checks.
// Purpose: Run the catalog sync server and validate config or mapping files.
// Dependencies: clap, catalog-sync-api, catalog-sync-config, catalog-sync-core
// ============================================================================

//! ## Overview
//! `catalog-sync serve` runs the HTTP server from a TOML config,
//! `catalog-sync config validate` checks that config (and its reference seed)
//! without binding anything, and `catalog-sync mapping check` validates a
//! mapping schema and/or product mapping against a reference seed offline.
//! All printed text goes through the message catalog; file inputs are read
//! with hard size limits.

// ============================================================================
// SECTION: Modules
// ============================================================================


// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs::File;
use std::io::Read;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;
use std::process::ExitCode;

use catalog_sync_api::ApiServerError;
use catalog_sync_api::CatalogSyncServer;
use catalog_sync_cli::t;
use catalog_sync_config::CatalogSyncConfig;
use catalog_sync_config::MAX_SEED_FILE_SIZE;
use catalog_sync_core::InMemoryReferenceData;
use catalog_sync_core::ReferenceSeed;
use catalog_sync_core::ValidationError;
use catalog_sync_core::Violation;
use catalog_sync_core::validate_mapping;
use catalog_sync_core::validate_mapping_schema;
use clap::ArgAction;
use clap::ArgGroup;
use clap::Args;
use clap::CommandFactory;
use clap::Parser;
use clap::Subcommand;
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;

// ============================================================================
// SECTION: Limits
// ============================================================================

/// Maximum size of a mapping schema or mapping JSON input.
const MAX_MAPPING_BYTES: usize = 1024 * 1024;

// ============================================================================
// SECTION: CLI Types
// ============================================================================

/// Top-level CLI definition.
#[derive(Parser, Debug)]
#[command(name = "catalog-sync", disable_help_subcommand = true, disable_version_flag = true)]
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
    /// Start the catalog sync HTTP server.
    Serve(ServeCommand),
    /// Configuration utilities.
    Config {
        /// Selected config subcommand.
        #[command(subcommand)]
        command: ConfigCommand,
    },
    /// Product mapping utilities.
    Mapping {
        /// Selected mapping subcommand.
        #[command(subcommand)]
        command: MappingCommand,
    },
}

/// Arguments for the `serve` command.
#[derive(Args, Debug)]
struct ServeCommand {
    /// Optional config file path (defaults to catalog-sync.toml or env override).
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
}

/// Config subcommands.
#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Validate a catalog sync configuration file.
    Validate(ConfigValidateCommand),
}

/// Arguments for config validation.
#[derive(Args, Debug)]
struct ConfigValidateCommand {
    /// Optional config file path (defaults to catalog-sync.toml or env override).
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
}

/// Mapping subcommands.
#[derive(Subcommand, Debug)]
enum MappingCommand {
    /// Validate a mapping schema and/or product mapping.
    Check(MappingCheckCommand),
}

/// Arguments for `mapping check`.
#[derive(Args, Debug)]
#[command(group(ArgGroup::new("input").required(true).multiple(true).args(["schema", "mapping"])))]
struct MappingCheckCommand {
    /// Reference seed JSON file (defaults to empty reference data).
    #[arg(long, value_name = "PATH")]
    seed: Option<PathBuf>,
    /// Mapping schema JSON file.
    #[arg(long, value_name = "PATH")]
    schema: Option<PathBuf>,
    /// Product mapping JSON file.
    #[arg(long, value_name = "PATH")]
    mapping: Option<PathBuf>,
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// CLI error wrapper carrying a catalog message.
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

    if cli.show_version {
        let version = env!("CARGO_PKG_VERSION");
        write_stdout_line(&t!("main.version", version = version))
            .map_err(|err| CliError::new(output_error("stdout", &err)))?;
        return Ok(ExitCode::SUCCESS);
    }

    let Some(command) = cli.command else {
        show_help()?;
        return Ok(ExitCode::SUCCESS);
    };

    match command {
        Commands::Serve(command) => command_serve(command).await,
        Commands::Config {
            command,
        } => command_config(command),
        Commands::Mapping {
            command,
        } => command_mapping(command),
    }
}

/// Emits the top-level help message.
fn show_help() -> CliResult<()> {
    let mut command = Cli::command();
    command.print_help().map_err(|err| CliError::new(output_error("stdout", &err)))?;
    write_stdout_line("").map_err(|err| CliError::new(output_error("stdout", &err)))?;
    Ok(())
}

// ============================================================================
// SECTION: Serve Command
// ============================================================================

/// Executes the `serve` command.
async fn command_serve(command: ServeCommand) -> CliResult<ExitCode> {
    let config = CatalogSyncConfig::load(command.config.as_deref())
        .map_err(|err| CliError::new(t!("serve.config.load_failed", error = err)))?;
    let server = tokio::task::spawn_blocking(move || CatalogSyncServer::from_config(config))
        .await
        .map_err(|err| {
            CliError::new(t!("serve.init_failed", error = format!("init join failed: {err}")))
        })?
        .map_err(|err| CliError::new(t!("serve.init_failed", error = err)))?;
    server
        .serve()
        .await
        .map_err(|err: ApiServerError| CliError::new(t!("serve.failed", error = err)))?;
    Ok(ExitCode::SUCCESS)
}

// ============================================================================
// SECTION: Config Commands
// ============================================================================

/// Dispatches config subcommands.
fn command_config(command: ConfigCommand) -> CliResult<ExitCode> {
    match command {
        ConfigCommand::Validate(command) => command_config_validate(&command),
    }
}

/// Executes the config validation command.
fn command_config_validate(command: &ConfigValidateCommand) -> CliResult<ExitCode> {
    let config = CatalogSyncConfig::load(command.config.as_deref())
        .map_err(|err| CliError::new(t!("config.load_failed", error = err)))?;
    let seed = config
        .reference_data
        .load_seed()
        .map_err(|err| CliError::new(t!("config.load_failed", error = err)))?;
    write_stdout_line(&t!("config.validate.ok"))
        .map_err(|err| CliError::new(output_error("stdout", &err)))?;
    if let Some(seed) = seed {
        write_stdout_line(&t!(
            "config.validate.seed",
            attributes = seed.attributes.len(),
            channels = seed.channels.len(),
            locales = seed.locales.len(),
            products = seed.products.len(),
        ))
        .map_err(|err| CliError::new(output_error("stdout", &err)))?;
    }
    if config.server.auth.tokens.is_empty() {
        write_stderr_line(&t!("config.validate.local_only"))
            .map_err(|err| CliError::new(output_error("stderr", &err)))?;
    }
    Ok(ExitCode::SUCCESS)
}

// ============================================================================
// SECTION: Mapping Commands
// ============================================================================

/// Dispatches mapping subcommands.
fn command_mapping(command: MappingCommand) -> CliResult<ExitCode> {
    match command {
        MappingCommand::Check(command) => command_mapping_check(&command),
    }
}

/// Executes the mapping check command.
fn command_mapping_check(command: &MappingCheckCommand) -> CliResult<ExitCode> {
    let seed = match &command.seed {
        Some(path) => {
            read_json_file::<ReferenceSeed>(path, &t!("input.kind.seed"), MAX_SEED_FILE_SIZE)?
        }
        None => ReferenceSeed::default(),
    };
    let schema = command
        .schema
        .as_deref()
        .map(|path| read_json_file::<Value>(path, &t!("input.kind.schema"), MAX_MAPPING_BYTES))
        .transpose()?;
    let Some(mapping_path) = command.mapping.as_deref() else {
        return match schema.as_ref().map(validate_mapping_schema) {
            Some(Err(violation)) => report_violations(&[violation]),
            _ => {
                let targets = schema.as_ref().map_or(0, schema_target_count);
                write_stdout_line(&t!("mapping.check.ok", targets = targets, mapped = 0))
                    .map_err(|err| CliError::new(output_error("stdout", &err)))?;
                Ok(ExitCode::SUCCESS)
            }
        };
    };
    let mapping =
        read_json_file::<Value>(mapping_path, &t!("input.kind.mapping"), MAX_MAPPING_BYTES)?;
    let reference = InMemoryReferenceData::from_seed(&seed);
    match validate_mapping(schema.as_ref(), &mapping, &reference) {
        Ok(mapping) => {
            let mapped = mapping.0.values().filter(|source| source.is_some()).count();
            write_stdout_line(&t!("mapping.check.ok", targets = mapping.0.len(), mapped = mapped))
                .map_err(|err| CliError::new(output_error("stdout", &err)))?;
            Ok(ExitCode::SUCCESS)
        }
        Err(ValidationError::Violations(violations)) => report_violations(&violations),
        Err(ValidationError::Reference(err)) => {
            Err(CliError::new(t!("mapping.check.reference_failed", error = err)))
        }
    }
}

/// Prints one line per violation and a summary; exits with failure.
fn report_violations(violations: &[Violation]) -> CliResult<ExitCode> {
    for violation in violations {
        let path =
            if violation.property_path.is_empty() { "." } else { violation.property_path.as_str() };
        let line = match &violation.cause {
            Some(cause) => t!(
                "mapping.check.violation_cause",
                path = path,
                message = violation.message,
                cause = cause
            ),
            None => t!("mapping.check.violation", path = path, message = violation.message),
        };
        write_stdout_line(&line).map_err(|err| CliError::new(output_error("stdout", &err)))?;
    }
    write_stderr_line(&t!("mapping.check.invalid", count = violations.len()))
        .map_err(|err| CliError::new(output_error("stderr", &err)))?;
    Ok(ExitCode::FAILURE)
}

/// Counts the top-level `properties` of a mapping schema.
fn schema_target_count(schema: &Value) -> usize {
    schema.get("properties").and_then(Value::as_object).map_or(0, serde_json::Map::len)
}

// ============================================================================
// SECTION: Input Helpers
// ============================================================================

/// Errors returned by bounded file reads.
#[derive(Debug)]
enum ReadLimitError {
    /// File I/O failure.
    Io(std::io::Error),
    /// File size exceeds the configured limit.
    TooLarge {
        /// Actual size in bytes.
        size: u64,
        /// Allowed limit in bytes.
        limit: usize,
    },
}

/// Reads a file from disk while enforcing a hard size limit.
fn read_bytes_with_limit(path: &Path, max_bytes: usize) -> Result<Vec<u8>, ReadLimitError> {
    let file = File::open(path).map_err(ReadLimitError::Io)?;
    let size = file.metadata().map_err(ReadLimitError::Io)?.len();
    let limit = u64::try_from(max_bytes).unwrap_or(u64::MAX);
    if size > limit {
        return Err(ReadLimitError::TooLarge {
            size,
            limit: max_bytes,
        });
    }

    let mut bytes = Vec::new();
    file.take(limit.saturating_add(1)).read_to_end(&mut bytes).map_err(ReadLimitError::Io)?;
    if bytes.len() > max_bytes {
        return Err(ReadLimitError::TooLarge {
            size: u64::try_from(bytes.len()).unwrap_or(u64::MAX),
            limit: max_bytes,
        });
    }
    Ok(bytes)
}

/// Reads and decodes a bounded JSON input file.
fn read_json_file<T: DeserializeOwned>(
    path: &Path,
    kind: &str,
    max_bytes: usize,
) -> CliResult<T> {
    let bytes = read_bytes_with_limit(path, max_bytes).map_err(|err| match err {
        ReadLimitError::Io(err) => CliError::new(t!(
            "input.read_failed",
            kind = kind,
            path = path.display(),
            error = err
        )),
        ReadLimitError::TooLarge {
            size,
            limit,
        } => CliError::new(t!(
            "input.read_too_large",
            kind = kind,
            path = path.display(),
            size = size,
            limit = limit
        )),
    })?;
    serde_json::from_slice(&bytes).map_err(|err| {
        CliError::new(t!("input.parse_failed", kind = kind, path = path.display(), error = err))
    })
}

// ============================================================================
// SECTION: Output Helpers
// ============================================================================

/// Writes a line to stdout.
fn write_stdout_line(message: &str) -> std::io::Result<()> {
    let mut stdout = std::io::stdout();
    writeln!(&mut stdout, "{message}")
}

/// Writes a line to stderr.
fn write_stderr_line(message: &str) -> std::io::Result<()> {
    let mut stderr = std::io::stderr();
    writeln!(&mut stderr, "{message}")
}

/// Formats an output error message.
fn output_error(stream: &str, error: &std::io::Error) -> String {
    let stream_label = match stream {
        "stdout" => t!("output.stream.stdout"),
        "stderr" => t!("output.stream.stderr"),
        _ => t!("output.stream.unknown"),
    };
    t!("output.write_failed", stream = stream_label, error = error)
}

/// Prints an error and returns a failing exit code.
fn emit_error(message: &str) -> ExitCode {
    let _ = write_stderr_line(message);
    ExitCode::FAILURE
}
