//! Binary entry point for the vylint CLI.
//!
//! ## Usage
//!
//! ```bash
//! # Report render methods without a matching companion
//! vylint check src/
//!
//! # Preview the generated companions without writing
//! vylint fix --dry-run
//!
//! # Only rewrite mismatched parameter lists
//! vylint fix --only RenderElParamsMismatch
//! ```

use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};

use vylint::cli::{run_check, run_fix};
use vylint_core::config::{CliOverrides, ResolvedConfig};
use vylint_core::diagnostic::{DiagnosticCode, FixMode};
use vylint_core::error::{OutputErrorCode, VylintError};
use vylint_core::output::{emit_response, ErrorResponse};

// ============================================================================
// CLI Structure
// ============================================================================

/// Keep Vy render methods and their element factories in sync.
///
/// All output is JSON on stdout; logs go to stderr.
#[derive(Parser, Debug)]
#[command(name = "vylint", version, about = "Keep Vy render methods and element factories in sync")]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,
    #[command(subcommand)]
    command: Command,
}

/// Global arguments shared by all subcommands.
#[derive(Parser, Debug)]
struct GlobalArgs {
    /// Workspace root directory (default: current directory).
    #[arg(long, global = true)]
    workspace: Option<PathBuf>,

    /// Project config file (default: vylint.json in the workspace).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log level for tracing output.
    #[arg(long, global = true, value_enum, default_value = "warn")]
    log_level: LogLevel,

    /// Attribute marking render methods.
    #[arg(long, global = true)]
    trigger_attribute: Option<String>,

    /// Attribute written on generated companions.
    #[arg(long, global = true)]
    companion_attribute: Option<String>,

    /// Function called by generated companions.
    #[arg(long, global = true)]
    element_function: Option<String>,

    /// Return type of generated companions.
    #[arg(long, global = true)]
    element_class: Option<String>,
}

/// Log level for tracing output.
#[derive(Clone, Copy, Debug, ValueEnum)]
enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    fn to_tracing_level(self) -> tracing::Level {
        match self {
            LogLevel::Trace => tracing::Level::TRACE,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Error => tracing::Level::ERROR,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Report violations. Exits 1 when any are found.
    Check {
        /// Files or directories to check (default: the whole workspace).
        paths: Vec<PathBuf>,
    },

    /// Generate or rewrite companions.
    Fix {
        /// Report the edits without writing files.
        #[arg(long)]
        dry_run: bool,

        /// Only fix these diagnostic codes (repeatable; default: all).
        #[arg(long = "only", value_name = "CODE")]
        only: Vec<DiagnosticCode>,

        /// Files or directories to fix (default: the whole workspace).
        paths: Vec<PathBuf>,
    },
}

// ============================================================================
// Main Entry Point
// ============================================================================

fn main() -> ExitCode {
    let cli = Cli::parse();

    init_tracing(cli.global.log_level);

    match execute(cli) {
        Ok(code) => code,
        Err(err) => {
            let error_code = OutputErrorCode::from(&err);
            let response = ErrorResponse::from_error(&err);

            // Errors go to stdout as JSON like every other response.
            let _ = emit_response(&response, &mut io::stdout());
            let _ = io::stdout().flush();

            ExitCode::from(error_code.code())
        }
    }
}

/// Initialize tracing subscriber.
fn init_tracing(level: LogLevel) {
    use tracing_subscriber::fmt::format::FmtSpan;
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.to_tracing_level().to_string()));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_span_events(FmtSpan::CLOSE)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

/// Execute the CLI command.
fn execute(cli: Cli) -> Result<ExitCode, VylintError> {
    let workspace = match &cli.global.workspace {
        Some(path) => path.clone(),
        None => std::env::current_dir()
            .map_err(|e| VylintError::internal(format!("cannot read current directory: {}", e)))?,
    };
    if !workspace.is_dir() {
        return Err(VylintError::invalid_args(format!(
            "workspace '{}' is not a directory",
            workspace.display()
        )));
    }

    let overrides = CliOverrides {
        config_file: cli.global.config.clone(),
        trigger_attribute: cli.global.trigger_attribute.clone(),
        companion_attribute: cli.global.companion_attribute.clone(),
        element_function: cli.global.element_function.clone(),
        element_class: cli.global.element_class.clone(),
    };
    let config = ResolvedConfig::resolve(&workspace, &overrides)?.rule_config();

    match cli.command {
        Command::Check { paths } => {
            let response = run_check(&workspace, &paths, config)?;
            emit(&response)?;
            Ok(if response.summary.errors == 0 {
                ExitCode::SUCCESS
            } else {
                ExitCode::from(1)
            })
        }
        Command::Fix {
            dry_run,
            only,
            paths,
        } => {
            let response = run_fix(
                &workspace,
                &paths,
                config,
                &FixMode::from_codes(only),
                dry_run,
            )?;
            emit(&response)?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn emit<T: serde::Serialize>(response: &T) -> Result<(), VylintError> {
    emit_response(response, &mut io::stdout()).map_err(|e| VylintError::internal(e.to_string()))
}
