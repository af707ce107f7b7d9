//! svclog — per-service log plumbing for a minimal container host.
//!
//! # Usage
//!
//! ```text
//! svclog collect [--socket <path>] [--log-dir <dir>] [--max-log-size <bytes>] [--max-log-files <n>]
//! svclog dump
//! svclog exec <service> [--by-path] -- <command> [args...]
//! ```
//!
//! Every command accepts `--config <file.yaml>` and `--log-format text|json`.

mod commands;

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use commands::{collect::CollectArgs, exec::ExecArgs};
use svclog_collector::LogFormat;
use svclog_core::PlumbingConfig;

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "svclog",
    version,
    about = "Route service output to the log daemon or to rotated log files",
    long_about = None,
)]
struct Cli {
    /// YAML configuration file; built-in defaults are used when omitted.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Format of svclog's own diagnostics on stderr: text or json.
    #[arg(long, global = true, default_value = "text")]
    log_format: LogFormatArg,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Follow the log daemon and write one rotated log file per service.
    Collect(CollectArgs),

    /// Copy all logs collected so far to stdout.
    Dump,

    /// Run a command with its output attached to a service's log.
    Exec(ExecArgs),
}

// ---------------------------------------------------------------------------
// Shared LogFormat argument
// ---------------------------------------------------------------------------

/// Thin wrapper so clap can parse `LogFormat` from CLI args.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogFormatArg(pub LogFormat);

impl FromStr for LogFormatArg {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "text" => Ok(Self(LogFormat::Text)),
            "json" => Ok(Self(LogFormat::Json)),
            other => Err(format!("unknown log format '{other}'; expected: text, json")),
        }
    }
}

impl fmt::Display for LogFormatArg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            LogFormat::Text => write!(f, "text"),
            LogFormat::Json => write!(f, "json"),
        }
    }
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    let cli = Cli::parse();
    svclog_collector::init_tracing(cli.log_format.0);

    let config = PlumbingConfig::load_or_default(cli.config.as_deref())
        .context("failed to load configuration")?;

    match cli.command {
        Commands::Collect(args) => args.run(config),
        Commands::Dump => commands::dump::run(&config),
        Commands::Exec(args) => args.run(&config),
    }
}
