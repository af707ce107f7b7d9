//! `svclog collect` — run the log consumer loop.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use svclog_collector::{ensure_log_dir, start_blocking};
use svclog_core::PlumbingConfig;

/// Arguments for `svclog collect`. Each flag overrides the configuration file.
#[derive(Args, Debug, Default)]
pub struct CollectArgs {
    /// Log daemon query socket.
    #[arg(long)]
    pub socket: Option<PathBuf>,

    /// Directory containing the per-service log files.
    #[arg(long)]
    pub log_dir: Option<PathBuf>,

    /// Size in bytes a log file may exceed before it is rotated.
    #[arg(long)]
    pub max_log_size: Option<u64>,

    /// Number of rotated files kept per service.
    #[arg(long)]
    pub max_log_files: Option<usize>,

    /// Service-name prefix whose messages are never written (our own output).
    #[arg(long)]
    pub self_prefix: Option<String>,
}

impl CollectArgs {
    pub fn run(self, config: PlumbingConfig) -> Result<()> {
        let config = self.apply(config);
        ensure_log_dir(&config.log_dir).context("log directory is unusable")?;
        start_blocking(&config).context("log collector stopped with an error")?;
        Ok(())
    }

    fn apply(self, mut config: PlumbingConfig) -> PlumbingConfig {
        if let Some(socket) = self.socket {
            config.query_socket = socket;
        }
        if let Some(dir) = self.log_dir {
            config.log_dir = dir;
        }
        if let Some(size) = self.max_log_size {
            config.max_log_size = size;
        }
        if let Some(files) = self.max_log_files {
            config.max_log_files = files;
        }
        if let Some(prefix) = self.self_prefix {
            config.self_prefix = prefix;
        }
        config
    }
}
