//! `svclog exec` — run a command with stdout and stderr sent to a sink.

use std::fs::{File, OpenOptions};
use std::process::{Command, Stdio};

use anyhow::{bail, Context, Result};
use clap::Args;
use svclog_core::{PlumbingConfig, ServiceName};
use svclog_sink::{LogSink, SinkError};

/// Arguments for `svclog exec`.
#[derive(Args, Debug)]
pub struct ExecArgs {
    /// Service name the output is logged under.
    pub service: String,

    /// Redirect through the path the sink locates instead of an opened
    /// handle, the way a supervisor prepares a service before starting it.
    #[arg(long)]
    pub by_path: bool,

    /// Command and arguments to run.
    #[arg(last = true, required = true)]
    pub command: Vec<String>,
}

impl ExecArgs {
    pub fn run(self, config: &PlumbingConfig) -> Result<()> {
        let service = ServiceName::from(self.service.as_str());
        if !service.is_well_formed() || !service.is_path_safe() {
            bail!("invalid service name '{service}'");
        }

        let sink = svclog_sink::global(config);
        let destination = if self.by_path {
            Some(open_located(sink.as_ref(), service.as_str())?)
        } else {
            open_handle(sink.as_ref(), service.as_str())?
        };

        let (program, args) = self
            .command
            .split_first()
            .context("no command given")?;
        let mut cmd = Command::new(program);
        cmd.args(args);
        if let Some(out) = destination {
            let err = out.try_clone().context("failed to duplicate log handle")?;
            cmd.stdout(Stdio::from(out)).stderr(Stdio::from(err));
        }

        let status = cmd
            .status()
            .with_context(|| format!("failed to run '{program}'"))?;
        tracing::debug!(service = %service, %status, "command finished");
        if !status.success() {
            bail!("'{program}' exited with {status}");
        }
        Ok(())
    }
}

fn open_located(sink: &dyn LogSink, service: &str) -> Result<File> {
    let path = sink.locate(service);
    OpenOptions::new()
        .write(true)
        .open(&path)
        .with_context(|| format!("failed to open log destination {}", path.display()))
}

/// `None` means the daemon refused the handle and output stays on the
/// terminal.
fn open_handle(sink: &dyn LogSink, service: &str) -> Result<Option<File>> {
    match sink.open(service) {
        Ok(file) => Ok(Some(file)),
        Err(err @ SinkError::LoggingUnavailable { .. }) => {
            tracing::warn!(service, error = %err, "continuing without centralized logging");
            Ok(None)
        }
        Err(err) => Err(err).context("failed to open log destination"),
    }
}
