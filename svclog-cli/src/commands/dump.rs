//! `svclog dump` — print every service's logs.

use std::io;

use anyhow::{Context, Result};
use svclog_core::PlumbingConfig;

pub fn run(config: &PlumbingConfig) -> Result<()> {
    let sink = svclog_sink::global(config);
    let stdout = io::stdout();
    let mut out = stdout.lock();
    sink.dump_all(&mut out).context("failed to dump logs")
}
