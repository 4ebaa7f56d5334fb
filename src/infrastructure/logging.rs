//! Tracing subscriber setup

use std::fs::{self, OpenOptions};
use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::Context;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Where log lines go.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogTarget {
    /// Headless commands log next to their output.
    Stderr,
    /// The terminal UI owns the screen, so logs go to a file.
    File(PathBuf),
}

/// Install the global subscriber. `RUST_LOG` overrides `level`.
pub fn init(level: &str, target: LogTarget) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    match target {
        LogTarget::Stderr => tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
            .try_init()?,
        LogTarget::File(path) => {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)
                    .with_context(|| format!("failed to create {}", parent.display()))?;
            }
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(&path)
                .with_context(|| format!("failed to open log file {}", path.display()))?;
            tracing_subscriber::registry()
                .with(filter)
                .with(fmt::layer().with_writer(Mutex::new(file)).with_ansi(false))
                .try_init()?
        }
    }

    Ok(())
}
