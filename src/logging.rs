use std::fs::OpenOptions;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{Context, Result, anyhow};
use tracing_subscriber::EnvFilter;

const LOG_ENV: &str = "PURGE_LOG";
const DEFAULT_DIRECTIVE: &str = "purge=info";

/// Where diagnostics go.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum LogTarget {
    Stderr,
    File(PathBuf),
    Disabled,
}

impl LogTarget {
    /// A configured file always wins. Otherwise the console only gets logs
    /// when the terminal UI is not drawing over it.
    pub fn resolve(log_file: Option<&Path>, interactive: bool) -> Self {
        match log_file {
            Some(path) => LogTarget::File(path.to_path_buf()),
            None if interactive => LogTarget::Disabled,
            None => LogTarget::Stderr,
        }
    }
}

/// Installs the global subscriber. `PURGE_LOG` overrides the default filter.
pub fn init_logging(target: &LogTarget) -> Result<()> {
    let filter =
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVE));

    let installed = match target {
        LogTarget::Disabled => return Ok(()),
        LogTarget::Stderr => tracing_subscriber::fmt()
            .with_ansi(false)
            .with_env_filter(filter)
            .with_writer(io::stderr)
            .try_init(),
        LogTarget::File(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("failed to open log file {}", path.display()))?;
            tracing_subscriber::fmt()
                .with_ansi(false)
                .with_env_filter(filter)
                .with_writer(Mutex::new(file))
                .try_init()
        }
    };

    installed.map_err(|err| anyhow!("failed to install logger: {err}"))
}
