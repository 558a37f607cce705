use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{anyhow, Result};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const DEFAULT_FILTER: &str = "chatpane=info,chatpane_core=info";
/// One-shot output shares stderr with the user, so only problems are shown
const ONESHOT_FILTER: &str = "warn";

/// `RUST_LOG` wins over the built-in directives
fn env_filter(default: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| default.into())
}

/// `<data dir>/chatpane/chatpane.log`
pub fn default_log_path() -> Result<PathBuf> {
    let data_dir = dirs::data_local_dir()
        .ok_or_else(|| anyhow!("Could not determine data directory"))?;

    Ok(data_dir.join("chatpane").join("chatpane.log"))
}

/// Log to a file. The interactive UI owns the terminal, so nothing may go to
/// stdout or stderr while it runs.
pub fn init_file(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let file = OpenOptions::new().create(true).append(true).open(path)?;

    tracing_subscriber::registry()
        .with(env_filter(DEFAULT_FILTER))
        .with(fmt::layer().with_writer(Mutex::new(file)).with_ansi(false))
        .try_init()?;
    Ok(())
}

/// Log to stderr, for the one-shot commands
pub fn init_stderr() -> Result<()> {
    tracing_subscriber::registry()
        .with(env_filter(ONESHOT_FILTER))
        .with(fmt::layer().with_writer(std::io::stderr))
        .try_init()?;
    Ok(())
}
