//! Log output for the client.
//!
//! The TUI owns the terminal, so logs go to a file instead of stderr.

use std::fs::{self, OpenOptions};
use std::path::Path;
use std::sync::Mutex;

use anyhow::Result;
use tracing_subscriber::EnvFilter;

/// Install a global subscriber appending to `path`.
///
/// `RUST_LOG` takes precedence over `fallback_level`. Calling this twice is
/// harmless; the second subscriber is ignored.
pub fn init_file_logging(path: &Path, fallback_level: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let file = OpenOptions::new().create(true).append(true).open(path)?;

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(fallback_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .try_init();

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_creates_missing_log_directory() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("logs").join("ragchat.log");

        init_file_logging(&path, "debug").unwrap();
        tracing::info!("hello from the test");

        assert!(path.exists());
    }
}
