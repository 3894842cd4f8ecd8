use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::record::Millis;

const APP_DIR: &str = "surveillance-tui";

pub fn log_path() -> Result<PathBuf> {
    scoped_path("surveillance-tui.log")
}

pub fn theme_path() -> Result<PathBuf> {
    scoped_path("theme.json")
}

pub fn recordings_dir() -> Result<PathBuf> {
    scoped_path("recordings")
}

#[must_use]
pub fn now_millis() -> Millis {
    let elapsed = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis();
    Millis::try_from(elapsed).unwrap_or(Millis::MAX)
}

pub fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed creating data directory {}", parent.display()))?;
    }
    Ok(())
}

fn data_root() -> Result<PathBuf> {
    dirs::data_local_dir()
        .or_else(dirs::home_dir)
        .context("unable to determine user data directory")
}

fn scoped_path(file: &str) -> Result<PathBuf> {
    Ok(data_root()?.join(APP_DIR).join(file))
}
