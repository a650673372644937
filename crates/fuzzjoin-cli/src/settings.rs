//! The user configuration file.
//!
//! Holds a [`JoinConfig`] in TOML. The file lives in the platform config
//! directory (`~/.config/fuzzjoin/config.toml` on Linux) and is written with
//! the defaults the first time it is needed.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use fuzzjoin_match::JoinConfig;

pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Get the default config file path.
pub fn default_config_path() -> PathBuf {
    directories::ProjectDirs::from("", "", "fuzzjoin")
        .map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
        .unwrap_or_else(|| PathBuf::from(CONFIG_FILE_NAME))
}

/// Load a config file. Absent fields take their defaults.
pub fn load_from(path: &Path) -> Result<JoinConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("read config: {}", path.display()))?;
    JoinConfig::from_toml_str(&content).with_context(|| format!("parse config: {}", path.display()))
}

/// Write a config file, creating parent directories.
pub fn save_to(config: &JoinConfig, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create config directory: {}", parent.display()))?;
    }
    let content = config.to_toml_string()?;
    std::fs::write(path, content).with_context(|| format!("write config: {}", path.display()))
}

/// Load a config file, first writing the defaults if it does not exist.
pub fn load_or_init(path: &Path) -> Result<JoinConfig> {
    if !path.exists() {
        save_to(&JoinConfig::default(), path)?;
        tracing::info!(path = %path.display(), "Created default config");
    }
    load_from(path)
}

/// Write the defaults. Refuses to replace an existing file unless `force`.
pub fn init(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        bail!(
            "config file already exists: {} (use --force to overwrite)",
            path.display()
        );
    }
    save_to(&JoinConfig::default(), path)
}
