//! CLI configuration utilities

use anyhow::{Context, Result};
use collab_core::{ClientConfig, StateDir};
use std::path::{Path, PathBuf};
use tracing::info;

/// Load the client configuration
///
/// An explicit path must exist. Otherwise the state directory's config file
/// is used when present, and defaults plus environment variables when not.
pub fn load_client_config(path: Option<PathBuf>, state_dir: &StateDir) -> Result<ClientConfig> {
    let path = match path {
        Some(path) => {
            if !path.exists() {
                anyhow::bail!("Configuration file not found: {}", path.display());
            }
            Some(path)
        }
        None => Some(state_dir.config_path()).filter(|path| path.exists()),
    };

    match &path {
        Some(path) => info!("Loading configuration from: {}", path.display()),
        None => info!("Using default configuration with environment overrides"),
    }

    ClientConfig::load(path.as_deref()).context("Invalid client configuration")
}

/// Save client configuration to JSON file
pub fn save_client_config(config: &ClientConfig, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let content = serde_json::to_string_pretty(config)?;
    std::fs::write(path, content)?;
    Ok(())
}

/// Generate a default configuration file
pub fn generate_default_config(path: &Path) -> Result<()> {
    save_client_config(&ClientConfig::default(), path)
}
