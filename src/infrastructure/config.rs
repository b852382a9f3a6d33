//! Configuration file management.
//!
//! Handles loading and saving the crosh preferences file.

use std::fs;
use std::path::Path;

use crate::domain::{AppConfig, AppError, Result};

/// Default configuration file content.
const DEFAULT_CONFIG: &str = r#"# crosh configuration
# Auto-generated - edit as needed

[mirror]
# npm registry written to ~/.npmrc
npm = "https://registry.npmmirror.com"

# pip index written to ~/.config/pip/pip.conf
pip = "https://mirrors.aliyun.com/pypi/simple/"

# crates.io index mirror written to ~/.cargo/config.toml
cargo = "https://mirrors.ustc.edu.cn/crates.io-index"

# GOPROXY value exported from your shell rc file
go = "https://goproxy.cn,direct"

# Docker registry mirrors written to ~/.docker/daemon.json
docker = ["docker.1ms.run", "docker.m.daocloud.io"]

# Set by `crosh enable` / `crosh disable` when run for all tools
enabled = false
"#;

/// Load configuration from file or fall back to defaults.
///
/// # Errors
/// Returns error if file exists but cannot be read or parsed.
pub fn load_config(home: &Path) -> Result<AppConfig> {
    let config_path = AppConfig::config_file_path(home);

    if config_path.exists() {
        load_config_from_file(&config_path)
    } else {
        tracing::debug!(path = %config_path.display(), "No config file, using defaults");
        Ok(AppConfig::default())
    }
}

/// Load configuration from a specific file.
///
/// # Errors
/// Returns error if file cannot be read or parsed.
pub fn load_config_from_file(path: &Path) -> Result<AppConfig> {
    let content = fs::read_to_string(path)
        .map_err(|e| AppError::io(format!("Failed to read config file: {}", path.display()), e))?;

    toml::from_str(&content).map_err(|e| AppError::Config {
        message: format!("Failed to parse config file {}: {e}", path.display()),
    })
}

/// Save configuration to file.
///
/// # Errors
/// Returns error if file cannot be written.
pub fn save_config(home: &Path, config: &AppConfig) -> Result<()> {
    let config_path = AppConfig::config_file_path(home);

    if let Some(parent) = config_path.parent() {
        fs::create_dir_all(parent)
            .map_err(|e| AppError::io("Failed to create config directory", e))?;
    }

    let content = toml::to_string_pretty(config).map_err(|e| AppError::Config {
        message: format!("Failed to serialize config: {e}"),
    })?;

    fs::write(&config_path, content).map_err(|e| {
        AppError::io(format!("Failed to write config file: {}", config_path.display()), e)
    })?;

    tracing::info!(path = %config_path.display(), "Configuration saved");

    Ok(())
}

/// Create default configuration file if it doesn't exist.
///
/// Returns whether a file was created.
///
/// # Errors
/// Returns error if file cannot be created.
pub fn ensure_config_exists(home: &Path) -> Result<bool> {
    let config_path = AppConfig::config_file_path(home);

    if config_path.exists() {
        return Ok(false);
    }

    if let Some(parent) = config_path.parent() {
        fs::create_dir_all(parent)
            .map_err(|e| AppError::io("Failed to create config directory", e))?;
    }

    fs::write(&config_path, DEFAULT_CONFIG)
        .map_err(|e| AppError::io("Failed to create default config", e))?;

    tracing::info!(path = %config_path.display(), "Created default configuration");

    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::MirrorKind;
    use tempfile::tempdir;

    #[test]
    fn test_default_config_parses() {
        let config: AppConfig = toml::from_str(DEFAULT_CONFIG).unwrap();
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn test_load_missing_returns_defaults() {
        let home = tempdir().unwrap();
        assert_eq!(load_config(home.path()).unwrap(), AppConfig::default());
    }

    #[test]
    fn test_save_and_load() {
        let home = tempdir().unwrap();

        let mut config = AppConfig::default();
        config.mirror.set(MirrorKind::Npm, "https://npm.example.com").unwrap();
        config.mirror.enabled = true;

        save_config(home.path(), &config).unwrap();
        let loaded = load_config(home.path()).unwrap();

        assert_eq!(loaded, config);
    }

    #[test]
    fn test_ensure_config_exists_only_once() {
        let home = tempdir().unwrap();

        assert!(ensure_config_exists(home.path()).unwrap());
        assert!(!ensure_config_exists(home.path()).unwrap());
        assert!(home.path().join(".crosh/config.toml").exists());
    }

    #[test]
    fn test_invalid_config_is_an_error() {
        let home = tempdir().unwrap();
        let path = AppConfig::config_file_path(home.path());
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "[mirror\nnpm = ").unwrap();

        assert!(matches!(load_config(home.path()), Err(AppError::Config { .. })));
    }
}
