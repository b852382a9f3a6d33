//! User preferences for crosh.
//!
//! Holds the mirror endpoint chosen for each tool. Stored as TOML under
//! the crosh data directory.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::{AppError, MirrorKind, Result};

/// Mirror endpoints, one per tool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MirrorConfig {
    /// npm registry URL.
    #[serde(default = "default_npm")]
    pub npm: String,

    /// pip index URL.
    #[serde(default = "default_pip")]
    pub pip: String,

    /// Cargo crates.io index mirror URL.
    #[serde(default = "default_cargo")]
    pub cargo: String,

    /// Value written to `GOPROXY`.
    #[serde(default = "default_go")]
    pub go: String,

    /// Docker registry mirror hosts, with or without scheme.
    #[serde(default = "default_docker")]
    pub docker: Vec<String>,

    /// Whether the last bulk enable/disable left mirrors on.
    #[serde(default)]
    pub enabled: bool,
}

impl Default for MirrorConfig {
    fn default() -> Self {
        Self {
            npm: default_npm(),
            pip: default_pip(),
            cargo: default_cargo(),
            go: default_go(),
            docker: default_docker(),
            enabled: false,
        }
    }
}

fn default_npm() -> String {
    "https://registry.npmmirror.com".into()
}

fn default_pip() -> String {
    "https://mirrors.aliyun.com/pypi/simple/".into()
}

fn default_cargo() -> String {
    "https://mirrors.ustc.edu.cn/crates.io-index".into()
}

fn default_go() -> String {
    "https://goproxy.cn,direct".into()
}

fn default_docker() -> Vec<String> {
    vec!["docker.1ms.run".into(), "docker.m.daocloud.io".into()]
}

impl MirrorConfig {
    /// Display form of the configured value for a tool.
    #[must_use]
    pub fn value_for(&self, kind: MirrorKind) -> String {
        match kind {
            MirrorKind::Npm => self.npm.clone(),
            MirrorKind::Pip => self.pip.clone(),
            MirrorKind::Cargo => self.cargo.clone(),
            MirrorKind::Go => self.go.clone(),
            MirrorKind::Docker => self.docker.join(", "),
        }
    }

    /// Replace the configured value for a tool.
    ///
    /// Docker accepts a comma-separated list of hosts.
    ///
    /// # Errors
    /// Returns error if the value is empty.
    pub fn set(&mut self, kind: MirrorKind, value: &str) -> Result<()> {
        let value = value.trim();
        if value.is_empty() {
            return Err(AppError::InvalidData {
                message: format!("Mirror value for {kind} must not be empty"),
            });
        }

        match kind {
            MirrorKind::Npm => self.npm = value.to_string(),
            MirrorKind::Pip => self.pip = value.to_string(),
            MirrorKind::Cargo => self.cargo = value.to_string(),
            MirrorKind::Go => self.go = value.to_string(),
            MirrorKind::Docker => {
                self.docker = value
                    .split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(String::from)
                    .collect();
            }
        }
        Ok(())
    }
}

/// Complete application configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Mirror endpoints.
    #[serde(default)]
    pub mirror: MirrorConfig,
}

impl AppConfig {
    /// Data directory under the given home directory.
    #[must_use]
    pub fn data_dir(home: &Path) -> PathBuf {
        home.join(".crosh")
    }

    /// Preferences file under the given home directory.
    #[must_use]
    pub fn config_file_path(home: &Path) -> PathBuf {
        Self::data_dir(home).join("config.toml")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_fields_fall_back_to_defaults() {
        let config: AppConfig =
            toml::from_str("[mirror]\nnpm = \"https://example.com\"\n").unwrap();
        assert_eq!(config.mirror.npm, "https://example.com");
        assert_eq!(config.mirror.pip, default_pip());
        assert_eq!(config.mirror.docker.len(), 2);
        assert!(!config.mirror.enabled);
    }

    #[test]
    fn test_set_docker_splits_hosts() {
        let mut mirror = MirrorConfig::default();
        mirror
            .set(MirrorKind::Docker, " a.example.com , ,https://b.example.com")
            .unwrap();
        assert_eq!(mirror.docker, vec!["a.example.com", "https://b.example.com"]);
        assert_eq!(
            mirror.value_for(MirrorKind::Docker),
            "a.example.com, https://b.example.com"
        );
    }

    #[test]
    fn test_set_rejects_empty_value() {
        let mut mirror = MirrorConfig::default();
        assert!(mirror.set(MirrorKind::Go, "   ").is_err());
        assert_eq!(mirror.go, default_go());
    }

    #[test]
    fn test_config_file_path_is_under_data_dir() {
        let path = AppConfig::config_file_path(Path::new("/home/u"));
        assert_eq!(path, PathBuf::from("/home/u/.crosh/config.toml"));
    }
}
