//! Docker registry mirrors.
//!
//! The daemon reads `registry-mirrors` from `daemon.json`. The file is
//! handled as an untyped JSON object so keys crosh does not know about
//! survive a rewrite. Docker Desktop on macOS keeps its engine settings in
//! its own UI, so for that host crosh only prints instructions.

use std::path::{Path, PathBuf};

use serde_json::{Map, Value};

use crate::domain::{AppError, MirrorKind, MirrorStatus, MirrorTarget, Result};
use crate::infrastructure::paths::DOCKER_DAEMON_PATH;
use crate::infrastructure::text_file::{read_bytes_optional, remove_if_exists, write_atomic};

const MIRRORS_KEY: &str = "registry-mirrors";
const DEFAULT_DESCRIPTION: &str = "default registry";
const MANUAL_DESCRIPTION: &str = "check Docker Desktop settings";
const DOCKER_DESKTOP_APP: &str = "/Applications/Docker.app";

/// Where the Docker engine takes its configuration from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DockerHost {
    /// A daemon reading `~/.docker/daemon.json`.
    Daemon,
    /// Docker Desktop, configured through its settings window.
    Desktop,
}

impl DockerHost {
    /// Detect Docker Desktop on macOS; everything else is a plain daemon.
    #[must_use]
    pub fn detect() -> Self {
        if cfg!(target_os = "macos") && Path::new(DOCKER_DESKTOP_APP).exists() {
            tracing::debug!("Docker Desktop detected at {DOCKER_DESKTOP_APP}");
            Self::Desktop
        } else {
            Self::Daemon
        }
    }
}

/// Manages `registry-mirrors` in the Docker daemon config.
pub struct DockerMirror {
    path: PathBuf,
    registries: Vec<String>,
    host: DockerHost,
}

impl DockerMirror {
    #[must_use]
    pub fn new(home: &Path, registries: Vec<String>, host: DockerHost) -> Self {
        Self {
            path: home.join(DOCKER_DAEMON_PATH),
            registries,
            host,
        }
    }

    /// Configured hosts as fully qualified URLs.
    #[must_use]
    pub fn normalized_registries(&self) -> Vec<String> {
        self.registries.iter().map(|r| normalize_registry(r)).collect()
    }

    /// Manual steps for Docker Desktop users to add the mirrors.
    #[must_use]
    pub fn enable_instructions(&self) -> String {
        let entries = self
            .normalized_registries()
            .iter()
            .map(|r| format!("    \"{r}\""))
            .collect::<Vec<_>>()
            .join(",\n");

        format!(
            "Docker Desktop detected!\n\
             Docker Desktop doesn't use ~/.docker/daemon.json.\n\
             Please configure registry mirrors manually:\n\n\
             1. Open Docker Desktop\n\
             2. Open Settings from the Docker menu\n\
             3. Go to the 'Docker Engine' tab\n\
             4. Add the following to the JSON configuration:\n\n\
             \x20 \"{MIRRORS_KEY}\": [\n{entries}\n  ]\n\n\
             5. Click 'Apply & Restart'\n"
        )
    }

    /// Manual steps for Docker Desktop users to remove the mirrors.
    #[must_use]
    pub fn disable_instructions() -> String {
        format!(
            "Docker Desktop detected!\n\
             To disable registry mirrors:\n\
             1. Open Docker Desktop -> Settings -> Docker Engine\n\
             2. Remove the '{MIRRORS_KEY}' section\n\
             3. Click 'Apply & Restart'\n"
        )
    }

    fn backup_path(&self) -> PathBuf {
        let mut name = self.path.as_os_str().to_owned();
        name.push(".backup");
        PathBuf::from(name)
    }

    /// Existing config for enable. Unreadable JSON is backed up, then dropped.
    fn load_for_enable(&self) -> Result<Map<String, Value>> {
        let Some(bytes) = read_bytes_optional(&self.path)? else {
            return Ok(Map::new());
        };

        match serde_json::from_slice::<Value>(&bytes) {
            Ok(Value::Object(map)) => Ok(map),
            _ => {
                let backup = self.backup_path();
                write_atomic(&backup, &bytes)?;
                tracing::warn!(
                    path = %self.path.display(),
                    backup = %backup.display(),
                    "Existing daemon.json is invalid, backed up"
                );
                Ok(Map::new())
            }
        }
    }

    /// Existing config for disable/status. Unreadable JSON is an error.
    fn load_strict(&self) -> Result<Option<Map<String, Value>>> {
        let Some(bytes) = read_bytes_optional(&self.path)? else {
            return Ok(None);
        };

        match serde_json::from_slice::<Value>(&bytes) {
            Ok(Value::Object(map)) => Ok(Some(map)),
            Ok(_) => Err(AppError::InvalidData {
                message: format!("{} is not a JSON object", self.path.display()),
            }),
            Err(e) => Err(AppError::json_parse(&self.path, e)),
        }
    }

    fn save(&self, config: &Map<String, Value>) -> Result<()> {
        let json = serde_json::to_string_pretty(config)
            .map_err(|e| AppError::json_parse(&self.path, e))?;
        write_atomic(&self.path, json.as_bytes())
    }
}

/// Prefix `https://` unless the host already carries a scheme.
fn normalize_registry(registry: &str) -> String {
    if registry.starts_with("http://") || registry.starts_with("https://") {
        registry.to_string()
    } else {
        format!("https://{registry}")
    }
}

fn display_registry(registry: &str) -> &str {
    registry
        .strip_prefix("https://")
        .or_else(|| registry.strip_prefix("http://"))
        .unwrap_or(registry)
}

impl MirrorTarget for DockerMirror {
    fn kind(&self) -> MirrorKind {
        MirrorKind::Docker
    }

    fn config_path(&self) -> Option<PathBuf> {
        match self.host {
            DockerHost::Daemon => Some(self.path.clone()),
            DockerHost::Desktop => None,
        }
    }

    fn enable(&self) -> Result<()> {
        if self.host == DockerHost::Desktop {
            println!("{}", self.enable_instructions());
            return Ok(());
        }

        if self.registries.is_empty() {
            return Err(AppError::Config {
                message: "No Docker registry mirrors configured".into(),
            });
        }

        let mut config = self.load_for_enable()?;
        let mirrors = self
            .normalized_registries()
            .into_iter()
            .map(Value::String)
            .collect();
        config.insert(MIRRORS_KEY.to_string(), Value::Array(mirrors));

        self.save(&config)?;
        tracing::info!(
            path = %self.path.display(),
            count = self.registries.len(),
            "Docker registry mirrors set"
        );
        Ok(())
    }

    fn disable(&self) -> Result<()> {
        if self.host == DockerHost::Desktop {
            println!("{}", Self::disable_instructions());
            return Ok(());
        }

        let Some(mut config) = self.load_strict()? else {
            return Ok(());
        };
        if config.remove(MIRRORS_KEY).is_none() {
            tracing::debug!(path = %self.path.display(), "No Docker registry mirrors configured");
            return Ok(());
        }

        if config.is_empty() {
            remove_if_exists(&self.path)
        } else {
            self.save(&config)
        }
    }

    fn status(&self) -> Result<MirrorStatus> {
        if self.host == DockerHost::Desktop {
            return Ok(MirrorStatus::manual(MirrorKind::Docker, MANUAL_DESCRIPTION));
        }

        let config = self.load_strict()?.unwrap_or_default();
        let mirrors: Vec<&str> = config
            .get(MIRRORS_KEY)
            .and_then(Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .filter_map(Value::as_str)
                    .map(display_registry)
                    .collect()
            })
            .unwrap_or_default();

        if mirrors.is_empty() {
            return Ok(MirrorStatus::disabled(MirrorKind::Docker, DEFAULT_DESCRIPTION));
        }
        Ok(MirrorStatus::enabled(MirrorKind::Docker, mirrors.join(", ")))
    }
}
