//! npm registry mirror.
//!
//! `.npmrc` is a flat list of `key=value` lines. Only `registry=` is
//! managed; blank lines are normalized away on every rewrite.

use std::path::{Path, PathBuf};

use crate::domain::{MirrorKind, MirrorStatus, MirrorTarget, Result};
use crate::infrastructure::paths::NPMRC_PATH;
use crate::infrastructure::text_file::{join_lines, read_optional, remove_if_exists, write_atomic};

const REGISTRY_PREFIX: &str = "registry=";
const DEFAULT_DESCRIPTION: &str = "default registry";

/// Manages the `registry=` line of `~/.npmrc`.
pub struct NpmMirror {
    path: PathBuf,
    registry_url: String,
}

impl NpmMirror {
    #[must_use]
    pub fn new(home: &Path, registry_url: impl Into<String>) -> Self {
        Self {
            path: home.join(NPMRC_PATH),
            registry_url: registry_url.into(),
        }
    }
}

fn is_registry_line(line: &str) -> bool {
    line.trim().starts_with(REGISTRY_PREFIX)
}

/// Point every `registry=` line at `url`, appending one if none exists.
fn apply_registry(content: &str, url: &str) -> String {
    let registry_line = format!("{REGISTRY_PREFIX}{url}");
    let mut replaced = false;
    let mut lines: Vec<String> = content
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| {
            if is_registry_line(line) {
                replaced = true;
                registry_line.clone()
            } else {
                line.to_string()
            }
        })
        .collect();

    if !replaced {
        lines.push(registry_line);
    }

    join_lines(&lines)
}

/// Remaining lines after dropping `registry=`, or `None` if nothing matched.
fn strip_registry(content: &str) -> Option<Vec<String>> {
    if !content.lines().any(is_registry_line) {
        return None;
    }

    Some(
        content
            .lines()
            .filter(|line| !line.trim().is_empty() && !is_registry_line(line))
            .map(String::from)
            .collect(),
    )
}

impl MirrorTarget for NpmMirror {
    fn kind(&self) -> MirrorKind {
        MirrorKind::Npm
    }

    fn config_path(&self) -> Option<PathBuf> {
        Some(self.path.clone())
    }

    fn enable(&self) -> Result<()> {
        let existing = read_optional(&self.path)?.unwrap_or_default();
        let updated = apply_registry(&existing, &self.registry_url);

        write_atomic(&self.path, updated.as_bytes())?;
        tracing::info!(
            path = %self.path.display(),
            registry = %self.registry_url,
            "npm registry set"
        );
        Ok(())
    }

    fn disable(&self) -> Result<()> {
        let Some(existing) = read_optional(&self.path)? else {
            return Ok(());
        };

        let Some(remaining) = strip_registry(&existing) else {
            tracing::debug!(path = %self.path.display(), "No npm registry configured");
            return Ok(());
        };

        if remaining.is_empty() {
            remove_if_exists(&self.path)
        } else {
            write_atomic(&self.path, join_lines(&remaining).as_bytes())
        }
    }

    fn status(&self) -> Result<MirrorStatus> {
        let content = read_optional(&self.path)?.unwrap_or_default();

        let registry = content
            .lines()
            .map(str::trim)
            .find_map(|line| line.strip_prefix(REGISTRY_PREFIX));

        Ok(match registry {
            Some(url) => MirrorStatus::enabled(MirrorKind::Npm, url),
            None => MirrorStatus::disabled(MirrorKind::Npm, DEFAULT_DESCRIPTION),
        })
    }
}
