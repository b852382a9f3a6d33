//! pip index mirror.
//!
//! `pip.conf` is INI. The managed key `index-url` must live inside
//! `[global]`; a key placed after the next header would belong to another
//! section and pip would ignore it.

use std::path::{Path, PathBuf};

use crate::domain::{MirrorKind, MirrorStatus, MirrorTarget, Result};
use crate::infrastructure::paths::PIP_CONFIG_PATH;
use crate::infrastructure::text_file::{
    insert_at_section_end, join_lines, key_of, read_optional, remove_if_exists, section_header,
    value_of, write_atomic,
};

const GLOBAL_SECTION: &str = "global";
const INDEX_URL_KEY: &str = "index-url";
const DEFAULT_DESCRIPTION: &str = "default index";

/// Manages `index-url` in the `[global]` section of pip's user config.
pub struct PipMirror {
    path: PathBuf,
    index_url: String,
}

impl PipMirror {
    #[must_use]
    pub fn new(home: &Path, index_url: impl Into<String>) -> Self {
        Self {
            path: home.join(PIP_CONFIG_PATH),
            index_url: index_url.into(),
        }
    }
}

fn is_index_url(line: &str) -> bool {
    key_of(line) == Some(INDEX_URL_KEY)
}

fn apply_index_url(content: &str, url: &str) -> String {
    let index_line = format!("{INDEX_URL_KEY} = {url}");
    let mut out: Vec<String> = Vec::new();
    let mut has_global = false;
    let mut in_global = false;
    let mut written = false;

    for line in content.lines() {
        if let Some(name) = section_header(line) {
            if name == GLOBAL_SECTION {
                has_global = true;
                in_global = true;
            } else {
                if in_global && !written {
                    insert_at_section_end(&mut out, index_line.clone());
                    written = true;
                }
                in_global = false;
            }
            out.push(line.to_string());
            continue;
        }

        if in_global && is_index_url(line) {
            if !written {
                out.push(index_line.clone());
                written = true;
            }
            continue;
        }

        out.push(line.to_string());
    }

    if !has_global {
        out.push(format!("[{GLOBAL_SECTION}]"));
        out.push(index_line);
    } else if !written {
        // [global] was the last section
        insert_at_section_end(&mut out, index_line);
    }

    join_lines(&out)
}

/// Remaining lines after dropping every `index-url`, or `None` if none.
fn strip_index_url(content: &str) -> Option<Vec<String>> {
    if !content.lines().any(is_index_url) {
        return None;
    }
    Some(
        content
            .lines()
            .filter(|line| !is_index_url(line))
            .map(String::from)
            .collect(),
    )
}

/// True when only headers and blank lines are left.
fn is_logically_empty(lines: &[String]) -> bool {
    lines
        .iter()
        .all(|line| line.trim().is_empty() || section_header(line).is_some())
}

impl MirrorTarget for PipMirror {
    fn kind(&self) -> MirrorKind {
        MirrorKind::Pip
    }

    fn config_path(&self) -> Option<PathBuf> {
        Some(self.path.clone())
    }

    fn enable(&self) -> Result<()> {
        let existing = read_optional(&self.path)?.unwrap_or_default();
        let updated = apply_index_url(&existing, &self.index_url);

        write_atomic(&self.path, updated.as_bytes())?;
        tracing::info!(path = %self.path.display(), index_url = %self.index_url, "pip index set");
        Ok(())
    }

    fn disable(&self) -> Result<()> {
        let Some(existing) = read_optional(&self.path)? else {
            return Ok(());
        };
        let Some(remaining) = strip_index_url(&existing) else {
            tracing::debug!(path = %self.path.display(), "No pip index configured");
            return Ok(());
        };

        if is_logically_empty(&remaining) {
            remove_if_exists(&self.path)
        } else {
            write_atomic(&self.path, join_lines(&remaining).as_bytes())
        }
    }

    fn status(&self) -> Result<MirrorStatus> {
        let content = read_optional(&self.path)?.unwrap_or_default();

        let index_url = content
            .lines()
            .filter(|line| is_index_url(line))
            .find_map(value_of);

        Ok(match index_url {
            Some(url) => MirrorStatus::enabled(MirrorKind::Pip, url),
            None => MirrorStatus::disabled(MirrorKind::Pip, DEFAULT_DESCRIPTION),
        })
    }
}
