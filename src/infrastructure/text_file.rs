//! Whole-file text access shared by the mirror targets.
//!
//! Every target reads its file completely, transforms it in memory and
//! writes it back in one step. Writes go through a sibling temp file and a
//! rename so a failed write leaves the original untouched.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::domain::{AppError, Result};

/// Read a file, treating a missing file as `None`.
///
/// # Errors
/// Returns error for any failure other than the file being absent.
pub fn read_optional(path: &Path) -> Result<Option<String>> {
    match fs::read_to_string(path) {
        Ok(content) => Ok(Some(content)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(AppError::io(format!("Failed to read {}", path.display()), e)),
    }
}

/// Read raw bytes, treating a missing file as `None`.
///
/// # Errors
/// Returns error for any failure other than the file being absent.
pub fn read_bytes_optional(path: &Path) -> Result<Option<Vec<u8>>> {
    match fs::read(path) {
        Ok(bytes) => Ok(Some(bytes)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(AppError::io(format!("Failed to read {}", path.display()), e)),
    }
}

/// Replace a file's content atomically, creating parent directories.
///
/// # Errors
/// Returns error if the directory, temp file, or rename fails.
pub fn write_atomic(path: &Path, content: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| {
            AppError::io(format!("Failed to create directory {}", parent.display()), e)
        })?;
    }

    let temp_path = temp_sibling(path);
    fs::write(&temp_path, content)
        .map_err(|e| AppError::io(format!("Failed to write {}", temp_path.display()), e))?;

    if let Err(e) = fs::rename(&temp_path, path) {
        let _ = fs::remove_file(&temp_path);
        return Err(AppError::io(format!("Failed to replace {}", path.display()), e));
    }

    tracing::debug!(path = %path.display(), bytes = content.len(), "File written");
    Ok(())
}

/// Delete a file if it exists.
///
/// # Errors
/// Returns error if the file exists but cannot be removed.
pub fn remove_if_exists(path: &Path) -> Result<()> {
    match fs::remove_file(path) {
        Ok(()) => {
            tracing::info!(path = %path.display(), "Removed empty configuration file");
            Ok(())
        }
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
        Err(e) => Err(AppError::io(format!("Failed to remove {}", path.display()), e)),
    }
}

fn temp_sibling(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    path.with_file_name(format!(".{name}.{}.tmp", std::process::id()))
}

/// Join lines into file content with a trailing newline.
///
/// An empty slice yields an empty string.
#[must_use]
pub fn join_lines(lines: &[String]) -> String {
    if lines.is_empty() {
        return String::new();
    }
    let mut out = lines.join("\n");
    out.push('\n');
    out
}

/// Section name when the trimmed line is a `[header]` or `[[header]]`.
///
/// A trailing `#` or `;` comment after the closing bracket is allowed.
#[must_use]
pub fn section_header(line: &str) -> Option<&str> {
    let trimmed = line.trim();
    let (open, close) = if trimmed.starts_with("[[") {
        ("[[", "]]")
    } else {
        ("[", "]")
    };
    let rest = trimmed.strip_prefix(open)?;
    let end = rest.find(close)?;
    let trailing = rest[end + close.len()..].trim_start();
    if trailing.is_empty() || trailing.starts_with('#') || trailing.starts_with(';') {
        Some(rest[..end].trim())
    } else {
        None
    }
}

/// Key of a `key = value` or `key=value` line. Comments have no key.
#[must_use]
pub fn key_of(line: &str) -> Option<&str> {
    let trimmed = line.trim();
    if trimmed.starts_with('#') || trimmed.starts_with(';') {
        return None;
    }
    trimmed.split_once('=').map(|(key, _)| key.trim())
}

/// Value of a `key = value` line, trimmed.
#[must_use]
pub fn value_of(line: &str) -> Option<&str> {
    line.split_once('=').map(|(_, value)| value.trim())
}

/// Insert a line at the end of the section currently being built.
///
/// Blank lines trailing the section stay after the inserted line, so the
/// key lands next to the section's last entry rather than in front of the
/// next header.
pub fn insert_at_section_end(out: &mut Vec<String>, line: String) {
    let pos = out
        .iter()
        .rposition(|l| !l.trim().is_empty())
        .map_or(0, |i| i + 1);
    out.insert(pos, line);
}
