//! Cargo source replacement.
//!
//! Two linked tables in `~/.cargo/config.toml` make up the mirror:
//!
//! ```toml
//! [source.crates-io]
//! replace-with = 'ustc'
//!
//! [source.ustc]
//! registry = "https://mirrors.ustc.edu.cn/crates.io-index"
//! ```
//!
//! Everything outside those two tables, blank lines included, is kept as is.

use std::path::{Path, PathBuf};

use crate::domain::{MirrorKind, MirrorStatus, MirrorTarget, Result};
use crate::infrastructure::paths::CARGO_CONFIG_PATH;
use crate::infrastructure::text_file::{
    insert_at_section_end, join_lines, key_of, read_optional, remove_if_exists, section_header,
    value_of, write_atomic,
};

const CRATES_IO_SECTION: &str = "source.crates-io";
const MIRROR_SECTION: &str = "source.ustc";
const MIRROR_NAME: &str = "ustc";
const REPLACE_WITH_KEY: &str = "replace-with";
const REGISTRY_KEY: &str = "registry";
const DEFAULT_DESCRIPTION: &str = "default registry";

/// Manages the crates.io source replacement in cargo's user config.
pub struct CargoMirror {
    path: PathBuf,
    registry_url: String,
}

impl CargoMirror {
    #[must_use]
    pub fn new(home: &Path, registry_url: impl Into<String>) -> Self {
        Self {
            path: home.join(CARGO_CONFIG_PATH),
            registry_url: registry_url.into(),
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Scope {
    CratesIo,
    Mirror,
    Other,
}

impl Scope {
    fn of(name: &str) -> Self {
        match name {
            CRATES_IO_SECTION => Self::CratesIo,
            MIRROR_SECTION => Self::Mirror,
            _ => Self::Other,
        }
    }
}

fn replace_with_line() -> String {
    format!("{REPLACE_WITH_KEY} = '{MIRROR_NAME}'")
}

fn registry_line(url: &str) -> String {
    format!("{REGISTRY_KEY} = \"{url}\"")
}

/// Tracks which managed keys the scan has emitted.
struct Scan {
    out: Vec<String>,
    scope: Scope,
    has_crates_io: bool,
    has_mirror: bool,
    replace_written: bool,
    registry_written: bool,
}

impl Scan {
    /// Complete the section being left, inserting its managed key if absent.
    fn close_section(&mut self, registry: &str) {
        match self.scope {
            Scope::CratesIo if !self.replace_written => {
                insert_at_section_end(&mut self.out, replace_with_line());
                self.replace_written = true;
            }
            Scope::Mirror if !self.registry_written => {
                insert_at_section_end(&mut self.out, registry_line(registry));
                self.registry_written = true;
            }
            _ => {}
        }
    }
}

fn apply_source_replacement(content: &str, url: &str) -> String {
    let mut scan = Scan {
        out: Vec::new(),
        scope: Scope::Other,
        has_crates_io: false,
        has_mirror: false,
        replace_written: false,
        registry_written: false,
    };

    for line in content.lines() {
        if let Some(name) = section_header(line) {
            scan.close_section(url);
            scan.scope = Scope::of(name);
            match scan.scope {
                Scope::CratesIo => scan.has_crates_io = true,
                Scope::Mirror => scan.has_mirror = true,
                Scope::Other => {}
            }
            scan.out.push(line.to_string());
            continue;
        }

        match (scan.scope, key_of(line)) {
            (Scope::CratesIo, Some(REPLACE_WITH_KEY)) => {
                if !scan.replace_written {
                    scan.out.push(replace_with_line());
                    scan.replace_written = true;
                }
            }
            (Scope::Mirror, Some(REGISTRY_KEY)) => {
                if !scan.registry_written {
                    scan.out.push(registry_line(url));
                    scan.registry_written = true;
                }
            }
            _ => scan.out.push(line.to_string()),
        }
    }
    scan.close_section(url);

    let mut out = scan.out;
    if !scan.has_crates_io {
        push_block(&mut out, &[format!("[{CRATES_IO_SECTION}]"), replace_with_line()]);
    }
    if !scan.has_mirror {
        push_block(&mut out, &[format!("[{MIRROR_SECTION}]"), registry_line(url)]);
    }

    join_lines(&out)
}

/// Append a table, separated from preceding content by one blank line.
///
/// The separator is always added to non-empty content so that disable can
/// take back exactly one blank line.
fn push_block(out: &mut Vec<String>, block: &[String]) {
    if !out.is_empty() {
        out.push(String::new());
    }
    out.extend_from_slice(block);
}

/// Lines left after removing both managed tables, or `None` if neither exists.
fn strip_source_replacement(content: &str) -> Option<Vec<String>> {
    let mut out: Vec<String> = Vec::new();
    let mut skipping = false;
    let mut found = false;

    for line in content.lines() {
        if let Some(name) = section_header(line) {
            skipping = Scope::of(name) != Scope::Other;
            found |= skipping;
        }
        if !skipping {
            out.push(line.to_string());
        }
    }

    if !found {
        return None;
    }
    // Managed tables at the end of the file were appended after one separator
    if skipping && out.last().is_some_and(|l| l.trim().is_empty()) {
        out.pop();
    }
    Some(out)
}

/// A TOML string value without its quotes or any trailing comment.
fn unquote(value: &str) -> &str {
    let value = value.trim();
    match value.chars().next() {
        Some(quote @ ('"' | '\'')) => {
            let inner = &value[1..];
            inner.split_once(quote).map_or(inner, |(text, _)| text)
        }
        _ => value.split_once('#').map_or(value, |(text, _)| text).trim(),
    }
}

impl MirrorTarget for CargoMirror {
    fn kind(&self) -> MirrorKind {
        MirrorKind::Cargo
    }

    fn config_path(&self) -> Option<PathBuf> {
        Some(self.path.clone())
    }

    fn enable(&self) -> Result<()> {
        let existing = read_optional(&self.path)?.unwrap_or_default();
        let updated = apply_source_replacement(&existing, &self.registry_url);

        write_atomic(&self.path, updated.as_bytes())?;
        tracing::info!(
            path = %self.path.display(),
            registry = %self.registry_url,
            "cargo source replaced"
        );
        Ok(())
    }

    fn disable(&self) -> Result<()> {
        let Some(existing) = read_optional(&self.path)? else {
            return Ok(());
        };
        let Some(remaining) = strip_source_replacement(&existing) else {
            tracing::debug!(path = %self.path.display(), "No cargo source replacement configured");
            return Ok(());
        };

        if remaining.iter().all(|l| l.trim().is_empty()) {
            remove_if_exists(&self.path)
        } else {
            write_atomic(&self.path, join_lines(&remaining).as_bytes())
        }
    }

    fn status(&self) -> Result<MirrorStatus> {
        let content = read_optional(&self.path)?.unwrap_or_default();

        let mut scope = Scope::Other;
        let mut replaced = false;
        let mut registry = None;
        for line in content.lines() {
            if let Some(name) = section_header(line) {
                scope = Scope::of(name);
                continue;
            }
            match (scope, key_of(line)) {
                (Scope::CratesIo, Some(REPLACE_WITH_KEY)) => {
                    replaced = value_of(line).map(unquote) == Some(MIRROR_NAME);
                }
                (Scope::Mirror, Some(REGISTRY_KEY)) if registry.is_none() => {
                    registry = value_of(line).map(unquote);
                }
                _ => {}
            }
        }

        Ok(match registry {
            Some(url) if replaced => MirrorStatus::enabled(MirrorKind::Cargo, url),
            _ => MirrorStatus::disabled(MirrorKind::Cargo, DEFAULT_DESCRIPTION),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    const URL: &str = "https://mirrors.ustc.edu.cn/crates.io-index";

    fn config_path(home: &Path) -> PathBuf {
        home.join(".cargo/config.toml")
    }

    #[test]
    fn test_enable_appends_both_tables_after_existing_content() {
        let home = tempdir().unwrap();
        let path = config_path(home.path());
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "[build]\njobs = 4").unwrap();

        CargoMirror::new(home.path(), URL).enable().unwrap();

        let written = fs::read_to_string(&path).unwrap();
        assert_eq!(
            written,
            "[build]\njobs = 4\n\n[source.crates-io]\nreplace-with = 'ustc'\n\n[source.ustc]\nregistry = \"https://mirrors.ustc.edu.cn/crates.io-index\"\n"
        );
        let parsed: toml::Table = toml::from_str(&written).unwrap();
        assert_eq!(parsed["build"]["jobs"].as_integer(), Some(4));
        assert_eq!(parsed["source"]["ustc"]["registry"].as_str(), Some(URL));
    }

    #[test]
    fn test_enable_is_idempotent() {
        let once = apply_source_replacement("[build]\njobs = 4\n", URL);
        let twice = apply_source_replacement(&once, URL);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_enable_synthesizes_replace_with_before_next_header() {
        let updated = apply_source_replacement(
            "[source.crates-io]\n\n[source.ustc]\nregistry = \"https://old\"\n",
            URL,
        );
        assert_eq!(
            updated,
            format!("[source.crates-io]\nreplace-with = 'ustc'\n\n[source.ustc]\nregistry = \"{URL}\"\n")
        );
    }

    #[test]
    fn test_enable_overrides_foreign_replace_with() {
        let updated = apply_source_replacement(
            "[source.crates-io]\nreplace-with = 'tuna'\n\n[source.tuna]\nregistry = \"https://tuna\"\n",
            URL,
        );
        assert!(updated.contains("replace-with = 'ustc'\n"));
        assert!(updated.contains("[source.tuna]\nregistry = \"https://tuna\"\n"));
        assert!(updated.ends_with(&format!("\n\n[source.ustc]\nregistry = \"{URL}\"\n")));
        assert_eq!(updated.matches("[source.crates-io]").count(), 1);
    }

    #[test]
    fn test_enable_completes_trailing_crates_io_section() {
        let updated = apply_source_replacement("[source.crates-io]\n", URL);
        assert_eq!(
            updated,
            format!("[source.crates-io]\nreplace-with = 'ustc'\n\n[source.ustc]\nregistry = \"{URL}\"\n")
        );
    }

    #[test]
    fn test_enable_switches_mirror_url() {
        let once = apply_source_replacement("", "https://old-mirror");
        let switched = apply_source_replacement(&once, URL);
        assert_eq!(switched, apply_source_replacement("", URL));
    }

    #[test]
    fn test_round_trip_restores_original() {
        let home = tempdir().unwrap();
        let path = config_path(home.path());
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        let original = "[build]\njobs = 4\n\n[net]\nretry = 3\n";
        fs::write(&path, original).unwrap();
        let mirror = CargoMirror::new(home.path(), URL);

        mirror.enable().unwrap();
        mirror.disable().unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), original);
    }

    #[test]
    fn test_round_trip_keeps_user_trailing_blank_lines() {
        let home = tempdir().unwrap();
        let path = config_path(home.path());
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        let original = "[build]\njobs = 4\n\n";
        fs::write(&path, original).unwrap();
        let mirror = CargoMirror::new(home.path(), URL);

        mirror.enable().unwrap();
        mirror.enable().unwrap();
        mirror.disable().unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), original);
    }

    #[test]
    fn test_enable_recognizes_header_with_comment() {
        let updated = apply_source_replacement(
            "[source.crates-io] # mirror\nreplace-with = 'tuna'\n\n[source.tuna]\nregistry = \"https://t\"\n",
            URL,
        );

        assert_eq!(updated.matches("[source.crates-io]").count(), 1);
        let parsed: toml::Table = toml::from_str(&updated).unwrap();
        assert_eq!(
            parsed["source"]["crates-io"]["replace-with"].as_str(),
            Some("ustc")
        );
        assert_eq!(parsed["source"]["tuna"]["registry"].as_str(), Some("https://t"));
        assert_eq!(parsed["source"]["ustc"]["registry"].as_str(), Some(URL));
        assert_eq!(apply_source_replacement(&updated, URL), updated);
    }

    #[test]
    fn test_disable_removes_header_with_comment() {
        let remaining = strip_source_replacement(
            "[build]\njobs = 4\n\n[source.crates-io] # mirror\nreplace-with = 'ustc'\n",
        )
        .unwrap();
        assert_eq!(remaining, vec!["[build]", "jobs = 4"]);
    }

    #[test]
    fn test_status_ignores_trailing_comments() {
        let home = tempdir().unwrap();
        let path = config_path(home.path());
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(
            &path,
            format!(
                "[source.crates-io] # mirror\nreplace-with = 'ustc' # fast\n\n[source.ustc]\nregistry = \"{URL}\" # ustc\n"
            ),
        )
        .unwrap();

        let status = CargoMirror::new(home.path(), URL).status().unwrap();
        assert!(status.is_enabled());
        assert_eq!(status.description, URL);
    }

    #[test]
    fn test_round_trip_from_absent_file_removes_it() {
        let home = tempdir().unwrap();
        let mirror = CargoMirror::new(home.path(), URL);

        mirror.enable().unwrap();
        assert!(mirror.status().unwrap().is_enabled());
        mirror.disable().unwrap();

        assert!(!config_path(home.path()).exists());
        assert!(!mirror.status().unwrap().is_enabled());
    }

    #[test]
    fn test_disable_keeps_sections_between_managed_tables() {
        let remaining = strip_source_replacement(
            "[source.crates-io]\nreplace-with = 'ustc'\n\n[build]\njobs = 4\n\n[source.ustc]\nregistry = \"x\"\n",
        )
        .unwrap();
        assert_eq!(remaining, vec!["[build]", "jobs = 4"]);
    }

    #[test]
    fn test_disable_without_tables_is_noop() {
        assert!(strip_source_replacement("[build]\njobs = 4\n").is_none());
    }

    #[test]
    fn test_status_reports_registry() {
        let home = tempdir().unwrap();
        let mirror = CargoMirror::new(home.path(), URL);
        mirror.enable().unwrap();

        let status = mirror.status().unwrap();
        assert!(status.is_enabled());
        assert_eq!(status.description, URL);
    }

    #[test]
    fn test_status_disabled_when_crates_io_points_elsewhere() {
        let home = tempdir().unwrap();
        let path = config_path(home.path());
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(
            &path,
            "[source.crates-io]\nreplace-with = 'vendored'\n\n[source.ustc]\nregistry = \"x\"\n",
        )
        .unwrap();

        let status = CargoMirror::new(home.path(), URL).status().unwrap();
        assert!(!status.is_enabled());
        assert_eq!(status.description, "default registry");
    }
}
