//! Go module proxy.
//!
//! `GOPROXY` has two homes: the environment of the running process, which
//! is what [`GoProxyMirror::status`] reports, and an `export` line in the
//! user's shell rc file, which only takes effect in new shells. Enable and
//! disable update both; status deliberately reads only the live value.
//!
//! Lines crosh appends are preceded by a sentinel comment so disable can
//! tell them apart from anything else in the rc file.

use std::path::{Path, PathBuf};

use crate::domain::{MirrorKind, MirrorStatus, MirrorTarget, Result};
use crate::infrastructure::paths::rc_file_for_shell;
use crate::infrastructure::text_file::{join_lines, read_optional, write_atomic};

const PROXY_VAR: &str = "GOPROXY";
const SENTINEL: &str = "# Added by crosh";
const DEFAULT_DESCRIPTION: &str = "default proxy";

/// Access to the environment of the current process.
pub trait SessionEnv {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str);
    fn remove(&self, key: &str);
}

impl<T: SessionEnv + ?Sized> SessionEnv for &T {
    fn get(&self, key: &str) -> Option<String> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) {
        (**self).set(key, value);
    }

    fn remove(&self, key: &str) {
        (**self).remove(key);
    }
}

/// The real process environment.
///
/// Changes last only as long as this process; child processes inherit them.
pub struct ProcessEnv;

impl SessionEnv for ProcessEnv {
    fn get(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }

    fn set(&self, key: &str, value: &str) {
        std::env::set_var(key, value);
    }

    fn remove(&self, key: &str) {
        std::env::remove_var(key);
    }
}

/// Manages `GOPROXY` for the session and in the shell rc file.
pub struct GoProxyMirror<E: SessionEnv> {
    rc_path: PathBuf,
    proxy_url: String,
    env: E,
}

impl<E: SessionEnv> GoProxyMirror<E> {
    /// `shell` is the login shell path or name, e.g. `/bin/zsh`.
    #[must_use]
    pub fn new(home: &Path, shell: &str, proxy_url: impl Into<String>, env: E) -> Self {
        Self {
            rc_path: home.join(rc_file_for_shell(shell)),
            proxy_url: proxy_url.into(),
            env,
        }
    }

    /// Command that applies the proxy to an already running shell.
    #[must_use]
    pub fn export_command(&self) -> String {
        export_line(&self.proxy_url)
    }
}

fn export_line(url: &str) -> String {
    format!("export {PROXY_VAR}={url}")
}

fn is_export_line(line: &str) -> bool {
    line.trim_start()
        .strip_prefix("export ")
        .is_some_and(|rest| rest.trim_start().starts_with(&format!("{PROXY_VAR}=")))
}

fn apply_export(content: &str, url: &str) -> String {
    let export = export_line(url);

    if content.lines().any(is_export_line) {
        let lines: Vec<String> = content
            .lines()
            .map(|line| {
                if is_export_line(line) {
                    export.clone()
                } else {
                    line.to_string()
                }
            })
            .collect();
        return join_lines(&lines);
    }

    let mut out = content.to_string();
    if !out.is_empty() {
        if !out.ends_with('\n') {
            out.push('\n');
        }
        out.push('\n');
    }
    out.push_str(SENTINEL);
    out.push('\n');
    out.push_str(&export);
    out.push('\n');
    out
}

/// Rc content without crosh's export block, or `None` if nothing to remove.
fn strip_export(content: &str) -> Option<String> {
    let mut out: Vec<String> = Vec::new();
    let mut found = false;

    for line in content.lines() {
        if line.trim() == SENTINEL {
            found = true;
            // blank separator written together with the sentinel
            if out.last().is_some_and(|l| l.trim().is_empty()) {
                out.pop();
            }
            continue;
        }
        if is_export_line(line) {
            found = true;
            continue;
        }
        out.push(line.to_string());
    }

    found.then(|| join_lines(&out))
}

impl<E: SessionEnv> MirrorTarget for GoProxyMirror<E> {
    fn kind(&self) -> MirrorKind {
        MirrorKind::Go
    }

    fn config_path(&self) -> Option<PathBuf> {
        Some(self.rc_path.clone())
    }

    fn enable(&self) -> Result<()> {
        let existing = read_optional(&self.rc_path)?.unwrap_or_default();
        let updated = apply_export(&existing, &self.proxy_url);

        if updated != existing {
            write_atomic(&self.rc_path, updated.as_bytes())?;
            tracing::info!(
                path = %self.rc_path.display(),
                proxy = %self.proxy_url,
                "GOPROXY persisted"
            );
        }

        self.env.set(PROXY_VAR, &self.proxy_url);
        Ok(())
    }

    fn disable(&self) -> Result<()> {
        if let Some(existing) = read_optional(&self.rc_path)? {
            if let Some(updated) = strip_export(&existing) {
                write_atomic(&self.rc_path, updated.as_bytes())?;
                tracing::info!(path = %self.rc_path.display(), "GOPROXY removed from shell rc");
            }
        }

        self.env.remove(PROXY_VAR);
        Ok(())
    }

    fn status(&self) -> Result<MirrorStatus> {
        Ok(match self.env.get(PROXY_VAR).filter(|v| !v.is_empty()) {
            Some(proxy) => MirrorStatus::enabled(MirrorKind::Go, proxy),
            None => MirrorStatus::disabled(MirrorKind::Go, DEFAULT_DESCRIPTION),
        })
    }
}
