//! Domain models for mirror targets.
//!
//! A mirror target is one external tool whose configuration crosh manages.
//! Every target answers the same three requests: enable, disable, status.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::Result;

/// The tools crosh knows how to point at a mirror.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum MirrorKind {
    /// npm registry (`~/.npmrc`).
    Npm,
    /// pip index (`~/.config/pip/pip.conf`).
    Pip,
    /// Cargo source replacement (`~/.cargo/config.toml`).
    Cargo,
    /// Docker daemon registry mirrors (`~/.docker/daemon.json`).
    Docker,
    /// Go module proxy (`GOPROXY` plus shell rc file).
    Go,
}

impl MirrorKind {
    /// All kinds, in display order.
    pub const ALL: [Self; 5] = [Self::Npm, Self::Pip, Self::Cargo, Self::Docker, Self::Go];

    /// Lowercase name used on the command line and in the preferences file.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Npm => "npm",
            Self::Pip => "pip",
            Self::Cargo => "cargo",
            Self::Docker => "docker",
            Self::Go => "go",
        }
    }
}

impl std::fmt::Display for MirrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether a mirror is active for a tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MirrorState {
    /// The managed setting is present.
    Enabled,
    /// The tool uses its default endpoint.
    Disabled,
    /// The setting lives somewhere crosh cannot read (Docker Desktop).
    Manual,
}

impl std::fmt::Display for MirrorState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Enabled => write!(f, "enabled"),
            Self::Disabled => write!(f, "disabled"),
            Self::Manual => write!(f, "manual"),
        }
    }
}

/// Result of a status query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MirrorStatus {
    /// Tool this status belongs to.
    pub kind: MirrorKind,
    /// Current state.
    pub state: MirrorState,
    /// Human-readable value: the mirror in use, or "default ..." when disabled.
    pub description: String,
}

impl MirrorStatus {
    /// A status reporting an active mirror.
    pub fn enabled(kind: MirrorKind, description: impl Into<String>) -> Self {
        Self {
            kind,
            state: MirrorState::Enabled,
            description: description.into(),
        }
    }

    /// A status reporting the tool's default endpoint.
    pub fn disabled(kind: MirrorKind, description: impl Into<String>) -> Self {
        Self {
            kind,
            state: MirrorState::Disabled,
            description: description.into(),
        }
    }

    /// A status that must be checked by hand.
    pub fn manual(kind: MirrorKind, description: impl Into<String>) -> Self {
        Self {
            kind,
            state: MirrorState::Manual,
            description: description.into(),
        }
    }

    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.state == MirrorState::Enabled
    }
}

/// A tool configuration that can be switched to and from a mirror.
///
/// Implementations are constructed with their target value(s) right before
/// a single call and hold no state between calls. Every call reads the
/// configuration fresh from disk.
pub trait MirrorTarget {
    /// Which tool this target manages.
    fn kind(&self) -> MirrorKind;

    /// File this target reads and writes, if any.
    fn config_path(&self) -> Option<PathBuf>;

    /// Apply the mirror setting. Running it twice yields the same file.
    ///
    /// # Errors
    /// Returns error if the configuration cannot be read or written.
    fn enable(&self) -> Result<()>;

    /// Remove the mirror setting. Succeeds without touching anything when
    /// the setting is absent.
    ///
    /// # Errors
    /// Returns error if the configuration cannot be read or written.
    fn disable(&self) -> Result<()>;

    /// Report the current setting without modifying anything.
    ///
    /// # Errors
    /// Returns error if the configuration exists but cannot be read.
    fn status(&self) -> Result<MirrorStatus>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_names_round_trip_through_serde() {
        for kind in MirrorKind::ALL {
            let json = serde_json::to_string(&kind).unwrap();
            assert_eq!(json, format!("\"{}\"", kind.as_str()));
            let back: MirrorKind = serde_json::from_str(&json).unwrap();
            assert_eq!(back, kind);
        }
    }

    #[test]
    fn test_status_constructors() {
        assert!(MirrorStatus::enabled(MirrorKind::Npm, "x").is_enabled());
        assert!(!MirrorStatus::disabled(MirrorKind::Npm, "default registry").is_enabled());
        assert!(!MirrorStatus::manual(MirrorKind::Docker, "check").is_enabled());
    }
}
