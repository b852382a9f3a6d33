//! Home directory and shell discovery.
//!
//! Every managed file is rooted at the user's home directory; resolving it
//! is the first thing any command does, before any file is touched.

use std::path::PathBuf;

use crate::domain::{AppError, Result};

/// Relative locations of the managed files.
pub const NPMRC_PATH: &str = ".npmrc";
pub const PIP_CONFIG_PATH: &str = ".config/pip/pip.conf";
pub const CARGO_CONFIG_PATH: &str = ".cargo/config.toml";
pub const DOCKER_DAEMON_PATH: &str = ".docker/daemon.json";

/// Shell rc file used when the login shell is not recognized.
pub const DEFAULT_RC_FILE: &str = ".bashrc";

/// Resolves the user's home directory.
///
/// # Errors
/// Returns error if the home directory cannot be determined.
pub fn resolve_home() -> Result<PathBuf> {
    let home = dirs::home_dir().ok_or(AppError::HomeNotFound)?;
    tracing::debug!("Using home directory: {}", home.display());
    Ok(home)
}

/// The user's login shell as reported by `$SHELL`, or empty.
#[must_use]
pub fn login_shell() -> String {
    std::env::var("SHELL").unwrap_or_default()
}

/// Shell init file, relative to home, for the given shell name.
#[must_use]
pub fn rc_file_for_shell(shell: &str) -> &'static str {
    if shell.contains("zsh") {
        ".zshrc"
    } else if shell.contains("bash") {
        ".bashrc"
    } else {
        DEFAULT_RC_FILE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rc_file_for_shell() {
        assert_eq!(rc_file_for_shell("/bin/zsh"), ".zshrc");
        assert_eq!(rc_file_for_shell("/usr/local/bin/bash"), ".bashrc");
        assert_eq!(rc_file_for_shell("/usr/bin/fish"), ".bashrc");
        assert_eq!(rc_file_for_shell(""), ".bashrc");
    }
}
