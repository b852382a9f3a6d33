//! Mirror dispatch service.
//!
//! Builds the mirror target for each requested tool from the user's
//! preferences and runs one request against each of them. A failure on
//! one tool does not stop the others.

use std::path::{Path, PathBuf};

use crate::domain::{MirrorConfig, MirrorKind, MirrorStatus, MirrorTarget, Result};
use crate::infrastructure::{
    CargoMirror, DockerHost, DockerMirror, GoProxyMirror, NpmMirror, PipMirror, SessionEnv,
};

/// A state-changing request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MirrorAction {
    Enable,
    Disable,
}

impl std::fmt::Display for MirrorAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Enable => write!(f, "enable"),
            Self::Disable => write!(f, "disable"),
        }
    }
}

/// Result of running an action against one tool.
#[derive(Debug)]
pub struct ActionOutcome {
    pub kind: MirrorKind,
    pub action: MirrorAction,
    /// File the target manages, if it has one.
    pub path: Option<PathBuf>,
    pub result: Result<()>,
}

impl ActionOutcome {
    #[must_use]
    pub const fn is_ok(&self) -> bool {
        self.result.is_ok()
    }
}

/// Runs enable/disable/status requests against mirror targets.
pub struct MirrorService<E: SessionEnv> {
    home: PathBuf,
    shell: String,
    mirrors: MirrorConfig,
    docker_host: DockerHost,
    env: E,
}

impl<E: SessionEnv> MirrorService<E> {
    /// Create a service rooted at `home`.
    #[must_use]
    pub fn new(
        home: &Path,
        shell: impl Into<String>,
        mirrors: MirrorConfig,
        docker_host: DockerHost,
        env: E,
    ) -> Self {
        Self {
            home: home.to_path_buf(),
            shell: shell.into(),
            mirrors,
            docker_host,
            env,
        }
    }

    /// Build the target for one tool.
    #[must_use]
    pub fn target(&self, kind: MirrorKind) -> Box<dyn MirrorTarget + '_> {
        let home = self.home.as_path();
        match kind {
            MirrorKind::Npm => Box::new(NpmMirror::new(home, self.mirrors.npm.clone())),
            MirrorKind::Pip => Box::new(PipMirror::new(home, self.mirrors.pip.clone())),
            MirrorKind::Cargo => Box::new(CargoMirror::new(home, self.mirrors.cargo.clone())),
            MirrorKind::Docker => Box::new(DockerMirror::new(
                home,
                self.mirrors.docker.clone(),
                self.docker_host,
            )),
            MirrorKind::Go => Box::new(self.go_proxy()),
        }
    }

    /// The Go target, exposed for its shell hint.
    #[must_use]
    pub fn go_proxy(&self) -> GoProxyMirror<&E> {
        GoProxyMirror::new(&self.home, &self.shell, self.mirrors.go.clone(), &self.env)
    }

    /// Run an action against each tool, in order.
    pub fn run(&self, action: MirrorAction, kinds: &[MirrorKind]) -> Vec<ActionOutcome> {
        kinds
            .iter()
            .map(|&kind| {
                let target = self.target(kind);
                tracing::debug!(%kind, %action, "Running mirror action");

                let result = match action {
                    MirrorAction::Enable => target.enable(),
                    MirrorAction::Disable => target.disable(),
                };
                if let Err(ref e) = result {
                    tracing::warn!(%kind, %action, error = %e, "Mirror action failed");
                }

                ActionOutcome {
                    kind: target.kind(),
                    action,
                    path: target.config_path(),
                    result,
                }
            })
            .collect()
    }

    /// Query each tool's status, in order.
    pub fn status(&self, kinds: &[MirrorKind]) -> Vec<(MirrorKind, Result<MirrorStatus>)> {
        kinds
            .iter()
            .map(|&kind| (kind, self.target(kind).status()))
            .collect()
    }
}
