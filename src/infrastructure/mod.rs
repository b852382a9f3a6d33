//! Infrastructure layer - external adapters (filesystem, environment).
//!
//! This layer handles all I/O operations and external dependencies.

pub mod config;
pub mod mirrors;
pub mod paths;
pub mod text_file;

pub use config::{ensure_config_exists, load_config, save_config};
pub use mirrors::{
    CargoMirror, DockerHost, DockerMirror, GoProxyMirror, NpmMirror, PipMirror, ProcessEnv,
    SessionEnv,
};
pub use paths::{login_shell, resolve_home};
