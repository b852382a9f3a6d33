//! One mirror target per supported tool.
//!
//! The targets are independent: each owns one file format and never reads
//! another target's files.

pub mod cargo;
pub mod docker;
pub mod go_proxy;
pub mod npm;
pub mod pip;

pub use cargo::CargoMirror;
pub use docker::{DockerHost, DockerMirror};
pub use go_proxy::{GoProxyMirror, ProcessEnv, SessionEnv};
pub use npm::NpmMirror;
pub use pip::PipMirror;
