//! Domain layer - core types and the mirror target contract.
//!
//! This layer contains pure domain models and error types
//! without any file or process access.

pub mod error;
pub mod models;
pub mod settings;

pub use error::{AppError, Result};
pub use models::{MirrorKind, MirrorState, MirrorStatus, MirrorTarget};
pub use settings::{AppConfig, MirrorConfig};
