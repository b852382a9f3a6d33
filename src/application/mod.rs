//! Application layer - use cases and orchestration.
//!
//! This layer dispatches requests to the mirror targets and formats
//! their results.

pub mod formatter;
pub mod mirror_service;

pub use formatter::{
    format_config, format_outcome, format_status_json, format_status_table, OutputFormat,
};
pub use mirror_service::{ActionOutcome, MirrorAction, MirrorService};
