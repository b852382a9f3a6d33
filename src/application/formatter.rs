//! Output formatting for mirror status and action results.
//!
//! Supports two output formats: a table for people and JSON for scripts.

use std::path::Path;

use colored::Colorize;
use comfy_table::{presets::UTF8_FULL, Table};
use serde::Serialize;

use super::ActionOutcome;
use crate::domain::{MirrorConfig, MirrorKind, MirrorState, MirrorStatus, Result};

/// Output format options.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Table for terminal use.
    #[default]
    Table,
    /// JSON format for programmatic use.
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "table" => Ok(Self::Table),
            "json" => Ok(Self::Json),
            _ => Err(format!("Unknown format: {s}. Use: table, json")),
        }
    }
}

fn state_label(state: MirrorState) -> String {
    match state {
        MirrorState::Enabled => "enabled".green().bold().to_string(),
        MirrorState::Disabled => "disabled".dimmed().to_string(),
        MirrorState::Manual => "manual".yellow().to_string(),
    }
}

/// Formats status results as a table.
pub fn format_status_table(rows: &[(MirrorKind, Result<MirrorStatus>)]) -> String {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(vec!["Tool", "State", "Mirror"]);

    for (kind, status) in rows {
        match status {
            Ok(status) => table.add_row(vec![
                status.kind.to_string(),
                state_label(status.state),
                status.description.clone(),
            ]),
            Err(e) => table.add_row(vec![
                kind.to_string(),
                "error".red().to_string(),
                e.to_string(),
            ]),
        };
    }

    table.to_string()
}

#[derive(Serialize)]
struct StatusRecord<'a> {
    kind: MirrorKind,
    enabled: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    state: Option<MirrorState>,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

/// Formats status results as JSON.
///
/// # Errors
/// Returns error if serialization fails.
pub fn format_status_json(
    rows: &[(MirrorKind, Result<MirrorStatus>)],
) -> std::result::Result<String, serde_json::Error> {
    let records: Vec<StatusRecord<'_>> = rows
        .iter()
        .map(|(kind, status)| match status {
            Ok(s) => StatusRecord {
                kind: s.kind,
                enabled: s.is_enabled(),
                state: Some(s.state),
                description: Some(s.description.as_str()),
                error: None,
            },
            Err(e) => StatusRecord {
                kind: *kind,
                enabled: false,
                state: None,
                description: None,
                error: Some(e.to_string()),
            },
        })
        .collect();

    serde_json::to_string_pretty(&records)
}

/// One line per action outcome.
pub fn format_outcome(outcome: &ActionOutcome) -> String {
    let target = outcome
        .path
        .as_deref()
        .map_or_else(String::new, |p| format!(" ({})", p.display()));

    match &outcome.result {
        Ok(()) => format!(
            "{} {} {}d{}",
            "✓".green().bold(),
            outcome.kind.to_string().cyan(),
            outcome.action,
            target.dimmed()
        ),
        Err(e) => format!(
            "{} {} failed to {}: {}",
            "✗".red().bold(),
            outcome.kind.to_string().cyan(),
            outcome.action,
            e
        ),
    }
}

/// Formats the preferences file location and its mirror values.
pub fn format_config(path: &Path, mirrors: &MirrorConfig) -> String {
    let mut out = format!("{} {}\n\n", "Config file:".bold(), path.display());

    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(vec!["Tool", "Mirror"]);
    for kind in MirrorKind::ALL {
        table.add_row(vec![kind.to_string(), mirrors.value_for(kind)]);
    }
    out.push_str(&table.to_string());

    let state = if mirrors.enabled { "on".green() } else { "off".dimmed() };
    out.push_str(&format!("\n\nMirrors last switched: {state}"));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::mirror_service::MirrorAction;
    use crate::domain::AppError;

    fn rows() -> Vec<(MirrorKind, Result<MirrorStatus>)> {
        vec![
            (
                MirrorKind::Npm,
                Ok(MirrorStatus::enabled(MirrorKind::Npm, "https://registry.npmmirror.com")),
            ),
            (
                MirrorKind::Docker,
                Err(AppError::InvalidData {
                    message: "bad".into(),
                }),
            ),
        ]
    }

    #[test]
    fn test_output_format_parse() {
        assert_eq!("JSON".parse::<OutputFormat>().unwrap(), OutputFormat::Json);
        assert_eq!("table".parse::<OutputFormat>().unwrap(), OutputFormat::Table);
        assert!("markdown".parse::<OutputFormat>().is_err());
    }

    #[test]
    fn test_status_table_lists_every_row() {
        colored::control::set_override(false);
        let table = format_status_table(&rows());
        assert!(table.contains("npm"));
        assert!(table.contains("https://registry.npmmirror.com"));
        assert!(table.contains("Invalid data: bad"));
    }

    #[test]
    fn test_status_json_shape() {
        let json: serde_json::Value =
            serde_json::from_str(&format_status_json(&rows()).unwrap()).unwrap();
        assert_eq!(json[0]["kind"], "npm");
        assert_eq!(json[0]["state"], "enabled");
        assert_eq!(json[0]["enabled"], true);
        assert_eq!(json[1]["kind"], "docker");
        assert_eq!(json[1]["error"], "Invalid data: bad");
        assert!(json[1].get("state").is_none());
    }

    #[test]
    fn test_format_outcome() {
        colored::control::set_override(false);
        let ok = ActionOutcome {
            kind: MirrorKind::Pip,
            action: MirrorAction::Enable,
            path: Some("/home/u/.config/pip/pip.conf".into()),
            result: Ok(()),
        };
        assert_eq!(format_outcome(&ok), "✓ pip enabled (/home/u/.config/pip/pip.conf)");

        let failed = ActionOutcome {
            kind: MirrorKind::Go,
            action: MirrorAction::Disable,
            path: None,
            result: Err(AppError::HomeNotFound),
        };
        assert_eq!(
            format_outcome(&failed),
            "✗ go failed to disable: Could not determine home directory"
        );
    }
}
