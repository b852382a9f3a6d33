//! CLI interface using clap.
//!
//! Provides command-line arguments and subcommands for the tool.

use clap::{Parser, Subcommand};

use crate::application::OutputFormat;
use crate::domain::MirrorKind;

/// crosh - Switch package managers between default registries and mirrors.
#[derive(Parser, Debug)]
#[command(name = "crosh")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose logging (use multiple times for more verbosity).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show which tools currently use a mirror.
    Status {
        /// Tools to check (all if not specified).
        #[arg(value_enum)]
        tools: Vec<MirrorKind>,

        /// Output format: table or json.
        #[arg(short, long, default_value = "table")]
        format: String,
    },

    /// Point tools at their configured mirrors.
    Enable {
        /// Tools to switch (all if not specified).
        #[arg(value_enum)]
        tools: Vec<MirrorKind>,
    },

    /// Restore tools to their default registries.
    Disable {
        /// Tools to switch (all if not specified).
        #[arg(value_enum)]
        tools: Vec<MirrorKind>,
    },

    /// Inspect or edit the crosh configuration file.
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show the configuration file path and mirror values.
    Show,

    /// Write a commented default configuration file if none exists.
    Init,

    /// Set the mirror used for one tool.
    Set {
        /// Tool to configure.
        #[arg(value_enum)]
        tool: MirrorKind,

        /// Mirror URL (for docker, a comma-separated list of hosts).
        value: String,
    },
}

/// Requested tools, or every tool when none were named.
#[must_use]
pub fn selected_tools(tools: &[MirrorKind]) -> Vec<MirrorKind> {
    if tools.is_empty() {
        MirrorKind::ALL.to_vec()
    } else {
        tools.to_vec()
    }
}

impl Commands {
    /// Parse the output format argument of `status`.
    pub fn output_format(&self) -> Result<OutputFormat, String> {
        match self {
            Self::Status { format, .. } => format.parse(),
            _ => Ok(OutputFormat::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_enable_with_tools() {
        let cli = Cli::parse_from(["crosh", "enable", "npm", "cargo"]);
        match cli.command {
            Commands::Enable { tools } => {
                assert_eq!(tools, vec![MirrorKind::Npm, MirrorKind::Cargo]);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_status_json() {
        let cli = Cli::parse_from(["crosh", "-v", "status", "--format", "json"]);
        assert_eq!(cli.verbose, 1);
        assert_eq!(cli.command.output_format().unwrap(), OutputFormat::Json);
    }

    #[test]
    fn test_parse_config_set() {
        let cli = Cli::parse_from(["crosh", "config", "set", "docker", "a.io,b.io"]);
        match cli.command {
            Commands::Config {
                action: ConfigAction::Set { tool, value },
            } => {
                assert_eq!(tool, MirrorKind::Docker);
                assert_eq!(value, "a.io,b.io");
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_unknown_tool_is_rejected() {
        assert!(Cli::try_parse_from(["crosh", "enable", "apt"]).is_err());
    }

    #[test]
    fn test_selected_tools_defaults_to_all() {
        assert_eq!(selected_tools(&[]), MirrorKind::ALL.to_vec());
        assert_eq!(selected_tools(&[MirrorKind::Go]), vec![MirrorKind::Go]);
    }
}
