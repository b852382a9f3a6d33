//! crosh - Switch package managers between default registries and mirrors.
//!
//! Manages the mirror settings of npm, pip, cargo, Docker and Go in each
//! tool's own configuration file, leaving everything else in those files
//! untouched.
//!
//!   crosh status                  # Which tools use a mirror right now
//!   crosh enable                  # Switch every tool to its mirror
//!   crosh disable npm pip         # Restore the default registry for some
//!   crosh config set go <url>     # Change the mirror used for a tool

mod application;
mod cli;
mod domain;
mod infrastructure;

use std::path::Path;

use clap::Parser;
use colored::Colorize;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use application::{
    format_config, format_outcome, format_status_json, format_status_table, MirrorAction,
    MirrorService, OutputFormat,
};
use cli::{selected_tools, Cli, Commands, ConfigAction};
use domain::{AppConfig, MirrorKind};
use infrastructure::{
    ensure_config_exists, load_config, login_shell, resolve_home, save_config, DockerHost,
    ProcessEnv,
};

fn main() {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("{} {}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}

/// Main application logic.
fn run(cli: Cli) -> domain::Result<()> {
    let format = cli
        .command
        .output_format()
        .map_err(|e| domain::AppError::Config { message: e })?;

    let home = resolve_home()?;

    match cli.command {
        Commands::Status { tools, .. } => cmd_status(&home, &tools, format)?,
        Commands::Enable { tools } => cmd_switch(&home, &tools, MirrorAction::Enable)?,
        Commands::Disable { tools } => cmd_switch(&home, &tools, MirrorAction::Disable)?,
        Commands::Config { action } => cmd_config(&home, action)?,
    }

    Ok(())
}

fn service(home: &Path) -> domain::Result<MirrorService<ProcessEnv>> {
    let config = load_config(home)?;
    Ok(MirrorService::new(
        home,
        login_shell(),
        config.mirror,
        DockerHost::detect(),
        ProcessEnv,
    ))
}

/// Show mirror status command.
fn cmd_status(home: &Path, tools: &[MirrorKind], format: OutputFormat) -> domain::Result<()> {
    let rows = service(home)?.status(&selected_tools(tools));

    let output = match format {
        OutputFormat::Table => format_status_table(&rows),
        OutputFormat::Json => format_status_json(&rows).map_err(|e| domain::AppError::Config {
            message: format!("Failed to serialize status: {e}"),
        })?,
    };

    println!("{output}");
    Ok(())
}

/// Enable or disable mirrors command.
fn cmd_switch(home: &Path, tools: &[MirrorKind], action: MirrorAction) -> domain::Result<()> {
    let kinds = selected_tools(tools);
    let svc = service(home)?;
    let outcomes = svc.run(action, &kinds);

    for outcome in &outcomes {
        println!("{}", format_outcome(outcome));
    }

    if action == MirrorAction::Enable
        && outcomes.iter().any(|o| o.kind == MirrorKind::Go && o.is_ok())
    {
        println!();
        println!("💡 To use the Go proxy in this shell, run:");
        println!("   {}", svc.go_proxy().export_command().cyan());
    }

    let failed = outcomes.iter().filter(|o| !o.is_ok()).count();
    if failed > 0 {
        return Err(domain::AppError::Config {
            message: format!("{failed} of {} tool(s) failed to {action}", outcomes.len()),
        });
    }

    // Only a full switch says something about "all mirrors"
    if tools.is_empty() {
        let mut config = load_config(home)?;
        config.mirror.enabled = action == MirrorAction::Enable;
        save_config(home, &config)?;
    }

    Ok(())
}

/// Configuration file commands.
fn cmd_config(home: &Path, action: ConfigAction) -> domain::Result<()> {
    let path = AppConfig::config_file_path(home);

    match action {
        ConfigAction::Show => {
            let config = load_config(home)?;
            println!("{}", format_config(&path, &config.mirror));
        }
        ConfigAction::Init => {
            if ensure_config_exists(home)? {
                println!("{} Created {}", "✓".green().bold(), path.display());
            } else {
                println!("Config already exists at {}", path.display());
            }
        }
        ConfigAction::Set { tool, value } => {
            let mut config = load_config(home)?;
            config.mirror.set(tool, &value)?;
            save_config(home, &config)?;
            println!(
                "{} {} mirror set to {}",
                "✓".green().bold(),
                tool.to_string().cyan(),
                config.mirror.value_for(tool)
            );
        }
    }

    Ok(())
}

/// Setup tracing/logging based on verbosity level.
fn setup_logging(verbosity: u8) {
    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).without_time())
        .with(filter)
        .init();
}
