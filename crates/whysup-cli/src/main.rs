//! why-sup CLI
//!
//! Runs usage_stats channel requests against a device profile.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::PathBuf;
use tabled::{settings::Style, Table, Tabled};
use tracing::info;
use whysup_core::channel::{
    MethodCall, METHOD_CHECK_PERMISSION, METHOD_GET_CURRENT_APP, METHOD_OPEN_APP_SETTINGS,
};
use whysup_core::{ChannelResult, Engine, EngineConfig, UsageStatsChannel};
use whysup_device::DeviceProfile;

#[derive(Parser)]
#[command(name = "whysup")]
#[command(about = "Find out which app is in use right now")]
#[command(version)]
struct Cli {
    /// Device profile (defaults to device.json in the data directory)
    #[arg(short, long, global = true)]
    device: Option<PathBuf>,

    /// Engine config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check whether usage statistics may be read
    Permission,

    /// Show the app currently in use
    Current {
        /// Print the raw channel envelope
        #[arg(long)]
        json: bool,
    },

    /// Open the usage access settings screen
    Settings,

    /// Send a raw channel request and print the envelope
    Call {
        /// Method name, e.g. getCurrentApp
        method: String,
    },

    /// List allowlisted packages
    Allowlist,
}

#[derive(Tabled)]
struct AppRow {
    #[tabled(rename = "App")]
    app: String,
    #[tabled(rename = "Package")]
    package: String,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("whysup=warn".parse()?),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => EngineConfig::load(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => EngineConfig::load_default()?,
    };

    match cli.command {
        Commands::Permission => {
            let engine = load_engine(cli.device, config)?;
            show_permission(&call(&engine, METHOD_CHECK_PERMISSION))
        }
        Commands::Current { json } => {
            let engine = load_engine(cli.device, config)?;
            let result = call(&engine, METHOD_GET_CURRENT_APP);
            if json {
                print_envelope(&result)
            } else {
                show_current(&result)
            }
        }
        Commands::Settings => {
            let engine = load_engine(cli.device, config)?;
            call(&engine, METHOD_OPEN_APP_SETTINGS);
            let launches = engine.device().settings_launches();
            info!("Settings launch count: {}", launches);
            println!("{}", "✓ Usage access settings opened".green());
            Ok(())
        }
        Commands::Call { method } => {
            let engine = load_engine(cli.device, config)?;
            print_envelope(&call(&engine, &method))
        }
        Commands::Allowlist => show_allowlist(&config),
    }
}

/// Only commands that talk to the device need a profile on disk
fn load_engine(path: Option<PathBuf>, config: EngineConfig) -> Result<Engine<DeviceProfile>> {
    let path = path.unwrap_or_else(whysup_core::device_path);
    let device = DeviceProfile::load(&path)
        .with_context(|| format!("Failed to load device {}", path.display()))?;
    info!("Using device profile {}", path.display());
    Ok(Engine::new(device, config))
}

fn call(engine: &Engine<DeviceProfile>, method: &str) -> ChannelResult {
    let channel = UsageStatsChannel::new(engine);
    channel.handle(&MethodCall::new(method))
}

fn print_envelope(result: &ChannelResult) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(result)?);
    Ok(())
}

fn show_permission(result: &ChannelResult) -> Result<()> {
    match result {
        ChannelResult::Success { result } if result.as_bool() == Some(true) => {
            println!("{}", "✓ Usage stats permission granted".green());
        }
        _ => {
            println!("{}", "✗ Usage stats permission not granted".red());
            println!("  Run `whysup settings` to grant usage access.");
        }
    }
    Ok(())
}

fn show_current(result: &ChannelResult) -> Result<()> {
    match result {
        ChannelResult::Success { result } => {
            let app: whysup_core::ResolvedApp = serde_json::from_value(result.clone())?;
            match (app.app_name, app.package_name) {
                (Some(app), Some(package)) => {
                    let table = Table::new(vec![AppRow { app, package }])
                        .with(Style::rounded())
                        .to_string();
                    println!("{}", table);
                }
                _ => println!("{}", "No app in use right now.".yellow()),
            }
        }
        ChannelResult::Error { code, message, .. } => {
            println!("{} {}", format!("✗ {}:", code).red(), message);
        }
        ChannelResult::NotImplemented => {
            println!("{}", "✗ Not implemented".red());
        }
    }
    Ok(())
}

fn show_allowlist(config: &EngineConfig) -> Result<()> {
    let allowlist = config.allowlist();

    println!("\n{}", "Allowlisted packages".bold().cyan());
    println!("{}", "─".repeat(40));
    for package in allowlist.sorted() {
        println!("  {}", package);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_global_flags_after_subcommand() {
        let args = ["whysup", "current", "--json", "--device", "dev.json"];
        let cli = Cli::try_parse_from(args).unwrap();
        assert_eq!(cli.device, Some(PathBuf::from("dev.json")));
        assert!(matches!(cli.command, Commands::Current { json: true }));
    }

    #[test]
    fn test_parse_call() {
        let args = ["whysup", "call", "getCurrentApp"];
        let cli = Cli::try_parse_from(args).unwrap();
        match cli.command {
            Commands::Call { method } => assert_eq!(method, "getCurrentApp"),
            _ => panic!("expected a call command"),
        }
    }

    #[test]
    fn test_allowlist_needs_no_device() {
        let cli = Cli::try_parse_from(["whysup", "allowlist"]).unwrap();
        assert!(matches!(cli.command, Commands::Allowlist));
        assert!(cli.device.is_none());
        assert!(show_allowlist(&EngineConfig::default()).is_ok());
    }

    #[test]
    fn test_load_engine_reports_missing_device() {
        let path = PathBuf::from("no/such/dir/device.json");
        let config = EngineConfig::default();
        let err = load_engine(Some(path), config).unwrap_err();
        assert!(err.to_string().starts_with("Failed to load device"));
    }
}
