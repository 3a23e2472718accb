//! Deckroute CLI Application

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use deckroute_core::domain::config::{ConfigManager, RoutingConfig, CONFIG_FILE_NAME};
use deckroute_core::domain::{AudioInput, AudioOutput, AudioPath, AudioPathType, Direction};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "deckroute")]
#[command(about = "Inspect and migrate sound device channel mappings", long_about = None)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Routing document (defaults to the user config directory)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print every device and its mapped paths
    Show {
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Report clashing channels, duplicate paths and channel count problems
    Check,
    /// Rewrite the document with explicit channel counts
    Migrate {
        /// Write here instead of overwriting the input
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// List path types and their rules
    Types,
    /// Write the factory default document if none exists
    Init,
}

#[derive(Serialize)]
struct PathView {
    name: String,
    #[serde(rename = "type")]
    path_type: &'static str,
    index: u8,
    channel: u8,
    channel_count: u8,
}

impl From<&AudioPath> for PathView {
    fn from(path: &AudioPath) -> Self {
        let group = path.channel_group();
        Self {
            name: path.user_string(),
            path_type: path.path_type().as_str(),
            index: path.index(),
            channel: group.channel_base(),
            channel_count: group.channel_count(),
        }
    }
}

#[derive(Serialize)]
struct DeviceView {
    name: String,
    outputs: Vec<PathView>,
    inputs: Vec<PathView>,
}

fn config_path(cli: &Cli) -> anyhow::Result<PathBuf> {
    match &cli.config {
        Some(path) => Ok(path.clone()),
        None => Ok(ConfigManager::default_config_dir()?.join(CONFIG_FILE_NAME)),
    }
}

async fn load(path: &Path) -> anyhow::Result<RoutingConfig> {
    RoutingConfig::load_from_file(path)
        .await
        .with_context(|| format!("failed to load {}", path.display()))
}

fn devices_json(config: &RoutingConfig) -> serde_json::Result<String> {
    let devices: Vec<DeviceView> = config
        .devices
        .iter()
        .map(|device| DeviceView {
            name: device.name.clone(),
            outputs: device.outputs.iter().map(|o| PathView::from(o.as_path())).collect(),
            inputs: device.inputs.iter().map(|i| PathView::from(i.as_path())).collect(),
        })
        .collect();
    serde_json::to_string_pretty(&devices)
}

fn show(config: &RoutingConfig, json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", devices_json(config)?);
        return Ok(());
    }

    for device in &config.devices {
        println!("{}", device.name);
        for direction in [Direction::Output, Direction::Input] {
            for path in device.paths(direction) {
                println!(
                    "  {:<6} {:<16} {:<14} channels {}",
                    direction,
                    path.user_string(),
                    path.path_type(),
                    path.channel_group()
                );
            }
        }
    }
    Ok(())
}

/// Prints every finding; fails when there is at least one
fn check(config: &RoutingConfig, path: &Path) -> anyhow::Result<()> {
    let report = config.validate();
    for message in report.messages() {
        println!("{}", message);
    }
    if !report.is_clean() {
        bail!("{} problem(s) found in {}", report.len(), path.display());
    }
    println!("No problems found");
    Ok(())
}

fn types_table() -> Vec<String> {
    let mut lines = vec![format!(
        "{:<14} {:<8} {:<9} {:<6} {:<6}",
        "type", "indexed", "channels", "output", "input"
    )];
    for path_type in AudioPathType::all() {
        let supported_as = |direction: Direction| {
            if direction.supports(path_type) {
                "yes"
            } else {
                "no"
            }
        };
        lines.push(format!(
            "{:<14} {:<8} {:<9} {:<6} {:<6}",
            path_type,
            if path_type.is_indexed() { "yes" } else { "no" },
            format!("{}..={}", path_type.min_channels(), path_type.max_channels()),
            supported_as(AudioOutput::DIRECTION),
            supported_as(AudioInput::DIRECTION),
        ));
    }
    lines
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)))
        .with_writer(std::io::stderr)
        .init();

    let path = config_path(&cli)?;

    match &cli.command {
        Command::Show { json } => show(&load(&path).await?, *json)?,
        Command::Check => check(&load(&path).await?, &path)?,
        Command::Migrate { output } => {
            let config = load(&path).await?;
            let target = output.as_ref().unwrap_or(&path);
            config
                .save_to_file(target)
                .await
                .with_context(|| format!("failed to write {}", target.display()))?;
            tracing::info!(path = %target.display(), "Routing document migrated");
        }
        Command::Types => {
            for line in types_table() {
                println!("{}", line.trim_end());
            }
        }
        Command::Init => {
            if path.exists() {
                tracing::info!(path = %path.display(), "Routing document already exists");
            } else {
                RoutingConfig::factory_default().save_to_file(&path).await?;
                tracing::info!(path = %path.display(), "Factory default routing document written");
            }
        }
    }

    Ok(())
}
