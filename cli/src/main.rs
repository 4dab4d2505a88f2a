
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use dartboard::config::{BoardConfig, ConfigError};
use dartboard::engine::{Action, EngineCore};
use dartboard::input::InputEvent;
use dartboard::surface::RecordingSurface;
use serde::Deserialize;
use serde_json::{Value, json};

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("failed to read {path}: {source}")]
    Read { path: String, source: io::Error },
    #[error("invalid JSON payload: {0}")]
    InvalidJson(#[from] serde_json::Error),
    #[error("invalid config: {0}")]
    Config(#[from] ConfigError),
}

#[derive(Parser, Debug)]
#[command(name = "dartboard-cli", about = "Replay recorded input against the dartboard engine")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run a recorded event script and print the resulting board state.
    Replay {
        #[arg(help = "Script file path, or - for stdin")]
        script: PathBuf,

        #[arg(long, default_value_t = false, help = "Include the final frame's draw ops")]
        ops: bool,
    },
    /// Print the default board configuration.
    Defaults,
}

/// A recorded session: board configuration plus the events to feed it.
#[derive(Debug, Deserialize)]
struct Script {
    #[serde(default)]
    config: BoardConfig,
    #[serde(default)]
    events: Vec<InputEvent>,
}

fn main() -> Result<(), CliError> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Replay { script, ops } => run_replay(&script, ops),
        Command::Defaults => print_json(&serde_json::to_value(BoardConfig::default())?),
    }
}

fn run_replay(path: &Path, include_ops: bool) -> Result<(), CliError> {
    let raw = read_script(path)?;
    let script: Script = serde_json::from_str(&raw)?;
    let summary = replay(script, include_ops)?;
    print_json(&summary)
}

fn read_script(path: &Path) -> Result<String, CliError> {
    let display = path.display().to_string();
    let result = if display == "-" {
        let mut buf = String::new();
        io::stdin().read_to_string(&mut buf).map(|_| buf)
    } else {
        fs::read_to_string(path)
    };
    result.map_err(|source| CliError::Read { path: display, source })
}

fn replay(script: Script, include_ops: bool) -> Result<Value, CliError> {
    script.config.validate()?;
    let mut core = EngineCore::new(script.config);

    let mut actions: Vec<Action> = Vec::new();
    for event in &script.events {
        tracing::debug!(time_ms = event.time_ms(), state = core.gesture().name(), "replay event");
        actions.extend(core.handle(event));
    }
    tracing::info!(events = script.events.len(), actions = actions.len(), "replay finished");

    let mut surface = RecordingSurface::new();
    let Ok(()) = core.render(&mut surface);

    let mut summary = json!({
        "points": core.points(),
        "dragging_point": core.dragging_point(),
        "view": core.view(),
        "gesture": core.gesture(),
        "action_count": actions.len(),
        "painted_paths": surface.painted().len(),
    });
    if include_ops {
        summary["ops"] = serde_json::to_value(surface.ops())?;
    }
    Ok(summary)
}

fn print_json(value: &Value) -> Result<(), CliError> {
    let rendered = serde_json::to_string_pretty(value)?;
    println!("{rendered}");
    Ok(())
}
