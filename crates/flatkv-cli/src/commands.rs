use anyhow::Context;
use colored::Colorize;
use flatkv_store::{FileStore, KvStore};
use serde::Serialize;
use tracing::debug;

use crate::cli::*;
use crate::config::CliConfig;

/// Result of a single command, rendered as text or JSON.
#[derive(Debug, PartialEq, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Outcome {
    Created { key: String },
    Read { key: String, value: String },
    Updated { key: String },
    Deleted { key: String, value: String },
    Keys { keys: Vec<String> },
}

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    let config = CliConfig::resolve(cli.config.as_deref(), cli.file)?;
    debug!(data_file = %config.data_file.display(), "resolved configuration");

    let store = FileStore::open_with_config(&config.data_file, config.store.clone())
        .with_context(|| format!("cannot open store {}", config.data_file.display()))?;

    // Close even when the command fails so the handle is released.
    let outcome = execute(&store, cli.command);
    let closed = store.close().context("cannot save store");
    let outcome = outcome?;
    closed?;

    println!("{}", render(&outcome, &cli.format)?);
    Ok(())
}

pub fn execute(store: &FileStore, command: Command) -> anyhow::Result<Outcome> {
    let outcome = match command {
        Command::Create(EntryArgs { key, value }) => {
            store.create(&key, &value)?;
            Outcome::Created { key }
        }
        Command::Read(KeyArgs { key }) => {
            let value = store.read(&key)?;
            Outcome::Read { key, value }
        }
        Command::Update(EntryArgs { key, value }) => {
            store.update(&key, &value)?;
            Outcome::Updated { key }
        }
        Command::Delete(KeyArgs { key }) => {
            let value = store.delete(&key)?;
            Outcome::Deleted { key, value }
        }
        Command::Keys => Outcome::Keys { keys: store.keys()? },
    };
    Ok(outcome)
}

pub fn render(outcome: &Outcome, format: &OutputFormat) -> anyhow::Result<String> {
    if *format == OutputFormat::Json {
        return Ok(serde_json::to_string(outcome)?);
    }
    let text = match outcome {
        Outcome::Created { key } => format!("{} Created {}", "✓".green().bold(), key.yellow()),
        Outcome::Read { value, .. } => value.clone(),
        Outcome::Updated { key } => format!("{} Updated {}", "✓".green().bold(), key.yellow()),
        Outcome::Deleted { key, value } => {
            format!("{} Deleted {} (was {})", "✓".green().bold(), key.yellow(), value.dimmed())
        }
        Outcome::Keys { keys } if keys.is_empty() => "No entries.".to_string(),
        Outcome::Keys { keys } => keys.join("\n"),
    };
    Ok(text)
}
