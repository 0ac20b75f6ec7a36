use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "flatkv",
    about = "flatkv — key-value store persisted to a flat file",
    version,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Data file to operate on (overrides the config file)
    #[arg(short, long, global = true)]
    pub file: Option<PathBuf>,

    /// TOML configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Clone, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Add a new entry; fails if the key exists
    Create(EntryArgs),
    /// Print the value stored under a key
    Read(KeyArgs),
    /// Replace the value of an existing entry
    Update(EntryArgs),
    /// Remove an entry and print the value it held
    Delete(KeyArgs),
    /// List all keys
    Keys,
}

#[derive(Args, Debug)]
pub struct EntryArgs {
    pub key: String,
    pub value: String,
}

#[derive(Args, Debug)]
pub struct KeyArgs {
    pub key: String,
}
