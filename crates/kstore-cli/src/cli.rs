use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "kstore",
    about = "Typed, expiring key-value storage on disk",
    version,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,

    /// Directory holding the store [default: .kstore]
    #[arg(long, global = true)]
    pub dir: Option<PathBuf>,

    /// Key prefix namespacing this tool's items
    #[arg(long, global = true)]
    pub prefix: Option<String>,

    /// TOML configuration file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Print the value at a key (dot notation reaches into objects)
    Get(GetArgs),
    /// Store a value; it is parsed as JSON, falling back to a plain string
    Set(SetArgs),
    /// Delete a key or a nested property
    Delete(KeyArgs),
    /// Check whether a key holds a live value
    Has(KeyArgs),
    /// List every live item
    All,
    /// Count live items
    Len,
    /// Print the item at a position
    Index(IndexArgs),
    /// Remove every item in the store
    Clear,
    /// Remove expired items
    Purge,
}

#[derive(Args)]
pub struct GetArgs {
    pub key: String,
    /// Printed when the key is absent or expired
    #[arg(short, long)]
    pub default: Option<String>,
}

#[derive(Args)]
pub struct SetArgs {
    pub key: String,
    #[arg(allow_hyphen_values = true)]
    pub value: String,
    /// Minutes until the item expires; negative values expire immediately
    #[arg(long, allow_hyphen_values = true)]
    pub expires: Option<i64>,
    /// Store the value as a date
    #[arg(long)]
    pub date: bool,
}

#[derive(Args)]
pub struct KeyArgs {
    pub key: String,
}

#[derive(Args)]
pub struct IndexArgs {
    pub index: usize,
    #[arg(short, long)]
    pub default: Option<String>,
}
