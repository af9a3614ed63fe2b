use std::path::PathBuf;

use anyhow::Context;
use colored::Colorize;
use kstore_sdk::{AdapterKind, Storage, StorageConfig, Value, WriteOptions};
use kstore_types::parse_timestamp;
use serde_json::Value as Json;
use tracing::{debug, warn};

use crate::cli::*;

const DEFAULT_DIR: &str = ".kstore";

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    let storage = open_storage(&cli)?;
    let format = cli.format;
    match cli.command {
        Command::Get(args) => cmd_get(&storage, args, format),
        Command::Set(args) => cmd_set(&storage, args),
        Command::Delete(args) => {
            storage.delete(&args.key)?;
            println!("{} Deleted {}", "✓".green(), args.key.bold());
            Ok(())
        }
        Command::Has(args) => {
            let present = storage.has(&args.key)?;
            match format {
                OutputFormat::Json => println!("{present}"),
                OutputFormat::Text if present => println!("{} {}", "✓".green(), args.key.bold()),
                OutputFormat::Text => println!("{} {}", "✗".red(), args.key.bold()),
            }
            Ok(())
        }
        Command::All => cmd_all(&storage, format),
        Command::Len => {
            println!("{}", storage.length()?);
            Ok(())
        }
        Command::Index(args) => {
            let default = args.default.map(|d| parse_value(&d)).unwrap_or(Value::Null);
            let value = storage.index(args.index, default)?;
            println!("{}", render(&value, format));
            Ok(())
        }
        Command::Clear => {
            storage.clear()?;
            println!("{} Store cleared.", "✓".green().bold());
            Ok(())
        }
        Command::Purge => {
            let removed = storage.delete_expired()?;
            println!("{} Purged {} expired item(s).", "✓".green(), removed.to_string().bold());
            Ok(())
        }
    }
}

/// Resolve configuration (file, then flags) and open the durable store.
fn open_storage(cli: &Cli) -> anyhow::Result<Storage> {
    let mut config = match &cli.config {
        Some(path) => StorageConfig::load(path)
            .with_context(|| format!("loading configuration from {}", path.display()))?,
        None => StorageConfig::default(),
    };

    if config.adapter != AdapterKind::LocalStore {
        warn!(adapter = %config.adapter, "only the durable local store persists between runs; using local-store");
        config.adapter = AdapterKind::LocalStore;
    }
    if let Some(prefix) = &cli.prefix {
        config.key_prefix = prefix.clone();
    }
    let dir = cli
        .dir
        .clone()
        .or_else(|| config.data_dir.clone())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_DIR));
    config.data_dir = Some(dir);

    debug!(dir = ?config.data_dir, prefix = %config.key_prefix, "opening store");
    let platform = config.platform()?;
    Ok(Storage::open(&config, &platform)?)
}

fn cmd_get(storage: &Storage, args: GetArgs, format: OutputFormat) -> anyhow::Result<()> {
    let default = args.default.map(|d| parse_value(&d)).unwrap_or(Value::Null);
    let value = storage.get_or(&args.key, default)?;
    println!("{}", render(&value, format));
    Ok(())
}

fn cmd_set(storage: &Storage, args: SetArgs) -> anyhow::Result<()> {
    let value = if args.date {
        let at = parse_timestamp(&args.value)
            .with_context(|| format!("`{}` is not a recognized date", args.value))?;
        Value::Date(at)
    } else {
        parse_value(&args.value)
    };

    let options = match args.expires {
        Some(minutes) => WriteOptions::expiring(minutes),
        None => WriteOptions::new(),
    };
    storage.set_with(&args.key, value, &options)?;

    match args.expires {
        Some(minutes) => println!(
            "{} Stored {} (expires in {} min)",
            "✓".green(),
            args.key.bold(),
            minutes.to_string().yellow()
        ),
        None => println!("{} Stored {}", "✓".green(), args.key.bold()),
    }
    Ok(())
}

fn cmd_all(storage: &Storage, format: OutputFormat) -> anyhow::Result<()> {
    let items = storage.all()?;
    match format {
        OutputFormat::Json => {
            let map: serde_json::Map<String, Json> = items
                .iter()
                .map(|(key, value)| (key.clone(), value.to_json().unwrap_or(Json::Null)))
                .collect();
            println!("{}", serde_json::to_string_pretty(&Json::Object(map))?);
        }
        OutputFormat::Text if items.is_empty() => println!("Store is empty."),
        OutputFormat::Text => {
            for (key, value) in &items {
                println!("{} {} {}", key.bold(), format!("({})", value.data_type()).dimmed(), value);
            }
        }
    }
    Ok(())
}

/// Interpret command-line text as JSON when it parses, otherwise as a
/// plain string.
fn parse_value(text: &str) -> Value {
    serde_json::from_str::<Json>(text)
        .map(Value::from_json)
        .unwrap_or_else(|_| Value::from(text))
}

fn render(value: &Value, format: OutputFormat) -> String {
    match format {
        OutputFormat::Text => value.to_string(),
        OutputFormat::Json => value.to_json().unwrap_or(Json::Null).to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    fn cli(dir: &std::path::Path, args: &[&str]) -> Cli {
        let mut argv = vec!["kstore", "--dir", dir.to_str().unwrap()];
        argv.extend_from_slice(args);
        Cli::parse_from(argv)
    }

    #[test]
    fn values_parse_as_json_first() {
        assert_eq!(parse_value("2"), Value::from(2));
        assert_eq!(parse_value("true"), Value::from(true));
        assert_eq!(parse_value("\"quoted\""), Value::from("quoted"));
        assert_eq!(parse_value("plain words"), Value::from("plain words"));
        assert_eq!(
            parse_value(r#"{"a":1}"#),
            Value::from_json(serde_json::json!({"a": 1}))
        );
    }

    #[test]
    fn render_formats() {
        assert_eq!(render(&Value::from("x"), OutputFormat::Text), "x");
        assert_eq!(render(&Value::from("x"), OutputFormat::Json), "\"x\"");
        assert_eq!(render(&Value::Undefined, OutputFormat::Json), "null");
    }

    #[test]
    fn commands_share_the_store_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        run_command(cli(dir.path(), &["set", "user.name", "ada"])).unwrap();
        run_command(cli(dir.path(), &["set", "stale", "1", "--expires", "-1"])).unwrap();

        let storage = open_storage(&cli(dir.path(), &["len"])).unwrap();
        assert_eq!(storage.get("user.name").unwrap(), Value::from("ada"));
        assert_eq!(storage.get("stale").unwrap(), Value::Null);
        assert_eq!(storage.length().unwrap(), 1);

        run_command(cli(dir.path(), &["delete", "user"])).unwrap();
        let storage = open_storage(&cli(dir.path(), &["len"])).unwrap();
        assert!(storage.is_empty().unwrap());
    }

    #[test]
    fn date_flag_stores_dates() {
        let dir = tempfile::tempdir().unwrap();
        run_command(cli(dir.path(), &["set", "born", "1986-05-14", "--date"])).unwrap();
        let storage = open_storage(&cli(dir.path(), &["len"])).unwrap();
        assert!(matches!(storage.get("born").unwrap(), Value::Date(_)));

        assert!(run_command(cli(dir.path(), &["set", "bad", "someday", "--date"])).is_err());
    }

    #[test]
    fn prefix_flag_separates_namespaces() {
        let dir = tempfile::tempdir().unwrap();
        run_command(cli(dir.path(), &["--prefix", "a|", "set", "k", "1"])).unwrap();
        let other = open_storage(&cli(dir.path(), &["--prefix", "b|", "len"])).unwrap();
        assert!(other.is_empty().unwrap());
    }
}
