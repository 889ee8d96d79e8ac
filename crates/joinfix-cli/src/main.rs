//! `joinfix` — remove draft/publish duplicates from unidirectional join
//! tables.
//!
//! # Usage
//!
//! ```
//! joinfix --database content.db --schema schema.json --dry-run
//! joinfix --config /etc/joinfix.toml --json
//! joinfix --config /etc/joinfix.toml --no-dry-run
//! ```

mod settings;

use std::path::PathBuf;

use anyhow::Context as _;
use clap::Parser;
use joinfix_core::{cleaner::DraftDuplicateCleaner, repair::Repair, schema::Schema};
use joinfix_store_sqlite::SqliteStore;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

use settings::{Overrides, RepairConfig};

#[derive(Parser)]
#[command(author, version, about = "Repair duplicate rows in unidirectional join tables")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "joinfix.toml")]
  config: PathBuf,

  /// SQLite database to repair.
  #[arg(long, value_name = "FILE")]
  database: Option<PathBuf>,

  /// JSON export of the model metadata.
  #[arg(long, value_name = "FILE")]
  schema: Option<PathBuf>,

  /// Report what would be removed without deleting anything.
  #[arg(long, overrides_with = "no_dry_run")]
  dry_run: bool,

  /// Delete duplicates even if the config file enables `dry_run`.
  #[arg(long, overrides_with = "dry_run")]
  no_dry_run: bool,

  /// Print the full report as JSON.
  #[arg(long)]
  json: bool,
}

impl Cli {
  /// `None` leaves the file and environment value in place.
  fn dry_run_override(&self) -> Option<bool> {
    match (self.dry_run, self.no_dry_run) {
      (true, _) => Some(true),
      (_, true) => Some(false),
      _ => None,
    }
  }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .with_writer(std::io::stderr)
    .init();

  let cli = Cli::parse();
  let dry_run = cli.dry_run_override();

  let cfg = RepairConfig::load(&cli.config, Overrides {
    database_path: cli.database,
    schema_path:   cli.schema,
    dry_run:       dry_run,
  })?;

  let raw = std::fs::read_to_string(&cfg.schema_path)
    .with_context(|| format!("reading schema file {}", cfg.schema_path.display()))?;
  let schema = Schema::from_json(&raw).context("parsing schema file")?;

  let store = SqliteStore::open(&cfg.database_path)
    .await
    .with_context(|| format!("failed to open database at {:?}", cfg.database_path))?;

  let cleaner = DraftDuplicateCleaner::default()
    .with_dry_run(cfg.dry_run)
    .with_max_component_depth(cfg.max_component_depth);

  tracing::info!(
    database = %cfg.database_path.display(),
    dry_run = cfg.dry_run,
    "repairing unidirectional join tables"
  );
  let report = Repair::new(&store, &schema).run(&cleaner).await;

  if cli.json {
    println!("{}", serde_json::to_string_pretty(&report)?);
  } else {
    let verb = if cfg.dry_run { "would remove" } else { "removed" };
    println!(
      "{verb} {} duplicate join rows across {} relations ({} failed)",
      report.removed,
      report.relations.len(),
      report.failed(),
    );
  }

  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;

  fn parse(args: &[&str]) -> Cli { Cli::parse_from(std::iter::once("joinfix").chain(args.iter().copied())) }

  #[test]
  fn dry_run_flags() {
    assert_eq!(parse(&[]).dry_run_override(), None);
    assert_eq!(parse(&["--dry-run"]).dry_run_override(), Some(true));
    assert_eq!(parse(&["--no-dry-run"]).dry_run_override(), Some(false));
    assert_eq!(parse(&["--no-dry-run", "--dry-run"]).dry_run_override(), Some(true));
    assert_eq!(parse(&["--dry-run", "--no-dry-run"]).dry_run_override(), Some(false));
  }
}
