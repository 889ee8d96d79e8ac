//! Repair configuration, layered from a TOML file, `JOINFIX_*` environment
//! variables and command-line flags (highest precedence last).

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use joinfix_core::owner::DEFAULT_MAX_COMPONENT_DEPTH;
use serde::Deserialize;

/// Runtime configuration, deserialised from `joinfix.toml`.
#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct RepairConfig {
  pub database_path:       PathBuf,
  pub schema_path:         PathBuf,
  #[serde(default)]
  pub dry_run:             bool,
  #[serde(default = "default_max_component_depth")]
  pub max_component_depth: usize,
}

fn default_max_component_depth() -> usize { DEFAULT_MAX_COMPONENT_DEPTH }

/// Values supplied on the command line; each one that is set overrides the
/// file and environment.
#[derive(Debug, Default)]
pub struct Overrides {
  pub database_path: Option<PathBuf>,
  pub schema_path:   Option<PathBuf>,
  pub dry_run:       Option<bool>,
}

impl RepairConfig {
  pub fn load(file: &Path, overrides: Overrides) -> anyhow::Result<Self> {
    let mut builder = config::Config::builder()
      .add_source(config::File::from(file).required(false))
      .add_source(config::Environment::with_prefix("JOINFIX"));

    if let Some(path) = &overrides.database_path {
      builder = builder.set_override("database_path", path.to_string_lossy().into_owned())?;
    }
    if let Some(path) = &overrides.schema_path {
      builder = builder.set_override("schema_path", path.to_string_lossy().into_owned())?;
    }
    if let Some(dry_run) = overrides.dry_run {
      builder = builder.set_override("dry_run", dry_run)?;
    }

    let mut cfg: Self = builder
      .build()
      .context("failed to read config file")?
      .try_deserialize()
      .context("failed to deserialise RepairConfig")?;

    cfg.database_path = expand_tilde(&cfg.database_path);
    cfg.schema_path = expand_tilde(&cfg.schema_path);
    Ok(cfg)
  }
}

/// Expand a leading `~` to the user's home directory.
pub fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}

#[cfg(test)]
mod tests {
  use super::*;

  fn missing_file() -> PathBuf {
    std::env::temp_dir().join("joinfix-config-that-does-not-exist.toml")
  }

  #[test]
  fn flags_fill_required_fields() {
    let cfg = RepairConfig::load(
      &missing_file(),
      Overrides {
        database_path: Some("/srv/content.db".into()),
        schema_path:   Some("/srv/schema.json".into()),
        dry_run:       Some(true),
      },
    )
    .unwrap();

    assert_eq!(cfg.database_path, PathBuf::from("/srv/content.db"));
    assert_eq!(cfg.schema_path, PathBuf::from("/srv/schema.json"));
    assert!(cfg.dry_run);
    assert_eq!(cfg.max_component_depth, DEFAULT_MAX_COMPONENT_DEPTH);
  }

  #[test]
  fn flag_turns_off_dry_run_from_file() {
    let file = std::env::temp_dir()
      .join(format!("joinfix-settings-{}.toml", std::process::id()));
    std::fs::write(
      &file,
      "database_path = \"/srv/content.db\"\nschema_path = \"/srv/schema.json\"\ndry_run = true\n",
    )
    .unwrap();

    let from_file = RepairConfig::load(&file, Overrides::default()).unwrap();
    let overridden = RepairConfig::load(&file, Overrides {
      dry_run: Some(false),
      ..Overrides::default()
    })
    .unwrap();
    std::fs::remove_file(&file).ok();

    assert!(from_file.dry_run);
    assert!(!overridden.dry_run);
    assert_eq!(overridden.database_path, PathBuf::from("/srv/content.db"));
  }

  #[test]
  fn missing_paths_are_an_error() {
    assert!(RepairConfig::load(&missing_file(), Overrides::default()).is_err());
  }

  #[test]
  fn relative_paths_are_not_expanded() {
    assert_eq!(expand_tilde(Path::new("data/content.db")), PathBuf::from("data/content.db"));
  }
}
