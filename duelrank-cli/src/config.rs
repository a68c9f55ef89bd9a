//! Config file loading and creation for the duelrank CLI.
//!
//! Config lives at ~/.config/duelrank/config.toml.
//! All fields are optional; CLI flags override config values.

use duelrank_core::{ModelKind, SelectionPolicy};
use serde::Deserialize;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::bail;

#[derive(Debug, Deserialize, Default, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct DuelrankConfig {
    pub model: Option<ModelKind>,
    pub selection: Option<SelectionPolicy>,
    pub write_interval_secs: Option<u64>,
    pub export_iterations: Option<usize>,
    pub buckets: Option<usize>,
}

const DEFAULT_CONFIG_TEMPLATE: &str = "\
# duelrank configuration
# All values here can be overridden by CLI flags.

# Rating model used to pick the next pair: \"elo\" or \"davidson\"
# model = \"elo\"

# Pair selection: \"fast\" (nearest in rating order) or \"exhaustive\" (most uncertain pair)
# selection = \"fast\"

# Seconds to wait before writing __voting_db.json after a vote.
# Rapid votes within this window are written once.
# write_interval_secs = 10

# Elo passes for the ratings stored in __voting_db.json and shown by `duelrank rank`
# export_iterations = 1000

# Number of rating buckets stored in __voting_db.json
# buckets = 10
";

/// Returns the default config path: ~/.config/duelrank/config.toml
pub fn config_path() -> PathBuf {
    let home = std::env::var("HOME").unwrap_or_else(|_| bail("HOME environment variable not set"));
    PathBuf::from(home).join(".config").join("duelrank").join("config.toml")
}

/// Load config from a file path. Returns default (all None) if file doesn't exist.
pub fn load_config(path: &Path) -> DuelrankConfig {
    match std::fs::read_to_string(path) {
        Ok(content) => toml::from_str(&content)
            .unwrap_or_else(|e| bail(format!("Failed to parse config at {}: {e}", path.display()))),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => DuelrankConfig::default(),
        Err(e) => bail(format!("Failed to read config at {}: {e}", path.display())),
    }
}

/// Write the commented default config to `path`, creating parent directories.
/// Fails with `AlreadyExists` instead of overwriting.
pub fn create_default_config(path: &Path) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let mut file = std::fs::OpenOptions::new().write(true).create_new(true).open(path)?;
    file.write_all(DEFAULT_CONFIG_TEMPLATE.as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_template_parses_to_empty_config() {
        let cfg: DuelrankConfig = toml::from_str(DEFAULT_CONFIG_TEMPLATE).unwrap();
        assert_eq!(cfg, DuelrankConfig::default());
    }

    #[test]
    fn test_parses_all_fields() {
        let content = r#"
model = "davidson"
selection = "exhaustive"
write_interval_secs = 3
export_iterations = 50
buckets = 4
"#;
        let cfg: DuelrankConfig = toml::from_str(content).unwrap();
        assert_eq!(cfg.model, Some(ModelKind::Davidson));
        assert_eq!(cfg.selection, Some(SelectionPolicy::Exhaustive));
        assert_eq!(cfg.write_interval_secs, Some(3));
        assert_eq!(cfg.export_iterations, Some(50));
        assert_eq!(cfg.buckets, Some(4));
    }

    #[test]
    fn test_rejects_unknown_model() {
        assert!(toml::from_str::<DuelrankConfig>("model = \"glicko\"").is_err());
    }

    #[test]
    fn test_missing_file_is_default() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(load_config(&dir.path().join("nope.toml")), DuelrankConfig::default());
    }

    #[test]
    fn test_create_refuses_to_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        create_default_config(&path).unwrap();
        assert_eq!(load_config(&path), DuelrankConfig::default());

        let err = create_default_config(&path).unwrap_err();
        assert_eq!(err.kind(), std::io::ErrorKind::AlreadyExists);
    }
}
