use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use flatkv_store::StoreConfig;
use serde::{Deserialize, Serialize};

/// Data file used when neither `--file` nor the config file names one.
pub const DEFAULT_DATA_FILE: &str = "flatkv.data";

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    pub data_file: PathBuf,
    pub store: StoreConfig,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            data_file: PathBuf::from(DEFAULT_DATA_FILE),
            store: StoreConfig::default(),
        }
    }
}

impl CliConfig {
    /// Load configuration from a TOML file.
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        toml::from_str(&text)
            .with_context(|| format!("failed to parse config file {}", path.display()))
    }

    /// Resolve the effective config from an optional file and `--file`.
    pub fn resolve(config: Option<&Path>, data_file: Option<PathBuf>) -> anyhow::Result<Self> {
        let mut resolved = match config {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        if let Some(file) = data_file {
            resolved.data_file = file;
        }
        Ok(resolved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let c = CliConfig::default();
        assert_eq!(c.data_file, PathBuf::from("flatkv.data"));
        assert_eq!(c.store, StoreConfig::default());
    }

    #[test]
    fn parse_toml() {
        let c: CliConfig = toml::from_str(
            r#"
data_file = "/var/lib/flatkv/main.data"

[store]
create_parent_dirs = true
sync_on_close = false
"#,
        )
        .unwrap();
        assert_eq!(c.data_file, PathBuf::from("/var/lib/flatkv/main.data"));
        assert!(c.store.create_parent_dirs);
        assert!(!c.store.sync_on_close);
    }

    #[test]
    fn flag_overrides_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("flatkv.toml");
        fs::write(&path, "data_file = \"from-config.data\"\n").unwrap();

        let c = CliConfig::resolve(Some(&path), None).unwrap();
        assert_eq!(c.data_file, PathBuf::from("from-config.data"));

        let c = CliConfig::resolve(Some(&path), Some("flag.data".into())).unwrap();
        assert_eq!(c.data_file, PathBuf::from("flag.data"));
    }

    #[test]
    fn missing_config_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = CliConfig::resolve(Some(&dir.path().join("absent.toml")), None).unwrap_err();
        assert!(err.to_string().contains("failed to read config file"));
    }
}
