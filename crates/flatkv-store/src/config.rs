use serde::{Deserialize, Serialize};

/// Options applied when opening a [`FileStore`](crate::FileStore).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Create missing parent directories of the data file on open.
    pub create_parent_dirs: bool,
    /// `fsync` the data file after it is rewritten on close.
    pub sync_on_close: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            create_parent_dirs: false,
            sync_on_close: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let c = StoreConfig::default();
        assert!(!c.create_parent_dirs);
        assert!(c.sync_on_close);
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let c: StoreConfig = toml::from_str("create_parent_dirs = true").unwrap();
        assert!(c.create_parent_dirs);
        assert!(c.sync_on_close);
    }
}
