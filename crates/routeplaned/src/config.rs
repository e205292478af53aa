//! Daemon configuration, loaded from TOML.
//!
//! ```toml
//! port = 8080
//! data_dir = "/var/lib/routeplane"
//!
//! [router]
//! driver = "memory"
//! domain = "apps.example.com"
//! ```

use std::path::{Path, PathBuf};

use routeplane_router::RouterConfig;
use serde::{Deserialize, Serialize};

pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_DATA_DIR: &str = "/var/lib/routeplane";
pub const DB_FILE: &str = "routeplane.redb";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DaemonConfig {
    pub port: u16,
    pub data_dir: PathBuf,
    pub router: RouterConfig,
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            router: RouterConfig::default(),
        }
    }
}

impl DaemonConfig {
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: DaemonConfig = toml::from_str(&content)?;
        Ok(config)
    }

    /// Load from `path` when given, then apply command-line overrides.
    pub fn load(
        path: Option<&Path>,
        port: Option<u16>,
        data_dir: Option<PathBuf>,
    ) -> anyhow::Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        if let Some(port) = port {
            config.port = port;
        }
        if let Some(data_dir) = data_dir {
            config.data_dir = data_dir;
        }
        Ok(config)
    }

    pub fn db_path(&self) -> PathBuf {
        self.data_dir.join(DB_FILE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = DaemonConfig::load(None, None, None).unwrap();
        assert_eq!(config.port, DEFAULT_PORT);
        assert_eq!(config.db_path(), Path::new(DEFAULT_DATA_DIR).join(DB_FILE));
        assert_eq!(config.router, RouterConfig::default());
    }

    #[test]
    fn flags_override_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("routeplaned.toml");
        std::fs::write(
            &path,
            "port = 9000\ndata_dir = \"/srv/rp\"\n\n[router]\ndomain = \"apps.example.com\"\n",
        )
        .unwrap();

        let config = DaemonConfig::load(Some(&path), Some(9100), None).unwrap();
        assert_eq!(config.port, 9100);
        assert_eq!(config.data_dir, PathBuf::from("/srv/rp"));
        assert_eq!(config.router.domain, "apps.example.com");
        assert_eq!(config.router.driver, "memory");
    }

    #[test]
    fn missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(DaemonConfig::load(Some(&dir.path().join("absent.toml")), None, None).is_err());
    }
}
