use crate::error::Result;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};

const DOCKER_DATA_DIR: &str = "/app/data";
const CONFIG_FILE_NAME: &str = "config.json";

#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
pub struct Configuration {
    #[serde(default)]
    pub jellyfin_url: String,
    #[serde(default)]
    pub api_key: String,
    #[serde(default)]
    pub user_id: String,
    #[serde(default)]
    pub user_name: String,
}

impl Configuration {
    /// Server URL and API key are both present.
    pub fn is_server_configured(&self) -> bool {
        !self.jellyfin_url.is_empty() && !self.api_key.is_empty()
    }

    /// Server is configured and a user has been selected.
    pub fn is_complete(&self) -> bool {
        self.is_server_configured() && !self.user_id.is_empty()
    }

    pub fn set_server(&mut self, jellyfin_url: &str, api_key: &str) {
        self.jellyfin_url = normalize_url(jellyfin_url);
        self.api_key = api_key.to_string();
    }

    pub fn set_user(&mut self, user_id: &str, user_name: &str) {
        self.user_id = user_id.to_string();
        self.user_name = user_name.to_string();
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Configuration = serde_json::from_str(&content)?;
        Ok(config)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir)?;
        }
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

pub fn normalize_url(url: &str) -> String {
    url.trim().trim_end_matches('/').to_string()
}

/// Config location: the Docker volume when it is mounted, the working
/// directory otherwise.
pub fn default_config_path() -> PathBuf {
    resolve_config_path(Path::new(DOCKER_DATA_DIR))
}

fn resolve_config_path(data_dir: &Path) -> PathBuf {
    if data_dir.is_dir() {
        data_dir.join(CONFIG_FILE_NAME)
    } else {
        PathBuf::from(CONFIG_FILE_NAME)
    }
}

/// Shared, persisted configuration. Every mutation is written to disk while
/// the write lock is held.
#[derive(Clone)]
pub struct ConfigStore {
    path: PathBuf,
    current: Arc<RwLock<Configuration>>,
}

impl ConfigStore {
    /// Opens the store, starting from an empty configuration when the file
    /// does not exist yet or cannot be read. The next setup save replaces an
    /// unreadable file.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let current = if path.exists() {
            match Configuration::from_file(&path) {
                Ok(config) => {
                    info!("Configuration loaded from: {}", path.display());
                    config
                }
                Err(e) => {
                    warn!("Ignoring unreadable configuration at {}: {}", path.display(), e);
                    Configuration::default()
                }
            }
        } else {
            debug!("No configuration at {}, starting empty", path.display());
            Configuration::default()
        };

        Self {
            path,
            current: Arc::new(RwLock::new(current)),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn snapshot(&self) -> Configuration {
        self.current.read().clone()
    }

    /// Re-reads the file, replacing the in-memory copy.
    pub fn reload(&self) -> Result<Configuration> {
        let config = Configuration::from_file(&self.path)?;
        *self.current.write() = config.clone();
        Ok(config)
    }

    /// Applies `change` and persists the result. The in-memory copy is only
    /// replaced once the file has been written.
    pub fn update<F>(&self, change: F) -> Result<Configuration>
    where
        F: FnOnce(&mut Configuration),
    {
        let mut guard = self.current.write();
        let mut next = guard.clone();
        change(&mut next);
        next.save_to(&self.path)?;
        *guard = next.clone();
        Ok(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn trailing_slashes_are_trimmed() {
        let mut config = Configuration::default();
        config.set_server(" http://jellyfin.local:8096/// ", "key");
        assert_eq!(config.jellyfin_url, "http://jellyfin.local:8096");
        assert!(config.is_server_configured());
        assert!(!config.is_complete());
    }

    #[test]
    fn falls_back_to_working_directory() {
        let dir = tempdir().unwrap();
        assert_eq!(
            resolve_config_path(dir.path()),
            dir.path().join("config.json")
        );
        assert_eq!(
            resolve_config_path(&dir.path().join("missing")),
            PathBuf::from("config.json")
        );
    }

    #[test]
    fn update_persists_and_reload_reads_back() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");
        let store = ConfigStore::open(&path);
        assert_eq!(store.snapshot(), Configuration::default());

        store
            .update(|c| c.set_server("http://jf:8096/", "secret"))
            .unwrap();
        store.update(|c| c.set_user("u1", "alice")).unwrap();

        let reopened = ConfigStore::open(&path);
        let config = reopened.reload().unwrap();
        assert_eq!(config.jellyfin_url, "http://jf:8096");
        assert_eq!(config.api_key, "secret");
        assert_eq!(config.user_id, "u1");
        assert_eq!(config.user_name, "alice");
        assert!(config.is_complete());
    }

    #[test]
    fn reads_file_with_missing_fields() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"jellyfin_url":"http://jf","api_key":"k"}"#).unwrap();

        let config = Configuration::from_file(&path).unwrap();
        assert!(config.is_server_configured());
        assert!(config.user_id.is_empty());
    }

    #[test]
    fn corrupt_file_starts_empty_and_is_replaced_on_save() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{ not json").unwrap();

        let store = ConfigStore::open(&path);
        assert_eq!(store.snapshot(), Configuration::default());
        assert!(store.reload().is_err());

        store.update(|c| c.set_server("http://jf", "key")).unwrap();
        let config = Configuration::from_file(&path).unwrap();
        assert_eq!(config.jellyfin_url, "http://jf");
    }

    #[test]
    fn api_key_is_stored_as_entered() {
        let mut config = Configuration::default();
        config.set_server("http://jf", " key with spaces ");
        assert_eq!(config.api_key, " key with spaces ");
    }

    #[test]
    fn reload_fails_without_file() {
        let dir = tempdir().unwrap();
        let store = ConfigStore::open(dir.path().join("config.json"));
        assert!(store.reload().is_err());
    }
}
