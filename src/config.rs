// Config store: the single persisted identity record (hub URL plus the
// credentials issued by login, agent registration or invite redemption).
// Callers load, modify and save the whole record; there is no merging at
// this layer and no locking.

use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Hub address used when nothing else is configured.
pub const DEFAULT_HUB_URL: &str = "http://localhost:3000";

/// Environment variable that overrides the fixed config file location.
pub const CONFIG_PATH_ENV: &str = "AGENTHQ_CONFIG";

/// Failures while reading or writing the config file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not determine the home directory")]
    NoHomeDir,

    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed config at {}: {source}", path.display())]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to serialize config: {0}")]
    Encode(#[source] serde_json::Error),
}

/// Persisted connection identity. Field names match the on-disk JSON.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Config {
    #[serde(default)]
    pub hub_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jwt_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub org_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent_id: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            hub_url: DEFAULT_HUB_URL.to_string(),
            api_key: None,
            jwt_token: None,
            org_id: None,
            agent_id: None,
        }
    }
}

impl Config {
    /// The record written on logout: default hub, no credentials.
    pub fn cleared() -> Self {
        Config::default()
    }

    /// Bearer credential for this identity. The API key wins over the
    /// session token; empty strings count as unset.
    pub fn auth_token(&self) -> Option<&str> {
        non_empty(&self.api_key).or_else(|| non_empty(&self.jwt_token))
    }

    /// True when an agent API key is configured.
    pub fn is_agent(&self) -> bool {
        non_empty(&self.api_key).is_some()
    }
}

fn non_empty(field: &Option<String>) -> Option<&str> {
    field.as_deref().filter(|s| !s.is_empty())
}

/// Location of the config file on disk.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    path: PathBuf,
}

impl ConfigStore {
    /// Store backed by an explicit file path.
    pub fn at(path: impl Into<PathBuf>) -> Self {
        ConfigStore { path: path.into() }
    }

    /// `$AGENTHQ_CONFIG` if set, otherwise `~/.config/agenthq/config.json`.
    pub fn default_location() -> Result<Self, ConfigError> {
        if let Some(path) = std::env::var_os(CONFIG_PATH_ENV).filter(|p| !p.is_empty()) {
            return Ok(ConfigStore::at(path));
        }
        let home = dirs::home_dir().ok_or(ConfigError::NoHomeDir)?;
        Ok(ConfigStore::at(
            home.join(".config").join("agenthq").join("config.json"),
        ))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the record. A missing file is the first-run state and yields
    /// the default config rather than an error.
    pub fn load(&self) -> Result<Config, ConfigError> {
        let data = match fs::read(&self.path) {
            Ok(data) => data,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %self.path.display(), "no config file, using defaults");
                return Ok(Config::default());
            }
            Err(source) => {
                return Err(ConfigError::Read {
                    path: self.path.clone(),
                    source,
                })
            }
        };

        let mut cfg: Config =
            serde_json::from_slice(&data).map_err(|source| ConfigError::Malformed {
                path: self.path.clone(),
                source,
            })?;
        if cfg.hub_url.is_empty() {
            cfg.hub_url = DEFAULT_HUB_URL.to_string();
        }
        Ok(cfg)
    }

    /// Overwrite the record, creating the parent directory if needed.
    pub fn save(&self, cfg: &Config) -> Result<(), ConfigError> {
        let write_err = |source| ConfigError::Write {
            path: self.path.clone(),
            source,
        };

        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            create_private_dir(dir).map_err(write_err)?;
        }

        let data = serde_json::to_vec_pretty(cfg).map_err(ConfigError::Encode)?;
        let mut file = open_private_file(&self.path).map_err(write_err)?;
        file.write_all(&data).map_err(write_err)?;
        tracing::debug!(path = %self.path.display(), "config saved");
        Ok(())
    }
}

#[cfg(unix)]
fn create_private_dir(dir: &Path) -> std::io::Result<()> {
    use std::os::unix::fs::DirBuilderExt;
    fs::DirBuilder::new().recursive(true).mode(0o700).create(dir)
}

#[cfg(not(unix))]
fn create_private_dir(dir: &Path) -> std::io::Result<()> {
    fs::create_dir_all(dir)
}

#[cfg(unix)]
fn open_private_file(path: &Path) -> std::io::Result<fs::File> {
    use std::os::unix::fs::{OpenOptionsExt, PermissionsExt};
    let file = fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(0o600)
        .open(path)?;
    // mode() only applies on creation; tighten files left by older versions
    file.set_permissions(fs::Permissions::from_mode(0o600))?;
    Ok(file)
}

#[cfg(not(unix))]
fn open_private_file(path: &Path) -> std::io::Result<fs::File> {
    fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn store_in(dir: &TempDir) -> ConfigStore {
        ConfigStore::at(dir.path().join(".config").join("agenthq").join("config.json"))
    }

    #[test]
    fn load_missing_file_returns_defaults() {
        let dir = TempDir::new().unwrap();
        let cfg = store_in(&dir).load().unwrap();
        assert_eq!(cfg.hub_url, DEFAULT_HUB_URL);
        assert_eq!(cfg.api_key, None);
        assert_eq!(cfg.jwt_token, None);
        assert_eq!(cfg.org_id, None);
        assert_eq!(cfg.agent_id, None);
    }

    #[test]
    fn save_then_load_round_trips() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        let cfg = Config {
            hub_url: "https://example.com".into(),
            api_key: Some("ahq_testkey123".into()),
            jwt_token: Some("jwt-token-abc".into()),
            org_id: Some("org-123".into()),
            agent_id: Some("agent-456".into()),
        };
        store.save(&cfg).unwrap();
        assert_eq!(store.load().unwrap(), cfg);
    }

    #[test]
    fn empty_hub_url_is_normalized() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        fs::create_dir_all(store.path().parent().unwrap()).unwrap();
        fs::write(store.path(), r#"{"hub_url":"","api_key":"ahq_key"}"#).unwrap();

        let cfg = store.load().unwrap();
        assert_eq!(cfg.hub_url, DEFAULT_HUB_URL);
        assert_eq!(cfg.api_key.as_deref(), Some("ahq_key"));
    }

    #[test]
    fn reads_records_with_empty_string_fields() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        fs::create_dir_all(store.path().parent().unwrap()).unwrap();
        fs::write(
            store.path(),
            r#"{"hub_url":"http://hub","api_key":"","jwt_token":"jwt","org_id":"","agent_id":""}"#,
        )
        .unwrap();

        let cfg = store.load().unwrap();
        assert_eq!(cfg.auth_token(), Some("jwt"));
        assert!(!cfg.is_agent());
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        fs::create_dir_all(store.path().parent().unwrap()).unwrap();
        fs::write(store.path(), "{not json").unwrap();

        let err = store.load().unwrap_err();
        assert!(matches!(err, ConfigError::Malformed { .. }), "got {err:?}");
    }

    #[test]
    fn unreadable_path_is_a_read_error() {
        let dir = TempDir::new().unwrap();
        // a directory exists where the file should be
        let store = ConfigStore::at(dir.path());

        let err = store.load().unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }), "got {err:?}");
    }

    // Only test in this binary that touches AGENTHQ_CONFIG.
    #[test]
    fn default_location_honours_env_then_home() {
        let dir = TempDir::new().unwrap();
        let custom = dir.path().join("custom.json");

        std::env::set_var(CONFIG_PATH_ENV, &custom);
        let store = ConfigStore::default_location().unwrap();
        assert_eq!(store.path(), custom.as_path());

        std::env::set_var(CONFIG_PATH_ENV, "");
        let fallback = ConfigStore::default_location();
        std::env::remove_var(CONFIG_PATH_ENV);
        let unset = ConfigStore::default_location();

        match dirs::home_dir() {
            Some(home) => {
                let expected = home.join(".config").join("agenthq").join("config.json");
                assert_eq!(fallback.unwrap().path(), expected.as_path());
                assert_eq!(unset.unwrap().path(), expected.as_path());
            }
            None => assert!(matches!(unset, Err(ConfigError::NoHomeDir))),
        }
    }

    #[test]
    fn save_overwrites_whole_record() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        store
            .save(&Config {
                api_key: Some("old".into()),
                agent_id: Some("agent-1".into()),
                ..Config::default()
            })
            .unwrap();
        store.save(&Config::cleared()).unwrap();

        assert_eq!(store.load().unwrap(), Config::cleared());
    }

    #[cfg(unix)]
    #[test]
    fn saved_file_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        store.save(&Config::default()).unwrap();

        let file_mode = fs::metadata(store.path()).unwrap().permissions().mode();
        assert_eq!(file_mode & 0o777, 0o600);
        let dir_mode = fs::metadata(store.path().parent().unwrap())
            .unwrap()
            .permissions()
            .mode();
        assert_eq!(dir_mode & 0o777, 0o700);
    }

    #[test]
    fn auth_token_prefers_api_key() {
        let both = Config {
            api_key: Some("key".into()),
            jwt_token: Some("jwt".into()),
            ..Config::default()
        };
        assert_eq!(both.auth_token(), Some("key"));

        let jwt_only = Config {
            jwt_token: Some("jwt".into()),
            ..Config::default()
        };
        assert_eq!(jwt_only.auth_token(), Some("jwt"));

        let empty_key = Config {
            api_key: Some(String::new()),
            jwt_token: Some("jwt".into()),
            ..Config::default()
        };
        assert_eq!(empty_key.auth_token(), Some("jwt"));

        assert_eq!(Config::default().auth_token(), None);
    }
}
