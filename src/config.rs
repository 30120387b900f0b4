//! Startup configuration: an optional JSON file in the platform config
//! directory, overridden by `FINTRACK_*` environment variables. Loaded once
//! and carried in an [`AppContext`].

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use serde::Deserialize;

use crate::db::Database;
use crate::ledger::Ledger;
use crate::notify::LogNotifier;

pub const ENV_DATABASE: &str = "FINTRACK_DATABASE";
pub const ENV_SIGNING_KEY: &str = "FINTRACK_SIGNING_KEY";
pub const ENV_LOG: &str = "FINTRACK_LOG";

pub const DEFAULT_LOG_FILTER: &str = "fintrack=info";
const CONFIG_FILE: &str = "config.json";
const DATABASE_FILE: &str = "fintrack.db";
const MIN_KEY_LEN: usize = 32;

/// Secret used to sign access tokens. Never printed.
///
/// The ledger itself never reads it: identity and token issuance live in the
/// service wrapping this crate, which takes the key from
/// [`AppContext::config`] at startup. Only its length is checked here.
#[derive(Clone, PartialEq, Eq)]
pub struct SigningKey(String);

impl SigningKey {
    pub fn new(key: impl Into<String>) -> Result<Self> {
        let key = key.into();
        if key.len() < MIN_KEY_LEN {
            bail!("signing key must be at least {MIN_KEY_LEN} bytes, got {}", key.len());
        }
        Ok(Self(key))
    }

    /// Raw key material for the token signer.
    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

impl fmt::Debug for SigningKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SigningKey(<redacted>)")
    }
}

/// On-disk shape; every field is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct FileConfig {
    database_path: Option<PathBuf>,
    signing_key: Option<String>,
    log_filter: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub database_path: PathBuf,
    /// Trust root handed to the token issuer. `None` when unset.
    pub signing_key: Option<SigningKey>,
    pub log_filter: String,
}

impl Config {
    /// Load from the platform config directory and the process environment.
    pub fn load() -> Result<Self> {
        let dirs = directories::ProjectDirs::from("com", "fintrack", "fintrack")
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;
        Self::resolve(
            &dirs.config_dir().join(CONFIG_FILE),
            dirs.data_dir().join(DATABASE_FILE),
            |name| std::env::var(name).ok(),
        )
    }

    /// Merge defaults, the file at `file_path` (if it exists) and `env`, in
    /// increasing precedence.
    pub fn resolve(
        file_path: &Path,
        default_database: PathBuf,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self> {
        let file = if file_path.exists() {
            let data = fs::read_to_string(file_path)
                .with_context(|| format!("Failed to read config: {}", file_path.display()))?;
            serde_json::from_str::<FileConfig>(&data)
                .with_context(|| format!("Invalid config file: {}", file_path.display()))?
        } else {
            FileConfig::default()
        };

        let database_path = env(ENV_DATABASE)
            .map(PathBuf::from)
            .or(file.database_path)
            .unwrap_or(default_database);
        let signing_key = env(ENV_SIGNING_KEY)
            .or(file.signing_key)
            .filter(|k| !k.is_empty())
            .map(SigningKey::new)
            .transpose()
            .context("Invalid signing key")?;
        let log_filter = env(ENV_LOG)
            .or(file.log_filter)
            .unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string());

        Ok(Self {
            database_path,
            signing_key,
            log_filter,
        })
    }
}

/// Process-wide state built once at startup.
pub struct AppContext {
    pub config: Config,
    pub ledger: Ledger,
}

impl AppContext {
    pub fn open(config: Config) -> Result<Self> {
        if let Some(dir) = config.database_path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create data directory: {}", dir.display()))?;
        }
        let db = Database::open(&config.database_path)?;
        let ledger = Ledger::new(db).with_notifier(Box::new(LogNotifier));
        tracing::debug!(
            database = %config.database_path.display(),
            signing_key = ?config.signing_key,
            "context ready"
        );
        Ok(Self { config, ledger })
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use std::collections::HashMap;

    const KEY: &str = "0123456789abcdef0123456789abcdef";

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_defaults_without_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::resolve(
            &dir.path().join("missing.json"),
            dir.path().join("default.db"),
            env(&[]),
        )
        .unwrap();
        assert_eq!(config.database_path, dir.path().join("default.db"));
        assert!(config.signing_key.is_none());
        assert_eq!(config.log_filter, DEFAULT_LOG_FILTER);
    }

    #[test]
    fn test_env_overrides_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(
            &path,
            format!(r#"{{"database_path": "/tmp/file.db", "signing_key": "{KEY}", "log_filter": "debug"}}"#),
        )
        .unwrap();

        let from_file = Config::resolve(&path, dir.path().join("d.db"), env(&[])).unwrap();
        assert_eq!(from_file.database_path, PathBuf::from("/tmp/file.db"));
        assert_eq!(from_file.signing_key.unwrap().as_bytes(), KEY.as_bytes());
        assert_eq!(from_file.log_filter, "debug");

        let overridden = Config::resolve(
            &path,
            dir.path().join("d.db"),
            env(&[(ENV_DATABASE, "/tmp/env.db"), (ENV_LOG, "warn")]),
        )
        .unwrap();
        assert_eq!(overridden.database_path, PathBuf::from("/tmp/env.db"));
        assert_eq!(overridden.log_filter, "warn");
    }

    #[test]
    fn test_short_signing_key_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let result = Config::resolve(
            &dir.path().join("none.json"),
            dir.path().join("d.db"),
            env(&[(ENV_SIGNING_KEY, "short")]),
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_unknown_field_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{"databse_path": "typo.db"}"#).unwrap();
        assert!(Config::resolve(&path, dir.path().join("d.db"), env(&[])).is_err());
    }

    #[test]
    fn test_signing_key_debug_is_redacted() {
        let key = SigningKey::new(KEY).unwrap();
        let shown = format!("{key:?}");
        assert!(!shown.contains(KEY));
        assert_eq!(shown, "SigningKey(<redacted>)");
    }

    #[test]
    fn test_context_creates_database() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config {
            database_path: dir.path().join("nested").join("ledger.db"),
            signing_key: None,
            log_filter: DEFAULT_LOG_FILTER.to_string(),
        };
        let mut ctx = AppContext::open(config).unwrap();
        assert!(dir.path().join("nested").join("ledger.db").exists());
        let user = ctx.ledger.create_user("Alice", "alice").unwrap();
        assert!(ctx.ledger.list_accounts(user.id).unwrap().is_empty());
    }
}
