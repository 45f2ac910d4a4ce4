use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use jsonschema::{validator_for, Validator};
use once_cell::sync::Lazy;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

const DEFAULT_BIND: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 3000;
const DEFAULT_CONFIG_REL: &str = "configs/default.toml";
const DB_FILE: &str = "contacts.sqlite";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    #[default]
    Sqlite,
    Memory,
}

impl std::str::FromStr for StoreBackend {
    type Err = SettingsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sqlite" => Ok(StoreBackend::Sqlite),
            "memory" | "mem" => Ok(StoreBackend::Memory),
            _ => Err(SettingsError::InvalidBackend(s.to_string())),
        }
    }
}

#[derive(Debug, Default, Deserialize, Serialize, JsonSchema)]
pub struct ServerConfig {
    /// Interface address for the HTTP surface
    #[serde(default)]
    pub bind: Option<String>,
    /// HTTP port for the HTTP surface
    #[serde(default)]
    pub port: Option<u16>,
}

#[derive(Debug, Default, Deserialize, Serialize, JsonSchema)]
pub struct StoreConfig {
    /// Storage engine: "sqlite" (default) or "memory".
    #[serde(default)]
    pub backend: Option<StoreBackend>,
    /// SQLite database file; defaults to the per-user data directory.
    #[serde(default)]
    pub path: Option<String>,
}

#[derive(Debug, Default, Deserialize, Serialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub store: StoreConfig,
}

static CONFIG_SCHEMA: Lazy<Validator> = Lazy::new(|| {
    let schema_value = config_schema_json();
    validator_for(&schema_value).expect("valid schema")
});

/// Returns the JSON schema describing the configuration file.
///
/// # Panics
///
/// Panics if schema generation fails; this indicates a programming error.
pub fn config_schema_json() -> serde_json::Value {
    let schema = schemars::schema_for!(Config);
    serde_json::to_value(&schema).expect("schema json")
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    let raw: toml::Value = toml::from_str(&content)
        .with_context(|| format!("failed to parse config {}", path.display()))?;
    let json_value = serde_json::to_value(&raw)?;
    let validation_errors: Vec<_> = CONFIG_SCHEMA
        .iter_errors(&json_value)
        .map(|e| e.to_string())
        .collect();
    if !validation_errors.is_empty() {
        return Err(anyhow::anyhow!(
            "invalid config {}: {}",
            path.display(),
            validation_errors.join(", ")
        ));
    }
    let cfg: Config = toml::from_str(&content)?;
    Ok(cfg)
}

/// Loads the config named by `ROLODEX_CONFIG`, or `configs/default.toml` when
/// it exists in the working directory. An explicitly named file must load.
pub fn resolve_config() -> Result<Option<Config>> {
    if let Some(explicit) = std::env::var_os("ROLODEX_CONFIG") {
        let path = PathBuf::from(explicit);
        return load_config(&path).map(Some);
    }
    let fallback = Path::new(DEFAULT_CONFIG_REL);
    if !fallback.exists() {
        return Ok(None);
    }
    match load_config(fallback) {
        Ok(cfg) => Ok(Some(cfg)),
        Err(err) => {
            tracing::error!(path = %fallback.display(), error = %err, "ignoring invalid config");
            Ok(None)
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("invalid ROLODEX_PORT: {0}")]
    InvalidPort(String),
    #[error("invalid ROLODEX_STORE: {0}")]
    InvalidBackend(String),
    #[error(transparent)]
    Config(#[from] anyhow::Error),
}

/// Effective runtime settings after config file and environment overlays.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub bind: String,
    pub port: u16,
    pub backend: StoreBackend,
    pub db_path: PathBuf,
}

impl Settings {
    pub fn from_env() -> Result<Self, SettingsError> {
        let cfg = resolve_config()?;
        Self::resolve(cfg.as_ref(), |key| std::env::var(key).ok())
    }

    /// Environment values win over the config file, which wins over defaults.
    pub fn resolve<F>(cfg: Option<&Config>, env: F) -> Result<Self, SettingsError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let bind = env("ROLODEX_BIND")
            .filter(|v| !v.trim().is_empty())
            .or_else(|| cfg.and_then(|c| c.server.bind.clone()))
            .unwrap_or_else(|| DEFAULT_BIND.to_string());

        let port = match env("ROLODEX_PORT") {
            Some(raw) => raw
                .trim()
                .parse()
                .map_err(|_| SettingsError::InvalidPort(raw))?,
            None => cfg.and_then(|c| c.server.port).unwrap_or(DEFAULT_PORT),
        };

        let backend = match env("ROLODEX_STORE") {
            Some(raw) => raw.parse()?,
            None => cfg.and_then(|c| c.store.backend).unwrap_or_default(),
        };

        let db_path = env("ROLODEX_DB")
            .filter(|v| !v.trim().is_empty())
            .or_else(|| cfg.and_then(|c| c.store.path.clone()))
            .map(PathBuf::from)
            .unwrap_or_else(default_db_path);

        Ok(Self {
            bind,
            port,
            backend,
            db_path,
        })
    }
}

pub fn default_db_path() -> PathBuf {
    directories::ProjectDirs::from("org", "rolodex", "rolodex")
        .map(|dirs| dirs.data_local_dir().join(DB_FILE))
        .unwrap_or_else(|| PathBuf::from(".rolodex").join(DB_FILE))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::tempdir;

    fn env_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply_without_config_or_env() {
        let settings = Settings::resolve(None, env_from(&[])).expect("settings");
        assert_eq!(settings.bind, "127.0.0.1");
        assert_eq!(settings.port, 3000);
        assert_eq!(settings.backend, StoreBackend::Sqlite);
        assert!(settings.db_path.ends_with("contacts.sqlite"));
    }

    #[test]
    fn env_overrides_config_file() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("rolodex.toml");
        std::fs::write(
            &path,
            "[server]\nport = 8080\n\n[store]\nbackend = \"memory\"\n",
        )
        .expect("write config");
        let cfg = load_config(&path).expect("load config");
        assert_eq!(cfg.server.port, Some(8080));

        let settings =
            Settings::resolve(Some(&cfg), env_from(&[("ROLODEX_PORT", "9090")])).expect("settings");
        assert_eq!(settings.port, 9090);
        assert_eq!(settings.backend, StoreBackend::Memory);
    }

    #[test]
    fn schema_rejects_wrong_types() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("bad.toml");
        std::fs::write(&path, "[server]\nport = \"eighty\"\n").expect("write config");
        let err = load_config(&path).unwrap_err();
        assert!(err.to_string().contains("invalid config"), "{err}");
    }

    #[test]
    fn invalid_env_values_are_typed_errors() {
        let err = Settings::resolve(None, env_from(&[("ROLODEX_PORT", "http")])).unwrap_err();
        assert!(matches!(err, SettingsError::InvalidPort(ref raw) if raw == "http"));

        let err = Settings::resolve(None, env_from(&[("ROLODEX_STORE", "mongo")])).unwrap_err();
        assert!(matches!(err, SettingsError::InvalidBackend(_)));
    }
}
