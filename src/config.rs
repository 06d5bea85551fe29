use serde::Deserialize;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

const DEFAULT_AUTH_URL: &str = "https://identitytoolkit.googleapis.com";
const DEFAULT_DOCUMENTS_URL: &str = "https://firestore.googleapis.com";
const APP_DIR: &str = "noted";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config file: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("{0} is set but {1} is missing")]
    Incomplete(&'static str, &'static str),
}

/// Contents of `config.toml`; every key is optional.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub api_key: Option<String>,
    pub project_id: Option<String>,
    pub auth_url: Option<String>,
    pub documents_url: Option<String>,
    pub log_level: Option<String>,
    pub data_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendConfig {
    pub api_key: String,
    pub project_id: String,
    pub auth_url: String,
    pub documents_url: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// `None` runs the app in demo mode on the in-memory backend.
    pub backend: Option<BackendConfig>,
    pub log_level: String,
    pub data_dir: PathBuf,
}

impl Config {
    /// Loads `.env`, then `config.toml`, then applies environment overrides.
    pub fn load() -> Result<Config, ConfigError> {
        dotenv::dotenv().ok();
        let file = match config_path() {
            Some(path) if path.exists() => read_file(&path)?,
            _ => FileConfig::default(),
        };
        Config::resolve(file, |key| env::var(key).ok())
    }

    pub fn resolve(
        file: FileConfig,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Config, ConfigError> {
        let pick = |key: &str, fallback: Option<String>| {
            env(key)
                .filter(|value| !value.trim().is_empty())
                .or(fallback)
        };

        let api_key = pick("NOTED_API_KEY", file.api_key);
        let project_id = pick("NOTED_PROJECT_ID", file.project_id);
        let auth_url = pick("NOTED_AUTH_URL", file.auth_url)
            .unwrap_or_else(|| DEFAULT_AUTH_URL.to_string());
        let documents_url = pick("NOTED_DOCUMENTS_URL", file.documents_url)
            .unwrap_or_else(|| DEFAULT_DOCUMENTS_URL.to_string());

        let backend = match (api_key, project_id) {
            (Some(api_key), Some(project_id)) => Some(BackendConfig {
                api_key,
                project_id,
                auth_url,
                documents_url,
            }),
            (Some(_), None) => return Err(ConfigError::Incomplete("NOTED_API_KEY", "NOTED_PROJECT_ID")),
            (None, Some(_)) => return Err(ConfigError::Incomplete("NOTED_PROJECT_ID", "NOTED_API_KEY")),
            (None, None) => None,
        };

        let log_level = pick("NOTED_LOG_LEVEL", file.log_level)
            .unwrap_or_else(|| crate::logging::default_log_level().to_string());
        let data_dir = pick("NOTED_DATA_DIR", None)
            .map(PathBuf::from)
            .or(file.data_dir)
            .unwrap_or_else(default_data_dir);

        Ok(Config {
            backend,
            log_level,
            data_dir,
        })
    }

    pub fn is_demo(&self) -> bool {
        self.backend.is_none()
    }

    pub fn preferences_path(&self) -> PathBuf {
        self.data_dir.join("preferences.json")
    }

    pub fn log_dir(&self) -> PathBuf {
        self.data_dir.join("logs")
    }
}

pub fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(APP_DIR).join("config.toml"))
}

fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .map(|dir| dir.join(APP_DIR))
        .unwrap_or_else(|| PathBuf::from(".noted"))
}

fn read_file(path: &Path) -> Result<FileConfig, ConfigError> {
    let raw = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(toml::from_str(&raw)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_no_credentials_means_demo() {
        let config = Config::resolve(FileConfig::default(), env_of(&[])).unwrap();
        assert!(config.is_demo());
        assert!(config.preferences_path().ends_with("preferences.json"));
    }

    #[test]
    fn test_env_overrides_file() {
        let file: FileConfig = toml::from_str(
            r#"
            api_key = "file-key"
            project_id = "file-project"
            log_level = "warn"
            "#,
        )
        .unwrap();
        let config = Config::resolve(
            file,
            env_of(&[("NOTED_API_KEY", "env-key"), ("NOTED_DATA_DIR", "/tmp/noted")]),
        )
        .unwrap();

        let backend = config.backend.unwrap();
        assert_eq!(backend.api_key, "env-key");
        assert_eq!(backend.project_id, "file-project");
        assert_eq!(backend.auth_url, DEFAULT_AUTH_URL);
        assert_eq!(config.log_level, "warn");
        assert_eq!(config.data_dir, PathBuf::from("/tmp/noted"));
    }

    #[test]
    fn test_blank_env_value_is_ignored() {
        let file = FileConfig {
            project_id: Some("p".to_string()),
            api_key: Some("k".to_string()),
            ..FileConfig::default()
        };
        let config = Config::resolve(file, env_of(&[("NOTED_API_KEY", "  ")])).unwrap();
        assert_eq!(config.backend.unwrap().api_key, "k");
    }

    #[test]
    fn test_half_configured_backend_is_rejected() {
        let result = Config::resolve(FileConfig::default(), env_of(&[("NOTED_API_KEY", "k")]));
        assert!(matches!(
            result,
            Err(ConfigError::Incomplete("NOTED_API_KEY", "NOTED_PROJECT_ID"))
        ));
    }
}
