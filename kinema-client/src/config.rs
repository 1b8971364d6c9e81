use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::errors::ConfigError;

pub const APP_DIR: &str = "kinema";
pub const CONFIG_FILE: &str = "config.json";
pub const TOKEN_STORE_FILE: &str = "tokens.enc";

pub const ENV_SERVER_URL: &str = "KINEMA_SERVER_URL";
pub const ENV_REQUEST_TIMEOUT: &str = "KINEMA_REQUEST_TIMEOUT";
pub const ENV_TOKEN_STORE: &str = "KINEMA_TOKEN_STORE";

const DEFAULT_SERVER_URL: &str = "http://localhost:3001";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub server_url: String,
    pub request_timeout_secs: u64,
    /// Overrides the platform data directory location of the token store
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token_store_path: Option<PathBuf>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            server_url: DEFAULT_SERVER_URL.to_string(),
            request_timeout_secs: DEFAULT_TIMEOUT_SECS,
            token_store_path: None,
        }
    }
}

impl ClientConfig {
    pub fn with_server_url(server_url: impl Into<String>) -> Self {
        Self {
            server_url: normalize_base_url(&server_url.into()),
            ..Self::default()
        }
    }

    /// Defaults, then the config file in the platform config dir, then
    /// environment overrides.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::default_config_path();
        Self::load_from(path.as_deref(), |key| std::env::var(key).ok())
    }

    /// Load from an explicit file (if it exists) and an environment lookup.
    pub fn load_from(
        path: Option<&Path>,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) if path.exists() => Self::read_file(path)?,
            _ => Self::default(),
        };
        config.apply_env(env)?;
        config.server_url = normalize_base_url(&config.server_url);
        Ok(config)
    }

    fn read_file(path: &Path) -> Result<Self, ConfigError> {
        let content =
            std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
                path: path.to_path_buf(),
                source,
            })?;
        serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    fn apply_env(
        &mut self,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<(), ConfigError> {
        if let Some(server_url) = env(ENV_SERVER_URL) {
            self.server_url = server_url;
        }
        if let Some(raw) = env(ENV_REQUEST_TIMEOUT) {
            let timeout = humantime::parse_duration(raw.trim()).map_err(|_| {
                ConfigError::InvalidValue {
                    key: ENV_REQUEST_TIMEOUT,
                    value: raw.clone(),
                }
            })?;
            self.request_timeout_secs = timeout.as_secs().max(1);
        }
        if let Some(path) = env(ENV_TOKEN_STORE) {
            self.token_store_path = Some(PathBuf::from(path));
        }
        Ok(())
    }

    pub fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(APP_DIR).join(CONFIG_FILE))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Configured token store location, else `<data dir>/kinema/tokens.enc`
    pub fn resolved_token_store_path(&self) -> Option<PathBuf> {
        self.token_store_path.clone().or_else(|| {
            dirs::data_dir().map(|dir| dir.join(APP_DIR).join(TOKEN_STORE_FILE))
        })
    }
}

/// Add a scheme when missing and trim trailing slashes, so that
/// "localhost:3001/" becomes "http://localhost:3001".
pub fn normalize_base_url(raw: &str) -> String {
    let trimmed = raw.trim().trim_end_matches('/');
    let with_scheme =
        if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
            trimmed.to_string()
        } else {
            format!("http://{}", trimmed)
        };
    if with_scheme != raw {
        log::debug!(
            "[ClientConfig] Normalized base URL from '{}' to '{}'",
            raw,
            with_scheme
        );
    }
    with_scheme
}
