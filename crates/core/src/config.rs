//! Layered configuration: built-in defaults, optional file, then `AUTHDASH_*` environment

use crate::error::{CoreError, CoreResult};
use crate::validation::{ValidateConfig, validators};
use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Base URL of the auth service used when nothing else is configured
pub const DEFAULT_BASE_URL: &str = "http://localhost:5000/api";

/// Default request timeout in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

const ENV_PREFIX: &str = "AUTHDASH";
const MAX_TIMEOUT_SECS: u64 = 600;

fn default_user_agent() -> String {
    format!("authdash-client/{}", env!("CARGO_PKG_VERSION"))
}

/// Top-level dashboard configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct DashboardConfig {
    #[serde(default)]
    pub api: ApiConfig,
}

/// Connection settings for the remote auth service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiConfig {
    pub base_url: String,
    /// Per-request timeout, 0 disables it
    pub timeout_secs: u64,
    pub user_agent: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            user_agent: default_user_agent(),
        }
    }
}

impl ApiConfig {
    /// Request timeout, `None` when disabled
    pub fn timeout(&self) -> Option<Duration> {
        (self.timeout_secs > 0).then(|| Duration::from_secs(self.timeout_secs))
    }
}

impl ValidateConfig for DashboardConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        validators::validate_not_empty(&self.api.base_url, "api.base_url")?;
        validators::validate_url(&self.api.base_url, "api.base_url")?;
        validators::validate_range(self.api.timeout_secs, 0, MAX_TIMEOUT_SECS, "api.timeout_secs")?;
        validators::validate_not_empty(&self.api.user_agent, "api.user_agent")?;
        Ok(())
    }
}

impl DashboardConfig {
    /// Load configuration, layering an optional file and the environment over defaults
    pub fn load(path: Option<&Path>) -> CoreResult<Self> {
        let defaults = ApiConfig::default();
        let mut builder = Config::builder()
            .set_default("api.base_url", defaults.base_url)?
            .set_default("api.timeout_secs", defaults.timeout_secs)?
            .set_default("api.user_agent", defaults.user_agent)?;

        if let Some(path) = path {
            builder = builder.add_source(File::from(path).required(true));
        }

        let settings = builder
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let config: Self = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Render as TOML
    pub fn to_toml(&self) -> CoreResult<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Write configuration as TOML, creating parent directories
    pub fn save<P: AsRef<Path>>(&self, path: P) -> CoreResult<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| CoreError::io(parent, e))?;
        }
        std::fs::write(path, self.to_toml()?).map_err(|e| CoreError::io(path, e))?;
        Ok(())
    }
}
