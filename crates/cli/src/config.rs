//! CLI configuration utilities

use anyhow::{Context, Result, bail};
use authdash_core::{DashboardConfig, ValidateConfig};
use std::path::{Path, PathBuf};

const CONFIG_FILE_NAME: &str = "config.toml";
const STATE_DIR_ENV: &str = "AUTHDASH_STATE_DIR";

/// Resolve the data directory: explicit flag, then `AUTHDASH_STATE_DIR`, then the system data dir
pub fn resolve_data_dir(data_dir: Option<PathBuf>) -> PathBuf {
    data_dir.unwrap_or_else(|| {
        if let Ok(state_dir) = std::env::var(STATE_DIR_ENV) {
            PathBuf::from(state_dir)
        } else {
            dirs::data_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("authdash")
        }
    })
}

pub fn default_config_path(data_dir: &Path) -> PathBuf {
    data_dir.join(CONFIG_FILE_NAME)
}

/// Load the effective configuration
///
/// An explicit path must exist. Without one, `<data_dir>/config.toml` is used
/// when present. `base_url` replaces whatever the layers produced.
pub fn load_config(
    explicit: Option<&Path>,
    data_dir: &Path,
    base_url: Option<String>,
) -> Result<DashboardConfig> {
    let default_path = default_config_path(data_dir);
    let path = explicit.or_else(|| default_path.is_file().then_some(default_path.as_path()));

    let mut config = DashboardConfig::load(path).with_context(|| match path {
        Some(path) => format!("Failed to load configuration from {}", path.display()),
        None => "Failed to load configuration".to_string(),
    })?;

    if let Some(base_url) = base_url {
        config.api.base_url = base_url;
        config.validate().context("Invalid --base-url")?;
    }

    Ok(config)
}

/// Write a default configuration file
pub fn generate_default_config(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        bail!(
            "{} already exists, pass --force to overwrite",
            path.display()
        );
    }
    DashboardConfig::default().save(path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use authdash_core::DEFAULT_BASE_URL;
    use tempfile::TempDir;

    #[test]
    fn test_generate_then_load() {
        let dir = TempDir::new().unwrap();
        let path = default_config_path(dir.path());

        generate_default_config(&path, false).unwrap();
        let config = load_config(None, dir.path(), None).unwrap();

        assert_eq!(config.api.base_url, DEFAULT_BASE_URL);
    }

    #[test]
    fn test_generate_refuses_to_overwrite() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("custom.toml");

        generate_default_config(&path, false).unwrap();
        assert!(generate_default_config(&path, false).is_err());
        assert!(generate_default_config(&path, true).is_ok());
    }

    #[test]
    fn test_base_url_override() {
        let dir = TempDir::new().unwrap();
        let config = load_config(
            None,
            dir.path(),
            Some("https://auth.example.com/api".to_string()),
        )
        .unwrap();

        assert_eq!(config.api.base_url, "https://auth.example.com/api");
    }

    #[test]
    fn test_invalid_base_url_override_rejected() {
        let dir = TempDir::new().unwrap();
        let result = load_config(None, dir.path(), Some("ftp://nope".to_string()));
        assert!(result.is_err());
    }

    #[test]
    fn test_missing_explicit_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("missing.toml");
        assert!(load_config(Some(&missing), dir.path(), None).is_err());
    }
}
