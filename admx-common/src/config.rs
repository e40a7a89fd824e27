//! Configuration loading and root folder resolution

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Service configuration loaded from `config.toml` in the root folder
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Ad account identifier (numeric string, without the platform prefix)
    pub account_id: String,
    /// Platform API access token
    pub access_token: String,
    /// Platform API base URL
    pub api_base_url: String,
    /// ISO currency code of the ad account (drives minor-unit handling)
    pub currency: String,
    pub bind_host: String,
    pub bind_port: u16,
    /// Seconds between background catalog/insight refreshes
    pub sync_interval_secs: u64,
    /// How many days of insight history each refresh fetches
    pub insight_window_days: u32,
    /// Delay before the post-toggle catalog confirmation re-fetch
    pub toggle_confirm_delay_ms: u64,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            account_id: String::new(),
            access_token: String::new(),
            api_base_url: "https://graph.facebook.com/v18.0".to_string(),
            currency: "VND".to_string(),
            bind_host: "127.0.0.1".to_string(),
            bind_port: 5830,
            sync_interval_secs: 300,
            insight_window_days: 30,
            toggle_confirm_delay_ms: 2000,
        }
    }
}

impl ServiceConfig {
    /// Load from a TOML file, falling back to defaults when absent
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::warn!("Config file {} not found, using defaults", path.display());
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))
    }
}

/// Root folder resolution priority order:
/// 1. Command-line argument (highest priority)
/// 2. Environment variable
/// 3. TOML config file
/// 4. OS-dependent compiled default (fallback)
pub fn resolve_root_folder(cli_arg: Option<&str>, env_var_name: &str) -> PathBuf {
    // Priority 1: Command-line argument
    if let Some(path) = cli_arg {
        return PathBuf::from(path);
    }

    // Priority 2: Environment variable
    if let Ok(path) = std::env::var(env_var_name) {
        return PathBuf::from(path);
    }

    // Priority 3: TOML config file
    if let Ok(config_path) = locate_config_file() {
        if let Ok(toml_content) = std::fs::read_to_string(&config_path) {
            if let Ok(config) = toml::from_str::<toml::Value>(&toml_content) {
                if let Some(root_folder) = config.get("root_folder").and_then(|v| v.as_str()) {
                    return PathBuf::from(root_folder);
                }
            }
        }
    }

    // Priority 4: OS-dependent compiled default
    default_root_folder()
}

/// Get default configuration file path for the platform
fn locate_config_file() -> Result<PathBuf> {
    if cfg!(target_os = "linux") {
        // Try ~/.config/admx/config.toml first, then /etc/admx/config.toml
        if let Some(path) = dirs::config_dir().map(|d| d.join("admx").join("config.toml")) {
            if path.exists() {
                return Ok(path);
            }
        }
        let system_config = PathBuf::from("/etc/admx/config.toml");
        if system_config.exists() {
            return Ok(system_config);
        }
        Err(Error::Config("No config file found".to_string()))
    } else {
        let path = dirs::config_dir()
            .map(|d| d.join("admx").join("config.toml"))
            .ok_or_else(|| Error::Config("Could not determine config directory".to_string()))?;
        if path.exists() {
            Ok(path)
        } else {
            Err(Error::Config(format!("Config file not found: {:?}", path)))
        }
    }
}

/// Get OS-dependent default root folder path
fn default_root_folder() -> PathBuf {
    if cfg!(target_os = "linux") {
        dirs::data_local_dir()
            .map(|d| d.join("admx"))
            .unwrap_or_else(|| PathBuf::from("/var/lib/admx"))
    } else if cfg!(target_os = "macos") {
        dirs::data_dir()
            .map(|d| d.join("admx"))
            .unwrap_or_else(|| PathBuf::from("/Library/Application Support/admx"))
    } else if cfg!(target_os = "windows") {
        dirs::data_local_dir()
            .map(|d| d.join("admx"))
            .unwrap_or_else(|| PathBuf::from("C:\\ProgramData\\admx"))
    } else {
        PathBuf::from("./admx_data")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_arg_wins() {
        let path = resolve_root_folder(Some("/tmp/admx-test"), "ADMX_TEST_UNSET_VAR");
        assert_eq!(path, PathBuf::from("/tmp/admx-test"));
    }

    #[test]
    fn test_env_var_used_when_no_cli_arg() {
        std::env::set_var("ADMX_TEST_ROOT", "/tmp/admx-env");
        let path = resolve_root_folder(None, "ADMX_TEST_ROOT");
        assert_eq!(path, PathBuf::from("/tmp/admx-env"));
        std::env::remove_var("ADMX_TEST_ROOT");
    }

    #[test]
    fn test_config_defaults() {
        let config = ServiceConfig::default();
        assert_eq!(config.currency, "VND");
        assert_eq!(config.sync_interval_secs, 300);
        assert_eq!(config.toggle_confirm_delay_ms, 2000);
    }

    #[test]
    fn test_config_load_missing_file_is_default() {
        let config = ServiceConfig::load(Path::new("/nonexistent/config.toml")).unwrap();
        assert_eq!(config.bind_port, 5830);
    }

    #[test]
    fn test_config_load_partial_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "account_id = \"1234\"\ncurrency = \"USD\"\n").unwrap();
        let config = ServiceConfig::load(&path).unwrap();
        assert_eq!(config.account_id, "1234");
        assert_eq!(config.currency, "USD");
        // Unspecified keys fall back to defaults
        assert_eq!(config.sync_interval_secs, 300);
    }
}
