use std::path::{Path, PathBuf};
use std::time::Duration;

use patchkit_core::{HashAlgorithm, RetryPolicy, UpdaterConfig};
use patchkit_platform::AppPaths;
use serde::{Deserialize, Serialize};
use thiserror::Error;

const UPDATE_SERVER: &str = "https://jombo.uk/t7x/";

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default = "default_manifest_url")]
    pub manifest_url: String,

    #[serde(default = "default_file_base_url")]
    pub file_base_url: String,

    #[serde(default = "default_host_binary_name")]
    pub host_binary_name: String,

    /// Defaults to the directory of the running executable.
    #[serde(default)]
    pub install_dir: Option<PathBuf>,

    #[serde(default = "default_bootstrap_assets")]
    pub bootstrap_assets: Vec<String>,

    #[serde(default = "default_placeholder_files")]
    pub placeholder_files: Vec<PathBuf>,

    /// Digest the manifest publishes.
    #[serde(default)]
    pub hash_algorithm: HashAlgorithm,

    #[serde(default = "default_cleanup_attempts")]
    pub cleanup_attempts: u32,

    #[serde(default = "default_cleanup_interval_ms")]
    pub cleanup_interval_ms: u64,

    #[serde(default)]
    pub debug_logging: bool,

    #[serde(default = "default_max_log_size_bytes")]
    pub max_log_size_bytes: u64,
}

fn default_manifest_url() -> String {
    format!("{UPDATE_SERVER}files.json")
}

fn default_file_base_url() -> String {
    UPDATE_SERVER.to_string()
}

fn default_host_binary_name() -> String {
    "boiii.exe".to_string()
}

fn default_bootstrap_assets() -> Vec<String> {
    vec!["data/launcher/main.html".to_string()]
}

fn default_placeholder_files() -> Vec<PathBuf> {
    vec![Path::new("Activision").join("CoD").join("config.ini")]
}

fn default_cleanup_attempts() -> u32 {
    4
}

fn default_cleanup_interval_ms() -> u64 {
    2000
}

fn default_max_log_size_bytes() -> u64 {
    5 * 1024 * 1024
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            manifest_url: default_manifest_url(),
            file_base_url: default_file_base_url(),
            host_binary_name: default_host_binary_name(),
            install_dir: None,
            bootstrap_assets: default_bootstrap_assets(),
            placeholder_files: default_placeholder_files(),
            hash_algorithm: HashAlgorithm::default(),
            cleanup_attempts: default_cleanup_attempts(),
            cleanup_interval_ms: default_cleanup_interval_ms(),
            debug_logging: false,
            max_log_size_bytes: default_max_log_size_bytes(),
        }
    }
}

impl Settings {
    /// Load `settings.json` from the application config directory.
    ///
    /// # Errors
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load(paths: Option<&AppPaths>) -> Result<Self, SettingsError> {
        match paths {
            Some(paths) => Self::from_file(&paths.settings_file()),
            None => Ok(Self::default()),
        }
    }

    /// # Errors
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self, SettingsError> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|source| SettingsError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&content).map_err(|source| SettingsError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    #[must_use]
    pub fn updater_config(&self) -> UpdaterConfig {
        UpdaterConfig {
            manifest_url: self.manifest_url.clone(),
            file_base_url: self.file_base_url.clone(),
            host_binary_name: self.host_binary_name.clone(),
            bootstrap_assets: self.bootstrap_assets.clone(),
            placeholder_files: self.placeholder_files.clone(),
            backup_cleanup: RetryPolicy {
                attempts: self.cleanup_attempts,
                interval: Duration::from_millis(self.cleanup_interval_ms),
            },
        }
    }
}
