/// Application configuration
///
/// Loaded from a JSON file in the user's config directory, written out as a
/// template on first run so the storage settings are easy to find and edit:
/// - Linux: ~/.config/camera-uploader/config.json
/// - macOS: ~/Library/Application Support/camera-uploader/config.json
/// - Windows: %APPDATA%\camera-uploader\config.json

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Where uploads go.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Bucket receiving the uploads.
    pub bucket: String,
    /// AWS region name; only consulted when `endpoint` is unset.
    pub region: String,
    /// Custom endpoint for S3-compatible stores (MinIO and friends).
    pub endpoint: Option<String>,
    /// Use path-style addressing, required by most self-hosted stores.
    pub path_style: bool,
    /// Fixed key prefix under which every upload lands.
    pub prefix: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            bucket: "captures".to_string(),
            region: "us-east-1".to_string(),
            endpoint: None,
            path_style: false,
            prefix: "photos".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub storage: StorageConfig,
}

impl AppConfig {
    /// Load the config file, falling back to defaults when it is missing or
    /// unreadable. A missing file is replaced with a default template.
    pub fn load_or_default() -> Self {
        let path = Self::config_path();

        match fs::read_to_string(&path) {
            Ok(raw) => match serde_json::from_str(&raw) {
                Ok(config) => config,
                Err(error) => {
                    warn!(%error, path = %path.display(), "config file is invalid, using defaults");
                    Self::default()
                }
            },
            Err(_) => {
                let config = Self::default();
                config.write_template(&path);
                config
            }
        }
    }

    fn write_template(&self, path: &Path) {
        if let Some(parent) = path.parent() {
            if let Err(error) = fs::create_dir_all(parent) {
                warn!(%error, "could not create config directory");
                return;
            }
        }

        if let Ok(raw) = serde_json::to_string_pretty(self) {
            match fs::write(path, raw) {
                Ok(()) => info!(path = %path.display(), "wrote default config"),
                Err(error) => warn!(%error, "could not write default config"),
            }
        }
    }

    fn config_path() -> PathBuf {
        let mut path = dirs::config_dir()
            .or_else(dirs::home_dir)
            .unwrap_or_else(|| PathBuf::from("."));

        path.push("camera-uploader");
        path.push("config.json");
        path
    }
}
