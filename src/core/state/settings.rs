use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::core::error::{PackerError, PackerResult};
use crate::core::mods::{LoaderType, ModTarget};
use crate::core::pool::default_pool_size;
use crate::core::rate_limit::DEFAULT_CALLS_PER_MINUTE;
use crate::core::registry::MODRINTH_API_BASE;

const SETTINGS_FILE: &str = "settings.json";
const DOWNLOAD_DIR_NAME: &str = "CraftPacker_Downloads";

/// User preferences persisted as `settings.json` in the data directory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub max_threads: usize,
    pub calls_per_minute: u32,
    pub loader: LoaderType,
    pub game_version: String,
    pub download_dir: PathBuf,
    pub registry_base_url: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            max_threads: default_pool_size(),
            calls_per_minute: DEFAULT_CALLS_PER_MINUTE,
            loader: LoaderType::Fabric,
            game_version: "1.20.1".to_string(),
            download_dir: default_download_dir(),
            registry_base_url: MODRINTH_API_BASE.to_string(),
        }
    }
}

impl Settings {
    pub const KEYS: [&'static str; 6] = [
        "max_threads",
        "calls_per_minute",
        "loader",
        "game_version",
        "download_dir",
        "registry_base_url",
    ];

    pub fn path(data_dir: &Path) -> PathBuf {
        data_dir.join(SETTINGS_FILE)
    }

    /// Read settings from `data_dir`. A missing or unreadable file yields defaults.
    pub fn load(data_dir: &Path) -> Self {
        let path = Self::path(data_dir);
        let raw = match std::fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(_) => return Self::default(),
        };
        match serde_json::from_str(&raw) {
            Ok(settings) => settings,
            Err(e) => {
                tracing::warn!("Ignoring corrupt {:?}: {}", path, e);
                Self::default()
            }
        }
    }

    pub fn save(&self, data_dir: &Path) -> PackerResult<()> {
        std::fs::create_dir_all(data_dir).map_err(|e| PackerError::io(data_dir, e))?;
        let path = Self::path(data_dir);
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(&path, json).map_err(|e| PackerError::io(&path, e))
    }

    pub fn target(&self) -> ModTarget {
        ModTarget::new(self.loader, self.game_version.clone())
    }

    /// Update one field from its textual form, as given to `config set`.
    pub fn set(&mut self, key: &str, value: &str) -> PackerResult<()> {
        let value = value.trim();
        match key {
            "max_threads" => self.max_threads = parse_number(key, value)?,
            "calls_per_minute" => self.calls_per_minute = parse_number(key, value)?,
            "loader" => self.loader = value.parse()?,
            "game_version" => self.game_version = value.to_string(),
            "download_dir" => self.download_dir = PathBuf::from(value),
            "registry_base_url" => self.registry_base_url = value.to_string(),
            other => {
                return Err(PackerError::Other(format!(
                    "unknown setting {:?} (expected one of: {})",
                    other,
                    Self::KEYS.join(", ")
                )))
            }
        }
        Ok(())
    }

    pub fn get(&self, key: &str) -> Option<String> {
        match key {
            "max_threads" => Some(self.max_threads.to_string()),
            "calls_per_minute" => Some(self.calls_per_minute.to_string()),
            "loader" => Some(self.loader.to_string()),
            "game_version" => Some(self.game_version.clone()),
            "download_dir" => Some(self.download_dir.display().to_string()),
            "registry_base_url" => Some(self.registry_base_url.clone()),
            _ => None,
        }
    }
}

fn parse_number<T: std::str::FromStr>(key: &str, value: &str) -> PackerResult<T> {
    value
        .parse()
        .map_err(|_| PackerError::Other(format!("{key} expects a number, got {value:?}")))
}

fn default_download_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(DOWNLOAD_DIR_NAME)
}
