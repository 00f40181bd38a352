use std::path::PathBuf;

use super::settings::Settings;
use crate::core::profile::ProfileStore;

const APP_DIR_NAME: &str = "CraftPacker";

pub struct AppState {
    pub data_dir: PathBuf,
    pub settings: Settings,
    pub profiles: ProfileStore,
}

impl AppState {
    /// State rooted at the platform data directory.
    pub fn load() -> Self {
        Self::with_data_dir(default_data_dir())
    }

    pub fn with_data_dir(data_dir: PathBuf) -> Self {
        let settings = Settings::load(&data_dir);
        let profiles = ProfileStore::new(data_dir.join("profiles"));

        Self {
            data_dir,
            settings,
            profiles,
        }
    }

    pub fn save_settings(&self) -> crate::core::error::PackerResult<()> {
        self.settings.save(&self.data_dir)
    }
}

fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR_NAME)
}
