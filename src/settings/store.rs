use std::path::{Path, PathBuf};

use parking_lot::Mutex;

use crate::filter::types::FilterSelector;
use crate::settings::error::Result;
use crate::settings::types::PreviewSettings;

/// JSON-backed settings with atomic saves.
pub struct SettingsStore {
    path: PathBuf,
    data: Mutex<PreviewSettings>,
}

impl SettingsStore {
    /// Open the store at `path`, loading it if the file exists.
    pub fn open(path: PathBuf) -> Result<Self> {
        let data = Self::load(&path)?;
        Ok(Self {
            path,
            data: Mutex::new(data),
        })
    }

    /// Load settings from a JSON file, returning defaults on a missing file.
    pub fn load(path: &Path) -> Result<PreviewSettings> {
        if !path.exists() {
            return Ok(PreviewSettings::default());
        }
        let contents = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&contents)?)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Current settings.
    pub fn get(&self) -> PreviewSettings {
        self.data.lock().clone()
    }

    /// Apply `update` to the in-memory settings.
    pub fn update(&self, update: impl FnOnce(&mut PreviewSettings)) {
        update(&mut self.data.lock());
    }

    /// Remember the last selected filter.
    pub fn set_filter(&self, filter: FilterSelector) {
        self.update(|s| s.filter = filter);
    }

    /// Save current settings to disk atomically (write .tmp then rename).
    pub fn save(&self) -> Result<()> {
        let data = self.data.lock().clone();
        let json = serde_json::to_string_pretty(&data)?;

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let tmp_path = self.path.with_extension("json.tmp");
        std::fs::write(&tmp_path, &json)?;
        std::fs::rename(&tmp_path, &self.path)?;
        tracing::debug!("settings saved to {}", self.path.display());

        Ok(())
    }
}
