use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use directories::ProjectDirs;

use crate::models::settings::Settings;

const SETTINGS_FILE: &str = "settings.toml";

/// Reads and writes `settings.toml`.
pub struct SettingsService {
    path: PathBuf,
}

impl SettingsService {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Settings file in the platform config directory, if one can be resolved.
    pub fn default_location() -> Option<Self> {
        ProjectDirs::from("cz", "nameday", "NameDay")
            .map(|dirs| Self::new(dirs.config_dir().join(SETTINGS_FILE)))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Get the current settings; a missing file yields the defaults.
    pub fn get(&self) -> Result<Settings> {
        if !self.path.exists() {
            return Ok(Settings::default());
        }

        let data = fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read settings from {}", self.path.display()))?;
        let settings: Settings = toml::from_str(&data)
            .with_context(|| format!("Failed to parse settings in {}", self.path.display()))?;
        Ok(settings)
    }

    pub fn get_or_default(&self) -> Settings {
        match self.get() {
            Ok(settings) => settings,
            Err(e) => {
                log::warn!("Failed to load settings: {:#}, using defaults", e);
                Settings::default()
            }
        }
    }

    pub fn update(&self, settings: &Settings) -> Result<()> {
        settings
            .validate()
            .map_err(|e| anyhow!("Invalid settings: {}", e))?;

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create dir {}", parent.display()))?;
        }

        let data = toml::to_string_pretty(settings).context("Failed to serialize settings")?;
        fs::write(&self.path, data)
            .with_context(|| format!("Failed to write settings to {}", self.path.display()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::locale::Locale;
    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    #[test]
    fn test_missing_file_gives_defaults() {
        let temp = tempdir().unwrap();
        let service = SettingsService::new(temp.path().join(SETTINGS_FILE));
        assert_eq!(service.get().unwrap(), Settings::default());
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let temp = tempdir().unwrap();
        let path = temp.path().join(SETTINGS_FILE);
        fs::write(&path, "time_zone = \"Europe/Bratislava\"\nlocale = \"en\"\n").unwrap();

        let settings = SettingsService::new(&path).get().unwrap();
        assert_eq!(settings.time_zone, "Europe/Bratislava");
        assert_eq!(settings.locale, Locale::English);
        assert_eq!(settings.data_file, "data.json");
    }

    #[test]
    fn test_unparsable_file_falls_back_to_defaults() {
        let temp = tempdir().unwrap();
        let path = temp.path().join(SETTINGS_FILE);
        fs::write(&path, "time_zone = [").unwrap();

        let service = SettingsService::new(&path);
        assert!(service.get().is_err());
        assert_eq!(service.get_or_default(), Settings::default());
    }

    #[test]
    fn test_update_round_trips() {
        let temp = tempdir().unwrap();
        let service = SettingsService::new(temp.path().join("nested").join(SETTINGS_FILE));
        let settings = Settings {
            bundled_data_dir: Some(PathBuf::from("/opt/nameday")),
            locale: Locale::English,
            ..Settings::default()
        };

        service.update(&settings).unwrap();
        assert_eq!(service.get().unwrap(), settings);
    }

    #[test]
    fn test_update_rejects_invalid_settings() {
        let temp = tempdir().unwrap();
        let service = SettingsService::new(temp.path().join(SETTINGS_FILE));
        let settings = Settings {
            time_zone: "Nowhere/Special".to_string(),
            ..Settings::default()
        };

        assert!(service.update(&settings).is_err());
        assert!(!service.path().exists());
    }
}
