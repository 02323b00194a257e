// Settings module
// User-editable application settings, read from settings.toml

use std::path::PathBuf;
use std::str::FromStr;

use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::models::locale::Locale;
use crate::utils::date::ZonedCalendar;

pub const DEFAULT_APP_IDENTIFIER: &str = "cz.nameday.NameDay";
pub const DEFAULT_DATA_FILE: &str = "data.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// IANA zone the day boundaries are computed in.
    pub time_zone: String,
    /// Names the application-support subdirectory and the launch agent.
    pub app_identifier: String,
    /// File name looked up in both the override and bundled locations.
    pub data_file: String,
    /// Directory holding the bundled table; derived from the executable when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bundled_data_dir: Option<PathBuf>,
    pub locale: Locale,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            time_zone: "Europe/Prague".to_string(),
            app_identifier: DEFAULT_APP_IDENTIFIER.to_string(),
            data_file: DEFAULT_DATA_FILE.to_string(),
            bundled_data_dir: None,
            locale: Locale::default(),
        }
    }
}

impl Settings {
    pub fn parse_time_zone(&self) -> Result<Tz, String> {
        Tz::from_str(self.time_zone.trim())
            .map_err(|_| format!("Unknown time zone '{}'", self.time_zone))
    }

    pub fn calendar(&self) -> Result<ZonedCalendar, String> {
        self.parse_time_zone().map(ZonedCalendar::new)
    }

    pub fn validate(&self) -> Result<(), String> {
        self.parse_time_zone()?;

        if self.app_identifier.trim().is_empty() {
            return Err("App identifier cannot be empty".to_string());
        }

        let data_file = self.data_file.trim();
        if data_file.is_empty() {
            return Err("Data file name cannot be empty".to_string());
        }
        if data_file.contains('/') || data_file.contains('\\') {
            return Err(format!("Data file '{}' must be a bare file name", self.data_file));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings_are_valid() {
        let settings = Settings::default();
        assert!(settings.validate().is_ok());
        assert_eq!(settings.parse_time_zone().unwrap(), chrono_tz::Europe::Prague);
    }

    #[test]
    fn test_unknown_time_zone_is_rejected() {
        let settings = Settings {
            time_zone: "Europe/Atlantis".to_string(),
            ..Settings::default()
        };
        assert!(settings.validate().is_err());
        assert!(settings.calendar().is_err());
    }

    #[test]
    fn test_data_file_must_be_a_file_name() {
        let settings = Settings {
            data_file: "../data.json".to_string(),
            ..Settings::default()
        };
        assert!(settings.validate().is_err());

        let settings = Settings {
            data_file: "  ".to_string(),
            ..Settings::default()
        };
        assert!(settings.validate().is_err());
    }
}
