// Display module
// Text currently published to the menu bar

use crate::models::locale::Locale;
use crate::utils::date::DateKey;

/// What the presentation layer shows, plus the key it was computed for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayState {
    pub today: String,
    pub tomorrow: String,
    /// Key of the last successful refresh; `None` until one succeeds.
    pub last_shown_key: Option<DateKey>,
}

impl DisplayState {
    /// Initial state shown before the first refresh finishes.
    pub fn loading(locale: Locale) -> Self {
        let loading = locale.strings().loading.to_string();
        Self {
            today: loading.clone(),
            tomorrow: loading,
            last_shown_key: None,
        }
    }

    pub fn shown(today: String, tomorrow: String, key: DateKey) -> Self {
        Self {
            today,
            tomorrow,
            last_shown_key: Some(key),
        }
    }

    /// Keeps `last_shown_key` so a later wake still compares against the
    /// last day that was actually displayed.
    pub fn set_error(&mut self, locale: Locale) {
        let error = locale.strings().read_error.to_string();
        self.today = error.clone();
        self.tomorrow = error;
    }
}
