// Presentation boundary
// Receives published state; the core never reads anything back from here

use crate::models::display::DisplayState;
use crate::models::locale::Locale;

/// Receives state after every change. Called only from the scheduler task.
pub trait DisplaySink: Send {
    fn show_names(&mut self, state: &DisplayState);
    fn show_launch_at_login(&mut self, enabled: bool);
}

/// Writes the current texts to stdout with the locale's headings.
pub struct ConsoleSink {
    locale: Locale,
    last_printed: Option<(String, String)>,
}

impl ConsoleSink {
    pub fn new(locale: Locale) -> Self {
        Self {
            locale,
            last_printed: None,
        }
    }

    pub fn render(&self, state: &DisplayState) -> String {
        let strings = self.locale.strings();
        format!(
            "{} {}\n{} {}",
            strings.today_heading, state.today, strings.tomorrow_heading, state.tomorrow
        )
    }
}

impl DisplaySink for ConsoleSink {
    fn show_names(&mut self, state: &DisplayState) {
        let texts = (state.today.clone(), state.tomorrow.clone());
        if self.last_printed.as_ref() == Some(&texts) {
            log::debug!("Display unchanged: {}", state.today);
            return;
        }

        println!("{}", self.render(state));
        log::info!("Showing '{}' (tomorrow '{}')", state.today, state.tomorrow);
        self.last_printed = Some(texts);
    }

    fn show_launch_at_login(&mut self, enabled: bool) {
        let strings = self.locale.strings();
        log::info!("{}: {}", strings.launch_at_login, if enabled { "✓" } else { "✗" });
    }
}
