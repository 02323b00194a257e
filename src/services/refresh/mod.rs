// Refresh pipeline
// Load table -> derive keys -> format texts, plus the scheduler driving it

pub mod midnight;
pub mod scheduler;

use std::sync::Arc;

use crate::models::display::DisplayState;
use crate::models::locale::Locale;
use crate::services::nameday::format::display_for;
use crate::services::nameday::{report_diagnostics, NamedayError, NamedayStore, TableSource};
use crate::utils::clock::Clock;
use crate::utils::date::{DateKey, ZonedCalendar};

/// Owns the display state and recomputes it on demand.
pub struct NamedayRefresher {
    store: NamedayStore,
    calendar: ZonedCalendar,
    clock: Arc<dyn Clock>,
    locale: Locale,
    state: DisplayState,
    refresh_count: u64,
}

impl NamedayRefresher {
    pub fn new(
        store: NamedayStore,
        calendar: ZonedCalendar,
        clock: Arc<dyn Clock>,
        locale: Locale,
    ) -> Self {
        Self {
            store,
            calendar,
            clock,
            locale,
            state: DisplayState::loading(locale),
            refresh_count: 0,
        }
    }

    pub fn state(&self) -> &DisplayState {
        &self.state
    }

    pub fn calendar(&self) -> &ZonedCalendar {
        &self.calendar
    }

    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }

    /// Number of refresh attempts so far, failed ones included.
    pub fn refresh_count(&self) -> u64 {
        self.refresh_count
    }

    pub fn current_key(&self) -> DateKey {
        self.calendar.key_for(&self.clock.now())
    }

    /// True when the day shown differs from the day it is now.
    pub fn is_stale(&self) -> bool {
        self.state.last_shown_key != Some(self.current_key())
    }

    /// Reloads the table and recomputes both texts. On failure both texts
    /// become the error placeholder; the error is logged and returned.
    pub fn refresh(&mut self) -> Result<DateKey, NamedayError> {
        self.refresh_count += 1;

        let loaded = match self.store.load() {
            Ok(loaded) => loaded,
            Err(err) => {
                log::error!("Nameday read error: {}", err);
                self.state.set_error(self.locale);
                return Err(err);
            }
        };

        match loaded.source {
            TableSource::Override => log::debug!("Using override table {}", loaded.path.display()),
            TableSource::Bundled => log::debug!("Using bundled table {}", loaded.path.display()),
        }
        report_diagnostics(&loaded);

        let now = self.clock.now();
        self.state = display_for(
            &loaded.table,
            &self.calendar,
            &now,
            self.locale.strings().missing,
        );
        Ok(self.calendar.key_for(&now))
    }
}
