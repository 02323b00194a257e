// Nameday Bar
// Main entry point

use std::sync::Arc;

use anyhow::{anyhow, Context, Result};

use nameday_bar::models::settings::Settings;
use nameday_bar::services::login_item::{self, LoginItemController};
use nameday_bar::services::nameday::NamedayStore;
use nameday_bar::services::presenter::ConsoleSink;
use nameday_bar::services::refresh::scheduler::RefreshScheduler;
use nameday_bar::services::refresh::NamedayRefresher;
use nameday_bar::services::settings::SettingsService;
use nameday_bar::services::system_events::ClockJumpWatcher;
use nameday_bar::utils::clock::{Clock, SystemClock};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    log::info!("Starting Nameday Bar");

    let settings = load_settings();
    settings
        .validate()
        .map_err(|e| anyhow!(e))
        .context("Invalid settings")?;
    let calendar = settings.calendar().map_err(|e| anyhow!(e))?;
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);

    let store = NamedayStore::from_settings(&settings);
    if let Some(dir) = store.override_dir() {
        log::info!("Override table location: {}", dir.join(store.file_name()).display());
    }

    let refresher = NamedayRefresher::new(store, calendar, clock.clone(), settings.locale);
    let login = LoginItemController::new(login_item::default_service(&settings.app_identifier));
    let events = ClockJumpWatcher::new(calendar, clock);
    let sink = ConsoleSink::new(settings.locale);

    let scheduler = RefreshScheduler::new(refresher, login, Box::new(sink), Box::new(events));
    let handle = scheduler.handle();
    let task = tokio::spawn(scheduler.run());

    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for shutdown signal")?;
    log::info!("Shutting down");
    handle.shutdown();
    task.await.context("Refresh scheduler task failed")?;

    Ok(())
}

fn load_settings() -> Settings {
    match SettingsService::default_location() {
        Some(service) => {
            log::info!("Settings file: {}", service.path().display());
            service.get_or_default()
        }
        None => {
            log::warn!("No config directory found, using default settings");
            Settings::default()
        }
    }
}
