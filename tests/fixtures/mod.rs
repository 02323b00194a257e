// Test fixtures - reusable test data
// Provides consistent tables, clocks and sinks across test files

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use chrono::{DateTime, TimeZone, Utc};

use nameday_bar::models::display::DisplayState;
use nameday_bar::services::presenter::DisplaySink;
use nameday_bar::utils::date::DEFAULT_TIME_ZONE;

/// Small table used by the scenario tests
pub const SCENARIO_TABLE: &str = r#"{"01-01": "Nový rok", "12-24": ["Adam", "Eva"]}"#;

/// Writes `contents` as `data.json` inside `dir`, creating it if needed
pub fn write_table(dir: &Path, contents: &str) -> PathBuf {
    fs::create_dir_all(dir).unwrap();
    let path = dir.join("data.json");
    fs::write(&path, contents).unwrap();
    path
}

/// Path of the table shipped with the crate
pub fn bundled_resources() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("resources")
}

/// Prague wall-clock time as a UTC instant
pub fn prague(year: i32, month: u32, day: u32, hour: u32, minute: u32, second: u32) -> DateTime<Utc> {
    DEFAULT_TIME_ZONE
        .with_ymd_and_hms(year, month, day, hour, minute, second)
        .single()
        .unwrap()
        .with_timezone(&Utc)
}

/// Sink that records everything the scheduler publishes
#[derive(Clone, Default)]
pub struct RecordingSink {
    pub names: Arc<Mutex<Vec<DisplayState>>>,
    pub login: Arc<Mutex<Vec<bool>>>,
}

impl RecordingSink {
    pub fn last_names(&self) -> Option<DisplayState> {
        self.names.lock().unwrap().last().cloned()
    }

    pub fn name_updates(&self) -> usize {
        self.names.lock().unwrap().len()
    }
}

impl DisplaySink for RecordingSink {
    fn show_names(&mut self, state: &DisplayState) {
        self.names.lock().unwrap().push(state.clone());
    }

    fn show_launch_at_login(&mut self, enabled: bool) {
        self.login.lock().unwrap().push(enabled);
    }
}
