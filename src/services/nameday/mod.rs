// Nameday table loading
// Resolves the override and bundled data files and decodes the table

pub mod format;

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::models::nameday::NamedayTable;
use crate::models::settings::Settings;

#[derive(Debug, Error)]
pub enum NamedayError {
    #[error("{file_name} not found")]
    ResourceNotFound { file_name: String },

    #[error("failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to decode {}: {source}", .path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl NamedayError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, NamedayError::ResourceNotFound { .. })
    }

    pub fn is_decode(&self) -> bool {
        matches!(self, NamedayError::Decode { .. })
    }
}

/// Which location a table was read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableSource {
    Override,
    Bundled,
}

#[derive(Debug, Clone)]
pub struct LoadedTable {
    pub table: NamedayTable,
    pub source: TableSource,
    pub path: PathBuf,
}

/// Knows where the name-day table lives and how to read it.
#[derive(Debug, Clone)]
pub struct NamedayStore {
    file_name: String,
    override_dir: Option<PathBuf>,
    bundled_dirs: Vec<PathBuf>,
}

impl NamedayStore {
    pub fn new(
        file_name: impl Into<String>,
        override_dir: Option<PathBuf>,
        bundled_dirs: Vec<PathBuf>,
    ) -> Self {
        Self {
            file_name: file_name.into(),
            override_dir,
            bundled_dirs,
        }
    }

    /// Override under `<application support>/<app identifier>/`, bundled
    /// file from the configured or executable-relative resource directory.
    pub fn from_settings(settings: &Settings) -> Self {
        let override_dir = directories::BaseDirs::new()
            .map(|dirs| dirs.data_dir().join(&settings.app_identifier));
        if override_dir.is_none() {
            log::warn!("No home directory found; override table disabled");
        }

        let bundled_dirs = match &settings.bundled_data_dir {
            Some(dir) => vec![dir.clone()],
            None => default_bundled_dirs(),
        };

        Self::new(settings.data_file.trim(), override_dir, bundled_dirs)
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn override_dir(&self) -> Option<&Path> {
        self.override_dir.as_deref()
    }

    /// Path of the user override file. Creates its directory on first use so
    /// users have somewhere to drop their own table.
    pub fn override_path(&self) -> Option<PathBuf> {
        let dir = self.override_dir.as_ref()?;
        if !dir.exists() {
            if let Err(err) = fs::create_dir_all(dir) {
                log::debug!("Could not create override directory {}: {}", dir.display(), err);
            }
        }
        Some(dir.join(&self.file_name))
    }

    /// First bundled candidate that actually holds the data file.
    pub fn bundled_path(&self) -> Option<PathBuf> {
        self.bundled_dirs
            .iter()
            .map(|dir| dir.join(&self.file_name))
            .find(|path| path.is_file())
    }

    /// Loads the whole table. An existing override file is used exclusively,
    /// even when it turns out to be malformed.
    pub fn load(&self) -> Result<LoadedTable, NamedayError> {
        if let Some(path) = self.override_path().filter(|path| path.is_file()) {
            let table = read_table(&path)?;
            return Ok(LoadedTable {
                table,
                source: TableSource::Override,
                path,
            });
        }

        if let Some(path) = self.bundled_path() {
            let table = read_table(&path)?;
            return Ok(LoadedTable {
                table,
                source: TableSource::Bundled,
                path,
            });
        }

        Err(NamedayError::ResourceNotFound {
            file_name: self.file_name.clone(),
        })
    }
}

fn read_table(path: &Path) -> Result<NamedayTable, NamedayError> {
    let data = fs::read_to_string(path).map_err(|source| NamedayError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    NamedayTable::from_json(&data).map_err(|source| NamedayError::Decode {
        path: path.to_path_buf(),
        source,
    })
}

/// Logs entries that can never be displayed. Never fails the load.
pub fn report_diagnostics(loaded: &LoadedTable) {
    let invalid = loaded.table.invalid_keys();
    if !invalid.is_empty() {
        log::warn!(
            "{} ignores {} malformed key(s): {}",
            loaded.path.display(),
            invalid.len(),
            invalid.join(", ")
        );
    }

    let mut blank: Vec<&str> = loaded
        .table
        .iter()
        .filter(|(_, entry)| format::clean(&entry.display_text()).is_empty())
        .map(|(key, _)| key)
        .collect();
    if !blank.is_empty() {
        blank.sort_unstable();
        log::warn!(
            "{} has blank entries for: {}",
            loaded.path.display(),
            blank.join(", ")
        );
    }
}

/// Candidate resource directories for the bundled table, most specific first.
fn default_bundled_dirs() -> Vec<PathBuf> {
    let mut dirs = Vec::new();

    if let Some(exe_dir) = std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
    {
        // Inside an app bundle the binary sits in Contents/MacOS.
        if exe_dir.ends_with("Contents/MacOS") {
            if let Some(contents) = exe_dir.parent() {
                dirs.push(contents.join("Resources"));
            }
        }
        dirs.push(exe_dir.join("resources"));
        dirs.push(exe_dir);
    }

    #[cfg(debug_assertions)]
    dirs.push(PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("resources"));

    dirs
}
