// Launch-at-login registration
// The controller reflects what the OS reports, not what was last requested

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

/// Backend able to register the application to start at login.
#[cfg_attr(test, mockall::automock)]
pub trait LoginItemService: Send {
    fn is_enabled(&self) -> Result<bool>;
    fn register(&self) -> Result<()>;
    fn unregister(&self) -> Result<()>;
}

/// Caches the registration state for the presentation layer.
pub struct LoginItemController {
    service: Box<dyn LoginItemService>,
    enabled: bool,
}

impl LoginItemController {
    pub fn new(service: Box<dyn LoginItemService>) -> Self {
        let mut controller = Self {
            service,
            enabled: false,
        };
        controller.sync();
        controller
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Re-reads the registration state from the backend.
    pub fn sync(&mut self) -> bool {
        self.enabled = match self.service.is_enabled() {
            Ok(enabled) => enabled,
            Err(e) => {
                log::warn!("Failed to read launch-at-login state: {:#}", e);
                false
            }
        };
        self.enabled
    }

    /// Attempts the change, logs any failure, and returns the actual state.
    pub fn set_enabled(&mut self, enabled: bool) -> bool {
        let result = if enabled {
            self.service.register()
        } else {
            self.service.unregister()
        };

        if let Err(e) = result {
            log::warn!("LaunchAtLogin error: {:#}", e);
        }

        self.sync()
    }
}

/// Registers a per-user launchd agent that starts the executable at login.
#[derive(Debug, Clone)]
pub struct LaunchAgentService {
    label: String,
    plist_path: PathBuf,
    program: PathBuf,
}

impl LaunchAgentService {
    pub fn new(label: impl Into<String>, agents_dir: &Path, program: impl Into<PathBuf>) -> Self {
        let label = label.into();
        let plist_path = agents_dir.join(format!("{}.plist", label));
        Self {
            label,
            plist_path,
            program: program.into(),
        }
    }

    /// Agent in `~/Library/LaunchAgents` launching the running executable.
    pub fn for_current_exe(label: &str) -> Result<Self> {
        let home = directories::BaseDirs::new()
            .context("Failed to get base directories")?
            .home_dir()
            .to_path_buf();
        let program = std::env::current_exe().context("Failed to resolve current executable")?;

        Ok(Self::new(
            label,
            &home.join("Library").join("LaunchAgents"),
            program,
        ))
    }

    pub fn plist_path(&self) -> &Path {
        &self.plist_path
    }

    fn property_list(&self) -> String {
        format!(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<!DOCTYPE plist PUBLIC "-//Apple//DTD PLIST 1.0//EN" "http://www.apple.com/DTDs/PropertyList-1.0.dtd">
<plist version="1.0">
<dict>
    <key>Label</key>
    <string>{}</string>
    <key>ProgramArguments</key>
    <array>
        <string>{}</string>
    </array>
    <key>RunAtLoad</key>
    <true/>
    <key>ProcessType</key>
    <string>Interactive</string>
</dict>
</plist>
"#,
            escape_xml(&self.label),
            escape_xml(&self.program.to_string_lossy())
        )
    }
}

impl LoginItemService for LaunchAgentService {
    fn is_enabled(&self) -> Result<bool> {
        Ok(self.plist_path.is_file())
    }

    fn register(&self) -> Result<()> {
        if let Some(parent) = self.plist_path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create dir {}", parent.display()))?;
        }

        fs::write(&self.plist_path, self.property_list())
            .with_context(|| format!("Failed to write {}", self.plist_path.display()))?;
        log::info!("Registered launch agent {}", self.label);
        Ok(())
    }

    fn unregister(&self) -> Result<()> {
        if !self.plist_path.exists() {
            return Ok(());
        }

        fs::remove_file(&self.plist_path)
            .with_context(|| format!("Failed to remove {}", self.plist_path.display()))?;
        log::info!("Removed launch agent {}", self.label);
        Ok(())
    }
}

/// Stand-in used when no launch agent can be installed. Always disabled.
#[derive(Debug, Clone)]
pub struct UnavailableLoginItem {
    reason: String,
}

impl UnavailableLoginItem {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

impl LoginItemService for UnavailableLoginItem {
    fn is_enabled(&self) -> Result<bool> {
        Ok(false)
    }

    fn register(&self) -> Result<()> {
        Err(anyhow::anyhow!("Launch at login unavailable: {}", self.reason))
    }

    fn unregister(&self) -> Result<()> {
        Ok(())
    }
}

/// Launch agent for the running executable, or an always-disabled backend
/// when its location cannot be determined.
pub fn default_service(label: &str) -> Box<dyn LoginItemService> {
    match LaunchAgentService::for_current_exe(label) {
        Ok(service) => Box::new(service),
        Err(e) => {
            log::warn!("Launch at login disabled: {:#}", e);
            Box::new(UnavailableLoginItem::new(format!("{:#}", e)))
        }
    }
}

fn escape_xml(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
