//! Application configuration.
//!
//! The configuration lives in `$XDG_CONFIG_HOME/launchpop/config.json`.
//! Every key is optional: a missing file, or a minimal `{}` file, gives
//! the compiled-in defaults.
//!
//! # Example
//!
//! ```json
//! {
//!   "favorites_file": "/home/me/.config/launcher-favorites.json",
//!   "max_results": 30,
//!   "close_delay_ms": 300,
//!   "shell": ["fish", "-c"],
//!   "sources": [
//!     { "path": "/home/me/.local/share/applications", "priority": 2 },
//!     { "path": "/usr/share/applications", "priority": 1 }
//!   ],
//!   "window": { "width": 300, "height": 480, "layer_shell": false }
//! }
//! ```

use crate::launch::LaunchOptions;
use crate::navigator::NavigatorOptions;
use crate::registry::{self, SourceLocation};
use crate::search::MAX_RESULTS;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

fn home_dir() -> PathBuf {
    PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| "/tmp".into()))
}

/// Resolve the config directory (`$XDG_CONFIG_HOME/launchpop`).
pub fn config_dir() -> PathBuf {
    std::env::var("XDG_CONFIG_HOME")
        .ok()
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| home_dir().join(".config"))
        .join("launchpop")
}

/// The default favorites file, shared with earlier launcher versions.
pub fn default_favorites_file() -> PathBuf {
    home_dir().join(".config/launcher-favorites.json")
}

/// `$XDG_RUNTIME_DIR/launchpop.lock`, or `/tmp/launchpop.lock`.
pub fn default_lock_file() -> PathBuf {
    std::env::var("XDG_RUNTIME_DIR")
        .ok()
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("/tmp"))
        .join("launchpop.lock")
}

/// Top-level configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Where the ordered favorites list is stored.
    pub favorites_file: PathBuf,
    /// PID file used to keep a single launcher running.
    pub lock_file: PathBuf,
    /// Maximum number of search results shown.
    pub max_results: usize,
    /// Delay between losing focus and closing (ms).
    pub close_delay_ms: u64,
    /// Argv prefix for free-text commands; the query is appended.
    pub shell: Vec<String>,
    /// Launch helper invoked with the entry id.
    pub launch_helper: String,
    /// Session-bus wrapper around the launch helper.
    pub bus_bootstrapper: String,
    /// Directories to scan.  `None` uses the built-in list.
    pub sources: Option<Vec<SourceLocation>>,
    pub window: WindowConfig,
}

/// Window geometry and placement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub width: i32,
    pub height: i32,
    /// Use the layer-shell protocol when the compositor supports it.
    pub layer_shell: bool,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            width: 250,
            height: 400,
            layer_shell: true,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        let launch = LaunchOptions::default();
        Self {
            favorites_file: default_favorites_file(),
            lock_file: default_lock_file(),
            max_results: MAX_RESULTS,
            close_delay_ms: 500,
            shell: launch.shell,
            launch_helper: launch.helper,
            bus_bootstrapper: launch.bus_bootstrapper,
            sources: None,
            window: WindowConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from a JSON file at `path`.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError(format!("failed to read {}: {}", path.display(), e)))?;
        let config: Self = serde_json::from_str(&contents)
            .map_err(|e| ConfigError(format!("failed to parse {}: {}", path.display(), e)))?;
        Ok(config)
    }

    /// The scan list: configured sources, else the built-in ones.
    pub fn sources(&self) -> Vec<SourceLocation> {
        self.sources.clone().unwrap_or_else(registry::default_sources)
    }

    pub fn launch_options(&self) -> LaunchOptions {
        LaunchOptions {
            helper: self.launch_helper.clone(),
            bus_bootstrapper: self.bus_bootstrapper.clone(),
            shell: self.shell.clone(),
        }
    }

    pub fn navigator_options(&self) -> NavigatorOptions {
        NavigatorOptions {
            max_results: self.max_results,
            close_delay: Duration::from_millis(self.close_delay_ms),
            launch: self.launch_options(),
        }
    }
}

/// Error from loading or parsing a configuration file.
#[derive(Debug, thiserror::Error)]
#[error("config error: {0}")]
pub struct ConfigError(String);
