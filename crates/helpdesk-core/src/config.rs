//! Configuration for the helpdesk dashboard.
//!
//! Root configuration struct and nested section types with full defaults,
//! validation, YAML file loading, environment variable overrides, and tilde
//! path expansion.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

/// Environment variable naming an explicit config file.
pub const CONFIG_PATH_ENV: &str = "HELPDESK_CONFIG";
/// Environment override for `logging.level`.
pub const LOG_LEVEL_ENV: &str = "HELPDESK_LOG_LEVEL";
/// Environment override for `backend.mailbox_slug`.
pub const MAILBOX_ENV: &str = "HELPDESK_MAILBOX";
/// Environment override for `platform.native_shell`.
pub const NATIVE_SHELL_ENV: &str = "HELPDESK_NATIVE_SHELL";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("read config {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("parse config {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },
    #[error("invalid config: {0}")]
    Invalid(String),
}

// ---------------------------------------------------------------------------
// Root config
// ---------------------------------------------------------------------------

/// Root configuration for the dashboard.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    pub global: GlobalConfig,
    pub logging: LoggingConfig,
    pub backend: BackendConfig,
    pub tui: TuiConfig,
    pub platform: PlatformConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            global: GlobalConfig::default(),
            logging: LoggingConfig::default(),
            backend: BackendConfig::default(),
            tui: TuiConfig::default(),
            platform: PlatformConfig::default(),
        }
    }
}

impl Config {
    /// Loads `path`, applies environment overrides, expands paths and
    /// validates the result.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let mut cfg = Self::from_yaml_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })?;
        cfg.finish()?;
        Ok(cfg)
    }

    /// Loads the first config file found in the standard locations, or the
    /// defaults when none exists.
    pub fn load_default() -> Result<Self, ConfigError> {
        if let Some(path) = find_config_file() {
            return Self::load(&path);
        }
        let mut cfg = Self::default();
        cfg.finish()?;
        Ok(cfg)
    }

    pub fn from_yaml_str(raw: &str) -> Result<Self, serde_yaml::Error> {
        if raw.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(raw)
    }

    fn finish(&mut self) -> Result<(), ConfigError> {
        self.apply_env_overrides_from(|key| std::env::var(key).ok());
        self.expand_paths();
        self.validate().map_err(ConfigError::Invalid)
    }

    /// Applies `HELPDESK_*` overrides using the supplied lookup.
    pub fn apply_env_overrides_from<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(level) = lookup(LOG_LEVEL_ENV).filter(|v| !v.trim().is_empty()) {
            self.logging.level = level.trim().to_owned();
        }
        if let Some(slug) = lookup(MAILBOX_ENV).filter(|v| !v.trim().is_empty()) {
            self.backend.mailbox_slug = slug.trim().to_owned();
        }
        if let Some(flag) = lookup(NATIVE_SHELL_ENV).and_then(|raw| parse_flag(&raw)) {
            self.platform.native_shell = Some(flag);
        }
    }

    /// Request timeout as a `Duration`.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.backend.request_timeout_ms)
    }

    /// Validates the entire configuration, returning an error message on failure.
    pub fn validate(&self) -> Result<(), String> {
        // Global
        if self.global.data_dir.trim().is_empty() {
            return Err("global.data_dir is required".into());
        }
        if self.global.config_dir.trim().is_empty() {
            return Err("global.config_dir is required".into());
        }

        // Logging
        match self.logging.level.to_lowercase().trim() {
            "debug" | "info" | "warn" | "error" => {}
            _ => return Err("logging.level must be one of debug, info, warn, error".into()),
        }
        match self.logging.format.to_lowercase().trim() {
            "console" | "json" => {}
            _ => return Err("logging.format must be one of console, json".into()),
        }

        // Backend
        if self.backend.request_timeout_ms == 0 {
            return Err("backend.request_timeout_ms must be greater than 0".into());
        }
        if !self.backend.base_url.is_empty()
            && !(self.backend.base_url.starts_with("http://")
                || self.backend.base_url.starts_with("https://"))
        {
            return Err("backend.base_url must start with http:// or https://".into());
        }

        // TUI
        match self.tui.theme.to_lowercase().trim() {
            "default" | "high-contrast" => {}
            _ => return Err("tui.theme must be one of default, high-contrast".into()),
        }
        if self.tui.menu_width < 20 {
            return Err("tui.menu_width must be at least 20".into());
        }
        if self.tui.max_rows < 1 {
            return Err("tui.max_rows must be at least 1".into());
        }
        if self.tui.toast_limit < 1 {
            return Err("tui.toast_limit must be at least 1".into());
        }

        Ok(())
    }

    /// Expands `~` to home directory in all path-related config fields.
    pub fn expand_paths(&mut self) {
        self.global.data_dir = expand_tilde(&self.global.data_dir);
        self.global.config_dir = expand_tilde(&self.global.config_dir);
        self.logging.file = expand_tilde(&self.logging.file);
    }
}

// ---------------------------------------------------------------------------
// Section configs
// ---------------------------------------------------------------------------

/// Global settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GlobalConfig {
    pub data_dir: String,
    pub config_dir: String,
}

impl Default for GlobalConfig {
    fn default() -> Self {
        let home = home_dir();
        Self {
            data_dir: home.join(".local/share/helpdesk").display().to_string(),
            config_dir: home.join(".config/helpdesk").display().to_string(),
        }
    }
}

/// Logging configuration section.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
    pub file: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".into(),
            format: "console".into(),
            file: String::new(),
        }
    }
}

/// Support backend connection settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    pub base_url: String,
    pub request_timeout_ms: u64,
    pub mailbox_slug: String,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            request_timeout_ms: 15_000,
            mailbox_slug: String::new(),
        }
    }
}

/// TUI settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TuiConfig {
    pub theme: String,
    pub menu_width: usize,
    pub max_rows: usize,
    pub toast_limit: usize,
}

impl Default for TuiConfig {
    fn default() -> Self {
        Self {
            theme: "default".into(),
            menu_width: 72,
            max_rows: 24,
            toast_limit: 5,
        }
    }
}

/// Host shell detection.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PlatformConfig {
    /// `Some(true)` when running inside the embedded desktop/native shell.
    pub native_shell: Option<bool>,
}

/// Environment the dashboard is hosted in, resolved once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HostPlatform {
    #[default]
    Browser,
    NativeShell,
}

impl HostPlatform {
    #[must_use]
    pub fn from_config(platform: &PlatformConfig) -> Self {
        if platform.native_shell.unwrap_or(false) {
            Self::NativeShell
        } else {
            Self::Browser
        }
    }

    #[must_use]
    pub fn is_native_shell(self) -> bool {
        matches!(self, Self::NativeShell)
    }

    /// Where to land after the session ends.
    #[must_use]
    pub fn sign_out_redirect(self) -> &'static str {
        match self {
            Self::Browser => "/",
            Self::NativeShell => "/desktop/signed-out",
        }
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Expand a leading `~` to the user's home directory.
pub fn expand_tilde(path: &str) -> String {
    if path.is_empty() {
        return path.to_string();
    }
    if path == "~" {
        return home_dir().display().to_string();
    }
    if let Some(rest) = path.strip_prefix("~/") {
        return home_dir().join(rest).display().to_string();
    }
    path.to_string()
}

/// Search for a configuration file in the standard locations.
/// Returns `None` if no config file is found.
pub fn find_config_file() -> Option<PathBuf> {
    config_search_paths().into_iter().find(|p| p.is_file())
}

fn config_search_paths() -> Vec<PathBuf> {
    let mut paths = Vec::new();
    if let Ok(explicit) = std::env::var(CONFIG_PATH_ENV) {
        if !explicit.trim().is_empty() {
            paths.push(PathBuf::from(expand_tilde(explicit.trim())));
        }
    }
    if let Ok(xdg) = std::env::var("XDG_CONFIG_HOME") {
        if !xdg.is_empty() {
            paths.push(PathBuf::from(xdg).join("helpdesk").join("config.yaml"));
        }
    }
    paths.push(home_dir().join(".config/helpdesk/config.yaml"));
    paths
}

fn home_dir() -> PathBuf {
    std::env::var_os("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."))
}
