//! Configuration loading and root folder resolution
//!
//! Root folder priority order:
//! 1. Command-line argument (highest priority)
//! 2. `EC_ROOT_FOLDER` environment variable
//! 3. `root_folder` in the TOML config file
//! 4. OS-dependent compiled default (fallback)
//!
//! A missing or unreadable config file is never fatal: a warning is logged
//! and defaults are used.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Environment variable overriding the root folder
pub const ROOT_FOLDER_ENV: &str = "EC_ROOT_FOLDER";

/// Database file name inside the root folder
pub const DATABASE_FILE: &str = "eightcount.db";

const APP_DIR: &str = "eightcount";

/// Default sheet store port
pub const DEFAULT_SHEETS_PORT: u16 = 5780;

/// Default tempo-lookup proxy port
pub const DEFAULT_TEMPO_PORT: u16 = 5781;

/// Default streaming-music API base URL
pub const DEFAULT_UPSTREAM_BASE_URL: &str = "https://api.spotify.com/v1";

/// Compiled-in defaults for the current platform
#[derive(Debug, Clone)]
pub struct CompiledDefaults {
    pub root_folder: PathBuf,
    pub log_level: String,
}

impl CompiledDefaults {
    pub fn for_current_platform() -> Self {
        Self {
            root_folder: default_root_folder(),
            log_level: "info".to_string(),
        }
    }
}

/// OS-dependent default root folder path
fn default_root_folder() -> PathBuf {
    if cfg!(target_os = "linux") {
        // ~/.local/share/eightcount (or /var/lib/eightcount for system-wide)
        dirs::data_local_dir()
            .map(|d| d.join(APP_DIR))
            .unwrap_or_else(|| PathBuf::from("/var/lib/eightcount"))
    } else if cfg!(target_os = "macos") {
        // ~/Library/Application Support/eightcount
        dirs::data_dir()
            .map(|d| d.join(APP_DIR))
            .unwrap_or_else(|| PathBuf::from("/Library/Application Support/eightcount"))
    } else if cfg!(target_os = "windows") {
        // %LOCALAPPDATA%\eightcount
        dirs::data_local_dir()
            .map(|d| d.join(APP_DIR))
            .unwrap_or_else(|| PathBuf::from("C:\\ProgramData\\eightcount"))
    } else {
        PathBuf::from("./eightcount_data")
    }
}

/// Locate the platform config file, if one exists
pub fn default_config_path() -> Option<PathBuf> {
    let user_config = dirs::config_dir().map(|d| d.join(APP_DIR).join("config.toml"));
    if let Some(path) = user_config {
        if path.exists() {
            return Some(path);
        }
    }

    if cfg!(target_os = "linux") {
        let system_config = PathBuf::from("/etc/eightcount/config.toml");
        if system_config.exists() {
            return Some(system_config);
        }
    }

    None
}

/// Logging section of the config file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

/// Sheet store section of the config file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SheetsConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_sheets_port")]
    pub port: u16,
}

impl Default for SheetsConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: DEFAULT_SHEETS_PORT,
        }
    }
}

fn default_sheets_port() -> u16 {
    DEFAULT_SHEETS_PORT
}

/// Tempo-lookup proxy section of the config file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TempoConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_tempo_port")]
    pub port: u16,
    #[serde(default = "default_upstream_base_url")]
    pub upstream_base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for TempoConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: DEFAULT_TEMPO_PORT,
            upstream_base_url: default_upstream_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_tempo_port() -> u16 {
    DEFAULT_TEMPO_PORT
}

fn default_upstream_base_url() -> String {
    DEFAULT_UPSTREAM_BASE_URL.to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

/// Contents of `config.toml`; every field is optional
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TomlConfig {
    pub root_folder: Option<PathBuf>,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub sheets: SheetsConfig,
    #[serde(default)]
    pub tempo: TempoConfig,
}

impl TomlConfig {
    /// Parse a config file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))
    }

    /// Parse `path` if given, else the platform config file; fall back to
    /// defaults (with a warning) when the file is missing or malformed.
    pub fn load_or_default(path: Option<&Path>) -> Self {
        let (config, source) = Self::load_with_source(path);
        source.log();
        config
    }

    /// Same lookup as [`TomlConfig::load_or_default`] without logging.
    ///
    /// Binaries read config before the tracing subscriber exists, so they
    /// call [`ConfigSource::log`] once logging is installed.
    pub fn load_with_source(path: Option<&Path>) -> (Self, ConfigSource) {
        let path = match path.map(Path::to_path_buf).or_else(default_config_path) {
            Some(path) => path,
            None => return (Self::default(), ConfigSource::Defaults),
        };

        match Self::load(&path) {
            Ok(config) => (config, ConfigSource::Loaded(path)),
            Err(error) => (Self::default(), ConfigSource::Rejected { path, error }),
        }
    }
}

/// Where the active configuration came from
#[derive(Debug)]
pub enum ConfigSource {
    /// No config file found
    Defaults,
    Loaded(PathBuf),
    /// File exists but could not be read or parsed; defaults are in use
    Rejected { path: PathBuf, error: Error },
}

impl ConfigSource {
    pub fn log(&self) {
        match self {
            ConfigSource::Defaults => debug!("No config file found, using defaults"),
            ConfigSource::Loaded(path) => debug!("Loaded config from {}", path.display()),
            ConfigSource::Rejected { path, error } => {
                warn!("Ignoring config file {}: {}", path.display(), error)
            }
        }
    }
}

/// Resolves the root folder holding the sheet database
#[derive(Debug, Clone)]
pub struct RootFolderResolver {
    module_name: String,
    cli_override: Option<PathBuf>,
    config_path: Option<PathBuf>,
}

impl RootFolderResolver {
    pub fn new(module_name: &str) -> Self {
        Self {
            module_name: module_name.to_string(),
            cli_override: None,
            config_path: None,
        }
    }

    /// Command-line value, if the user passed one
    pub fn with_cli_override(mut self, path: Option<PathBuf>) -> Self {
        self.cli_override = path;
        self
    }

    /// Read this config file instead of the platform default location
    pub fn with_config_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.config_path = Some(path.into());
        self
    }

    pub fn resolve(&self) -> PathBuf {
        if let Some(path) = &self.cli_override {
            debug!(module = %self.module_name, "Root folder from command line");
            return path.clone();
        }

        if let Ok(path) = std::env::var(ROOT_FOLDER_ENV) {
            if !path.is_empty() {
                debug!(module = %self.module_name, "Root folder from {}", ROOT_FOLDER_ENV);
                return PathBuf::from(path);
            }
        }

        let config = TomlConfig::load_or_default(self.config_path.as_deref());
        if let Some(path) = config.root_folder {
            debug!(module = %self.module_name, "Root folder from config file");
            return path;
        }

        CompiledDefaults::for_current_platform().root_folder
    }
}

/// Prepares a resolved root folder for use
#[derive(Debug, Clone)]
pub struct RootFolderInitializer {
    root_folder: PathBuf,
}

impl RootFolderInitializer {
    pub fn new(root_folder: PathBuf) -> Self {
        Self { root_folder }
    }

    pub fn root_folder(&self) -> &Path {
        &self.root_folder
    }

    /// Create the folder (and parents) if missing; safe to call repeatedly
    pub fn ensure_directory_exists(&self) -> Result<()> {
        std::fs::create_dir_all(&self.root_folder)?;
        Ok(())
    }

    pub fn database_path(&self) -> PathBuf {
        self.root_folder.join(DATABASE_FILE)
    }

    pub fn database_exists(&self) -> bool {
        self.database_path().exists()
    }
}
