//! INI configuration file.
//!
//! Lives at `~/.parksync/config.ini`. Every key is optional; anything not
//! present keeps its default.
//!
//! ```ini
//! [cache]
//! backend = disk
//! directory = /home/me/.parksync/cache
//!
//! [providers]
//! unsplash_access_key = ...
//! nps_api_key = ...
//! nasa_api_key = ...
//! timeout_secs = 30
//!
//! [quota]
//! unsplash_max_requests = 50
//! unsplash_window_secs = 3600
//!
//! [refresh]
//! catalog = /home/me/.parksync/parks.json
//! courtesy_delay_ms = 2000
//!
//! [server]
//! bind = 127.0.0.1:8000
//!
//! [logging]
//! level = info
//! directory = /home/me/.parksync/logs
//! ```

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use ini::Ini;
use thiserror::Error;

use crate::provider::{Service, DEFAULT_TIMEOUT_SECS};

/// Directory under the home directory holding config, cache and logs.
pub const APP_DIR_NAME: &str = ".parksync";

const CONFIG_FILE_NAME: &str = "config.ini";

/// Default HTTP bind address.
pub const DEFAULT_BIND: &str = "127.0.0.1:8000";

/// Default pause between sweep fetches, in milliseconds.
pub const DEFAULT_COURTESY_DELAY_MS: u64 = 2000;

/// Errors reading or writing the configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {message}")]
    Read { path: String, message: String },

    #[error("Failed to write config file {path}: {source}")]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid value '{value}' for {key}: {reason}")]
    InvalidValue {
        key: String,
        value: String,
        reason: String,
    },

    #[error("Unknown configuration key '{0}'")]
    UnknownKey(String),
}

/// Root of all parksync state (`~/.parksync`).
pub fn app_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR_NAME)
}

/// Path of the configuration file.
pub fn config_file_path() -> PathBuf {
    app_dir().join(CONFIG_FILE_NAME)
}

/// Which artifact cache backend to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheBackendKind {
    Disk,
    Memory,
}

impl fmt::Display for CacheBackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CacheBackendKind::Disk => f.write_str("disk"),
            CacheBackendKind::Memory => f.write_str("memory"),
        }
    }
}

impl FromStr for CacheBackendKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "disk" => Ok(CacheBackendKind::Disk),
            "memory" => Ok(CacheBackendKind::Memory),
            other => Err(format!("expected 'disk' or 'memory', got '{}'", other)),
        }
    }
}

/// `[cache]` section.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheSettings {
    pub backend: CacheBackendKind,
    pub directory: PathBuf,
}

/// `[providers]` section.
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderSettings {
    pub unsplash_access_key: Option<String>,
    pub nps_api_key: Option<String>,
    pub nasa_api_key: Option<String>,
    pub timeout_secs: u64,
}

/// Quota override for one service.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QuotaOverride {
    pub max_requests: Option<u32>,
    pub window_secs: Option<u64>,
}

/// `[quota]` section.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QuotaSettings {
    pub unsplash: QuotaOverride,
    pub nps: QuotaOverride,
    pub nasa: QuotaOverride,
}

impl QuotaSettings {
    pub fn get(&self, service: Service) -> &QuotaOverride {
        match service {
            Service::Unsplash => &self.unsplash,
            Service::Nps => &self.nps,
            Service::Nasa => &self.nasa,
        }
    }

    pub fn get_mut(&mut self, service: Service) -> &mut QuotaOverride {
        match service {
            Service::Unsplash => &mut self.unsplash,
            Service::Nps => &mut self.nps,
            Service::Nasa => &mut self.nasa,
        }
    }
}

/// `[refresh]` section.
#[derive(Debug, Clone, PartialEq)]
pub struct RefreshSettings {
    pub catalog: PathBuf,
    pub courtesy_delay_ms: u64,
}

/// `[server]` section.
#[derive(Debug, Clone, PartialEq)]
pub struct ServerSettings {
    pub bind: String,
}

/// `[logging]` section.
#[derive(Debug, Clone, PartialEq)]
pub struct LoggingSettings {
    pub level: String,
    /// Daily log files are written here when set.
    pub directory: Option<PathBuf>,
}

/// Parsed configuration file.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigFile {
    pub cache: CacheSettings,
    pub providers: ProviderSettings,
    pub quota: QuotaSettings,
    pub refresh: RefreshSettings,
    pub server: ServerSettings,
    pub logging: LoggingSettings,
}

impl Default for ConfigFile {
    fn default() -> Self {
        let base = app_dir();
        Self {
            cache: CacheSettings {
                backend: CacheBackendKind::Disk,
                directory: base.join("cache"),
            },
            providers: ProviderSettings {
                unsplash_access_key: None,
                nps_api_key: None,
                nasa_api_key: None,
                timeout_secs: DEFAULT_TIMEOUT_SECS,
            },
            quota: QuotaSettings::default(),
            refresh: RefreshSettings {
                catalog: base.join("parks.json"),
                courtesy_delay_ms: DEFAULT_COURTESY_DELAY_MS,
            },
            server: ServerSettings {
                bind: DEFAULT_BIND.to_string(),
            },
            logging: LoggingSettings {
                level: "info".to_string(),
                directory: None,
            },
        }
    }
}

impl ConfigFile {
    /// Load from the default path. A missing file yields defaults.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&config_file_path())
    }

    /// Load from `path`. A missing file yields defaults.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let ini = Ini::load_from_file(path).map_err(|e| ConfigError::Read {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        Self::from_ini(&ini)
    }

    /// Save to the default path, creating `~/.parksync` if needed.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&config_file_path())
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let write_err = |source| ConfigError::Write {
            path: path.display().to_string(),
            source,
        };
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(write_err)?;
        }
        self.to_ini().write_to_file(path).map_err(write_err)
    }

    /// Build from a parsed INI document, starting from defaults.
    pub fn from_ini(ini: &Ini) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        for key in super::ConfigKey::all() {
            if let Some(value) = ini
                .section(Some(key.section()))
                .and_then(|s| s.get(key.key_name()))
            {
                key.set(&mut config, value)?;
            }
        }
        Ok(config)
    }

    /// Render as an INI document. Unset optional keys are omitted.
    pub fn to_ini(&self) -> Ini {
        let mut ini = Ini::new();
        for key in super::ConfigKey::all() {
            let value = key.get(self);
            if !value.is_empty() {
                ini.with_section(Some(key.section()))
                    .set(key.key_name(), value);
            }
        }
        ini
    }
}
