//! User configuration.

mod file;
mod keys;

pub use file::{
    app_dir, config_file_path, CacheBackendKind, CacheSettings, ConfigError, ConfigFile,
    LoggingSettings, ProviderSettings, QuotaOverride, QuotaSettings, RefreshSettings,
    ServerSettings, APP_DIR_NAME, DEFAULT_BIND, DEFAULT_COURTESY_DELAY_MS,
};
pub use keys::ConfigKey;
