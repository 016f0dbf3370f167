//! Addressable configuration keys (`section.key`).

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use crate::provider::Service;

use super::file::{CacheBackendKind, ConfigError, ConfigFile};

/// A single configuration setting, addressed as `section.key`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigKey {
    CacheBackend,
    CacheDirectory,
    UnsplashAccessKey,
    NpsApiKey,
    NasaApiKey,
    ProviderTimeoutSecs,
    QuotaMaxRequests(Service),
    QuotaWindowSecs(Service),
    RefreshCatalog,
    RefreshCourtesyDelayMs,
    ServerBind,
    LoggingLevel,
    LoggingDirectory,
}

impl ConfigKey {
    /// Every key, grouped by section in file order.
    pub fn all() -> Vec<ConfigKey> {
        let mut keys = vec![
            ConfigKey::CacheBackend,
            ConfigKey::CacheDirectory,
            ConfigKey::UnsplashAccessKey,
            ConfigKey::NpsApiKey,
            ConfigKey::NasaApiKey,
            ConfigKey::ProviderTimeoutSecs,
        ];
        for service in Service::ALL {
            keys.push(ConfigKey::QuotaMaxRequests(service));
            keys.push(ConfigKey::QuotaWindowSecs(service));
        }
        keys.extend([
            ConfigKey::RefreshCatalog,
            ConfigKey::RefreshCourtesyDelayMs,
            ConfigKey::ServerBind,
            ConfigKey::LoggingLevel,
            ConfigKey::LoggingDirectory,
        ]);
        keys
    }

    pub fn section(&self) -> &'static str {
        match self {
            ConfigKey::CacheBackend | ConfigKey::CacheDirectory => "cache",
            ConfigKey::UnsplashAccessKey
            | ConfigKey::NpsApiKey
            | ConfigKey::NasaApiKey
            | ConfigKey::ProviderTimeoutSecs => "providers",
            ConfigKey::QuotaMaxRequests(_) | ConfigKey::QuotaWindowSecs(_) => "quota",
            ConfigKey::RefreshCatalog | ConfigKey::RefreshCourtesyDelayMs => "refresh",
            ConfigKey::ServerBind => "server",
            ConfigKey::LoggingLevel | ConfigKey::LoggingDirectory => "logging",
        }
    }

    pub fn key_name(&self) -> &'static str {
        match self {
            ConfigKey::CacheBackend => "backend",
            ConfigKey::CacheDirectory => "directory",
            ConfigKey::UnsplashAccessKey => "unsplash_access_key",
            ConfigKey::NpsApiKey => "nps_api_key",
            ConfigKey::NasaApiKey => "nasa_api_key",
            ConfigKey::ProviderTimeoutSecs => "timeout_secs",
            ConfigKey::QuotaMaxRequests(Service::Unsplash) => "unsplash_max_requests",
            ConfigKey::QuotaMaxRequests(Service::Nps) => "nps_max_requests",
            ConfigKey::QuotaMaxRequests(Service::Nasa) => "nasa_max_requests",
            ConfigKey::QuotaWindowSecs(Service::Unsplash) => "unsplash_window_secs",
            ConfigKey::QuotaWindowSecs(Service::Nps) => "nps_window_secs",
            ConfigKey::QuotaWindowSecs(Service::Nasa) => "nasa_window_secs",
            ConfigKey::RefreshCatalog => "catalog",
            ConfigKey::RefreshCourtesyDelayMs => "courtesy_delay_ms",
            ConfigKey::ServerBind => "bind",
            ConfigKey::LoggingLevel => "level",
            ConfigKey::LoggingDirectory => "directory",
        }
    }

    /// Full `section.key` name.
    pub fn name(&self) -> String {
        format!("{}.{}", self.section(), self.key_name())
    }

    /// API keys are masked when listed.
    pub fn is_secret(&self) -> bool {
        matches!(
            self,
            ConfigKey::UnsplashAccessKey | ConfigKey::NpsApiKey | ConfigKey::NasaApiKey
        )
    }

    /// Current value as a string; empty when unset.
    pub fn get(&self, config: &ConfigFile) -> String {
        fn opt<T: ToString>(value: &Option<T>) -> String {
            value.as_ref().map(|v| v.to_string()).unwrap_or_default()
        }

        match self {
            ConfigKey::CacheBackend => config.cache.backend.to_string(),
            ConfigKey::CacheDirectory => config.cache.directory.display().to_string(),
            ConfigKey::UnsplashAccessKey => opt(&config.providers.unsplash_access_key),
            ConfigKey::NpsApiKey => opt(&config.providers.nps_api_key),
            ConfigKey::NasaApiKey => opt(&config.providers.nasa_api_key),
            ConfigKey::ProviderTimeoutSecs => config.providers.timeout_secs.to_string(),
            ConfigKey::QuotaMaxRequests(service) => opt(&config.quota.get(*service).max_requests),
            ConfigKey::QuotaWindowSecs(service) => opt(&config.quota.get(*service).window_secs),
            ConfigKey::RefreshCatalog => config.refresh.catalog.display().to_string(),
            ConfigKey::RefreshCourtesyDelayMs => config.refresh.courtesy_delay_ms.to_string(),
            ConfigKey::ServerBind => config.server.bind.clone(),
            ConfigKey::LoggingLevel => config.logging.level.clone(),
            ConfigKey::LoggingDirectory => config
                .logging
                .directory
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_default(),
        }
    }

    /// Parse `value` and store it. An empty value clears optional keys.
    pub fn set(&self, config: &mut ConfigFile, value: &str) -> Result<(), ConfigError> {
        let value = value.trim();
        let invalid = |reason: String| ConfigError::InvalidValue {
            key: self.name(),
            value: value.to_string(),
            reason,
        };
        let optional = |v: &str| (!v.is_empty()).then(|| v.to_string());

        match self {
            ConfigKey::CacheBackend => {
                config.cache.backend = value.parse::<CacheBackendKind>().map_err(invalid)?;
            }
            ConfigKey::CacheDirectory => {
                config.cache.directory = required_path(value).map_err(invalid)?;
            }
            ConfigKey::UnsplashAccessKey => config.providers.unsplash_access_key = optional(value),
            ConfigKey::NpsApiKey => config.providers.nps_api_key = optional(value),
            ConfigKey::NasaApiKey => config.providers.nasa_api_key = optional(value),
            ConfigKey::ProviderTimeoutSecs => {
                let secs: u64 = parse_number(value).map_err(invalid)?;
                if secs == 0 {
                    return Err(invalid("must be greater than zero".to_string()));
                }
                config.providers.timeout_secs = secs;
            }
            ConfigKey::QuotaMaxRequests(service) => {
                let max = if value.is_empty() {
                    None
                } else {
                    let max: u32 = parse_number(value).map_err(invalid)?;
                    if max == 0 {
                        return Err(invalid("must allow at least one request".to_string()));
                    }
                    Some(max)
                };
                config.quota.get_mut(*service).max_requests = max;
            }
            ConfigKey::QuotaWindowSecs(service) => {
                let secs = if value.is_empty() {
                    None
                } else {
                    let secs: u64 = parse_number(value).map_err(invalid)?;
                    if secs == 0 {
                        return Err(invalid("window must be at least one second".to_string()));
                    }
                    Some(secs)
                };
                config.quota.get_mut(*service).window_secs = secs;
            }
            ConfigKey::RefreshCatalog => {
                config.refresh.catalog = required_path(value).map_err(invalid)?;
            }
            ConfigKey::RefreshCourtesyDelayMs => {
                config.refresh.courtesy_delay_ms = parse_number(value).map_err(invalid)?;
            }
            ConfigKey::ServerBind => {
                value
                    .parse::<std::net::SocketAddr>()
                    .map_err(|e| invalid(e.to_string()))?;
                config.server.bind = value.to_string();
            }
            ConfigKey::LoggingLevel => {
                if value.is_empty() {
                    return Err(invalid("level is required".to_string()));
                }
                config.logging.level = value.to_string();
            }
            ConfigKey::LoggingDirectory => {
                config.logging.directory = optional(value).map(PathBuf::from);
            }
        }
        Ok(())
    }
}

fn parse_number<T: FromStr>(value: &str) -> Result<T, String>
where
    T::Err: fmt::Display,
{
    value.parse::<T>().map_err(|e| e.to_string())
}

fn required_path(value: &str) -> Result<PathBuf, String> {
    if value.is_empty() {
        return Err("path is required".to_string());
    }
    Ok(PathBuf::from(value))
}

impl fmt::Display for ConfigKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.section(), self.key_name())
    }
}

impl FromStr for ConfigKey {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        ConfigKey::all()
            .into_iter()
            .find(|key| key.name() == wanted)
            .ok_or_else(|| ConfigError::UnknownKey(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_keys_round_trip_through_names() {
        let keys = ConfigKey::all();
        assert_eq!(keys.len(), 17);
        for key in keys {
            assert_eq!(key.name().parse::<ConfigKey>().unwrap(), key);
        }
    }

    #[test]
    fn test_only_api_keys_are_secret() {
        let secrets: Vec<_> = ConfigKey::all()
            .into_iter()
            .filter(ConfigKey::is_secret)
            .collect();
        assert_eq!(secrets.len(), 3);
        assert!(!ConfigKey::ServerBind.is_secret());
    }

    #[test]
    fn test_unknown_key() {
        assert!(matches!(
            "cache.colour".parse::<ConfigKey>(),
            Err(ConfigError::UnknownKey(_))
        ));
    }

    #[test]
    fn test_set_and_get_quota_override() {
        let mut config = ConfigFile::default();
        let key: ConfigKey = "quota.nps_max_requests".parse().unwrap();

        assert_eq!(key.get(&config), "");
        key.set(&mut config, "250").unwrap();
        assert_eq!(config.quota.nps.max_requests, Some(250));
        assert_eq!(key.get(&config), "250");

        key.set(&mut config, "").unwrap();
        assert_eq!(config.quota.nps.max_requests, None);
    }

    #[test]
    fn test_set_rejects_bad_values() {
        let mut config = ConfigFile::default();

        assert!(ConfigKey::QuotaWindowSecs(Service::Nasa)
            .set(&mut config, "0")
            .is_err());
        assert!(ConfigKey::ServerBind.set(&mut config, "not-an-addr").is_err());
        assert!(ConfigKey::CacheBackend.set(&mut config, "tape").is_err());
        assert!(ConfigKey::ProviderTimeoutSecs.set(&mut config, "-1").is_err());
        assert_eq!(config, ConfigFile::default());
    }

    #[test]
    fn test_set_rejects_zero_max_requests() {
        let mut config = ConfigFile::default();

        let err = ConfigKey::QuotaMaxRequests(Service::Nps)
            .set(&mut config, "0")
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { ref key, .. } if key == "quota.nps_max_requests"));
        assert_eq!(config.quota.nps.max_requests, None);
    }

    #[test]
    fn test_clear_api_key() {
        let mut config = ConfigFile::default();
        ConfigKey::NasaApiKey.set(&mut config, "DEMO_KEY").unwrap();
        assert_eq!(config.providers.nasa_api_key.as_deref(), Some("DEMO_KEY"));

        ConfigKey::NasaApiKey.set(&mut config, "  ").unwrap();
        assert!(config.providers.nasa_api_key.is_none());
    }
}
