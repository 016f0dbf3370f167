//! `parksync config`: inspect and edit `~/.parksync/config.ini`.
//!
//! Values are shown as the application would see them. Unset quota keys
//! resolve to the service's published quota and unset API keys fall back to
//! the environment, so `list` and `get` report where each value came from.

use std::fmt::Write as _;

use clap::Subcommand;
use console::style;
use parksync::app::AppConfig;
use parksync::config::{config_file_path, ConfigFile, ConfigKey};
use parksync::provider::Service;

use crate::error::CliError;

#[derive(Debug, Subcommand)]
pub enum ConfigCommands {
    /// Print the effective value of a key (e.g. quota.nps_max_requests)
    Get {
        #[arg(value_parser = parse_key)]
        key: ConfigKey,
    },

    /// Write a key to the config file; an empty value clears optional keys
    Set {
        #[arg(value_parser = parse_key)]
        key: ConfigKey,
        value: String,
    },

    /// Show every key with its effective value and origin
    List {
        /// Print API keys in full
        #[arg(long)]
        show_secrets: bool,
    },

    /// Print the config file location
    Path,
}

pub fn run(command: ConfigCommands) -> Result<(), CliError> {
    match command {
        ConfigCommands::Get { key } => {
            let config = ConfigFile::load()?;
            let setting = Setting::resolve(key, &config, &AppConfig::from_config_file(&config));
            match setting.origin {
                Origin::Unset => println!("(not set)"),
                Origin::File => println!("{}", setting.value),
                origin => {
                    println!("{}", setting.value);
                    eprintln!("{}", style(format!("({})", origin.label())).dim());
                }
            }
        }
        ConfigCommands::Set { key, value } => {
            let mut config = ConfigFile::load()?;
            key.set(&mut config, &value)?;
            config.save()?;
            if value.is_empty() {
                println!("Cleared {}", key.name());
            } else if key.is_secret() {
                println!("Set {} = {}", key.name(), mask(&value));
            } else {
                println!("Set {} = {}", key.name(), value);
            }
        }
        ConfigCommands::List { show_secrets } => {
            let config = ConfigFile::load()?;
            let app = AppConfig::from_config_file(&config);
            print!("{}", render_list(&config, &app, show_secrets));
        }
        ConfigCommands::Path => println!("{}", config_file_path().display()),
    }
    Ok(())
}

/// clap value parser for `section.key` arguments.
fn parse_key(s: &str) -> Result<ConfigKey, String> {
    s.parse::<ConfigKey>()
        .map_err(|_| format!("unknown key '{}' (run `parksync config list`)", s))
}

/// Where an effective value comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Origin {
    File,
    Default,
    Environment,
    Unset,
}

impl Origin {
    fn label(&self) -> &'static str {
        match self {
            Origin::File => "file",
            Origin::Default => "default",
            Origin::Environment => "environment",
            Origin::Unset => "unset",
        }
    }
}

#[derive(Debug)]
struct Setting {
    key: ConfigKey,
    value: String,
    origin: Origin,
}

impl Setting {
    fn resolve(key: ConfigKey, config: &ConfigFile, app: &AppConfig) -> Self {
        let raw = key.get(config);
        let (value, origin) = match key {
            ConfigKey::QuotaMaxRequests(service) if raw.is_empty() => (
                app.quotas.get(service).max_requests.to_string(),
                Origin::Default,
            ),
            ConfigKey::QuotaWindowSecs(service) if raw.is_empty() => (
                app.quotas.get(service).window.as_secs().to_string(),
                Origin::Default,
            ),
            ConfigKey::UnsplashAccessKey | ConfigKey::NpsApiKey | ConfigKey::NasaApiKey
                if raw.is_empty() =>
            {
                match env_key(key, app) {
                    Some(v) => (v.to_string(), Origin::Environment),
                    None => (String::new(), Origin::Unset),
                }
            }
            _ if raw.is_empty() => (raw, Origin::Unset),
            _ if raw == key.get(&ConfigFile::default()) => (raw, Origin::Default),
            _ => (raw, Origin::File),
        };
        Self { key, value, origin }
    }

    fn display_value(&self, show_secrets: bool) -> String {
        if self.origin == Origin::Unset {
            "-".to_string()
        } else if self.key.is_secret() && !show_secrets {
            mask(&self.value)
        } else {
            self.value.clone()
        }
    }
}

fn env_key(key: ConfigKey, app: &AppConfig) -> Option<&str> {
    let keys = &app.keys;
    match key {
        ConfigKey::UnsplashAccessKey => keys.unsplash_access_key.as_deref(),
        ConfigKey::NpsApiKey => keys.nps_api_key.as_deref(),
        ConfigKey::NasaApiKey => keys.nasa_api_key.as_deref(),
        _ => None,
    }
}

/// One aligned table per section, quota rows grouped by service.
fn render_list(config: &ConfigFile, app: &AppConfig, show_secrets: bool) -> String {
    let settings: Vec<Setting> = ConfigKey::all()
        .into_iter()
        .map(|key| Setting::resolve(key, config, app))
        .collect();
    let width = settings
        .iter()
        .map(|s| s.key.key_name().len())
        .max()
        .unwrap_or(0);

    let mut out = String::new();
    let mut section = "";
    let mut service: Option<Service> = None;
    for setting in &settings {
        if setting.key.section() != section {
            section = setting.key.section();
            service = None;
            if !out.is_empty() {
                out.push('\n');
            }
            let _ = writeln!(out, "[{}]", section);
        }
        if let ConfigKey::QuotaMaxRequests(s) | ConfigKey::QuotaWindowSecs(s) = setting.key {
            if service != Some(s) {
                service = Some(s);
                let _ = writeln!(out, "  # {}", s);
            }
        }
        let _ = writeln!(
            out,
            "  {:<width$}  {}  ({})",
            setting.key.key_name(),
            setting.display_value(show_secrets),
            setting.origin.label(),
            width = width
        );
    }
    out
}

/// Keep the last four characters of a secret visible.
fn mask(value: &str) -> String {
    let chars: Vec<char> = value.chars().collect();
    let tail: String = chars[chars.len().saturating_sub(4)..].iter().collect();
    format!("****{}", tail)
}
