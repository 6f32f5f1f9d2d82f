use std::{
    fmt, fs,
    path::{Path, PathBuf},
};

use anyhow::Context;
use calc_core::{InteractionOptions, DEFAULT_EVENT_QUEUE_CAPACITY};
use shared::domain::{Mode, Radix};

pub const DEFAULT_CONFIG_FILE: &str = "calculator.toml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub history_limit: Option<usize>,
    pub event_queue_capacity: usize,
    pub initial_mode: Mode,
    pub initial_radix: Radix,
    pub log_filter: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            history_limit: None,
            event_queue_capacity: DEFAULT_EVENT_QUEUE_CAPACITY,
            initial_mode: Mode::Standard,
            initial_radix: Radix::Decimal,
            log_filter: "info".into(),
        }
    }
}

impl Settings {
    pub fn interaction_options(&self) -> InteractionOptions {
        InteractionOptions {
            history_limit: self.history_limit,
            event_queue_capacity: self.event_queue_capacity,
        }
    }

    fn apply(&mut self, key: &str, raw: &str) -> Result<(), ConfigIssue> {
        let malformed = || ConfigIssue::Malformed {
            key: key.to_string(),
            value: raw.to_string(),
        };
        let value = raw.trim();
        match key {
            // 0 keeps every entry
            "history_limit" => {
                let limit = value.parse::<usize>().map_err(|_| malformed())?;
                self.history_limit = (limit > 0).then_some(limit);
            }
            "event_queue_capacity" => {
                self.event_queue_capacity = value
                    .parse::<usize>()
                    .ok()
                    .filter(|capacity| *capacity > 0)
                    .ok_or_else(malformed)?;
            }
            "initial_mode" => self.initial_mode = value.parse().map_err(|_| malformed())?,
            "initial_radix" => self.initial_radix = value.parse().map_err(|_| malformed())?,
            "log_filter" => {
                if value.is_empty() {
                    return Err(malformed());
                }
                self.log_filter = value.to_string();
            }
            _ => return Err(ConfigIssue::UnknownKey(key.to_string())),
        }
        Ok(())
    }
}

const KEYS: [&str; 5] = [
    "history_limit",
    "event_queue_capacity",
    "initial_mode",
    "initial_radix",
    "log_filter",
];

/// A configuration value that was skipped. Loading continues with the
/// previous value for that key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigIssue {
    Malformed { key: String, value: String },
    UnknownKey(String),
}

impl fmt::Display for ConfigIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigIssue::Malformed { key, value } => {
                write!(f, "malformed value {value:?} for '{key}'")
            }
            ConfigIssue::UnknownKey(key) => write!(f, "unknown key '{key}'"),
        }
    }
}

#[derive(Debug)]
pub struct LoadedSettings {
    pub settings: Settings,
    pub source: Option<PathBuf>,
    pub issues: Vec<ConfigIssue>,
}

/// Loads settings from `path`, or from `calculator.toml` in the working
/// directory when no path is given, then applies `APP__*` overrides.
///
/// An explicit path must exist; the default file is optional.
pub fn load_settings(path: Option<&Path>) -> anyhow::Result<LoadedSettings> {
    load_settings_with(path, |name| std::env::var(name).ok())
}

fn load_settings_with(
    path: Option<&Path>,
    env: impl Fn(&str) -> Option<String>,
) -> anyhow::Result<LoadedSettings> {
    let mut loaded = LoadedSettings {
        settings: Settings::default(),
        source: None,
        issues: Vec::new(),
    };

    let file = match path {
        Some(path) => {
            let raw = fs::read_to_string(path)
                .with_context(|| format!("failed to read config file '{}'", path.display()))?;
            Some((path.to_path_buf(), raw))
        }
        None => fs::read_to_string(DEFAULT_CONFIG_FILE)
            .ok()
            .map(|raw| (PathBuf::from(DEFAULT_CONFIG_FILE), raw)),
    };

    if let Some((path, raw)) = file {
        let file_cfg: toml::Table = toml::from_str(&raw)
            .with_context(|| format!("failed to parse config file '{}'", path.display()))?;
        for (key, value) in &file_cfg {
            let text = match value {
                toml::Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            if let Err(issue) = loaded.settings.apply(key, &text) {
                loaded.issues.push(issue);
            }
        }
        loaded.source = Some(path);
    }

    for key in KEYS {
        let name = format!("APP__{}", key.to_ascii_uppercase());
        if let Some(value) = env(&name) {
            if let Err(issue) = loaded.settings.apply(key, &value) {
                loaded.issues.push(issue);
            }
        }
    }

    Ok(loaded)
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
