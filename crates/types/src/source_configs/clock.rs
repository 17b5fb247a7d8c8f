//! Clock source configuration types.

use super::{default_timeout, ConfigError, SourceKind, SourceSettings};
use chrono::format::{Item, StrftimeItems};
use serde::{Deserialize, Serialize};

/// e.g. "Mon 2 Jan 15:04"
pub const DEFAULT_FULL_FORMAT: &str = "%a %-d %b %H:%M";
/// e.g. "15:04"
pub const DEFAULT_SHORT_FORMAT: &str = "%H:%M";

fn default_update_interval() -> u64 {
    60_000
}

fn default_full_format() -> String {
    DEFAULT_FULL_FORMAT.to_string()
}

fn default_short_format() -> String {
    DEFAULT_SHORT_FORMAT.to_string()
}

/// Clock source configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClockConfig {
    /// Alignment period; updates land on multiples of it
    #[serde(default = "default_update_interval")]
    pub update_interval_ms: u64,
    #[serde(default = "default_timeout")]
    pub timeout_ms: u64,
    #[serde(default = "default_full_format")]
    pub full_format: String,
    #[serde(default = "default_short_format")]
    pub short_format: String,
    /// IANA timezone ID (e.g. "Europe/London"); local time when unset
    #[serde(default)]
    pub timezone: Option<String>,
}

impl Default for ClockConfig {
    fn default() -> Self {
        Self {
            update_interval_ms: default_update_interval(),
            timeout_ms: default_timeout(),
            full_format: default_full_format(),
            short_format: default_short_format(),
            timezone: None,
        }
    }
}

fn check_format(value: &str) -> Result<String, ConfigError> {
    if StrftimeItems::new(value).any(|item| matches!(item, Item::Error)) {
        return Err(ConfigError::InvalidArgument {
            kind: SourceKind::Clock,
            value: value.to_string(),
            reason: "not a valid strftime format".to_string(),
        });
    }
    Ok(value.to_string())
}

impl ClockConfig {
    /// `args: [full_format?, short_format?, timezone?]`
    pub fn from_settings(settings: &SourceSettings) -> Result<Self, ConfigError> {
        let kind = SourceKind::Clock;
        let defaults = Self::default();
        Ok(Self {
            update_interval_ms: settings.interval_or(kind, defaults.update_interval_ms)?,
            timeout_ms: settings.timeout(kind)?,
            full_format: match settings.arg(0) {
                Some(format) => check_format(format)?,
                None => defaults.full_format,
            },
            short_format: match settings.arg(1) {
                Some(format) => check_format(format)?,
                None => defaults.short_format,
            },
            timezone: settings.arg(2).map(str::to_string),
        })
    }
}
