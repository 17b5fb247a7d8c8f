//! Source configuration types for all built-in sources.
//!
//! The config file describes a source positionally (`handler` plus `args`).
//! [`SourceConfig::from_settings`] turns that into the typed config for the
//! kind, validating arguments before any source is constructed.

pub mod battery;
pub mod clock;
pub mod mpd;
pub mod wifi;

pub use battery::BatteryConfig;
pub use clock::ClockConfig;
pub use mpd::MpdConfig;
pub use wifi::WifiConfig;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Default bound on a single fetch
pub const DEFAULT_TIMEOUT_MS: u64 = 10_000;

pub(crate) fn default_timeout() -> u64 {
    DEFAULT_TIMEOUT_MS
}

/// Closed set of source kinds known to m2bar
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    Battery,
    Clock,
    Wifi,
    Mpd,
}

impl SourceKind {
    pub const ALL: [SourceKind; 4] = [
        SourceKind::Battery,
        SourceKind::Clock,
        SourceKind::Wifi,
        SourceKind::Mpd,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SourceKind::Battery => "battery",
            SourceKind::Clock => "clock",
            SourceKind::Wifi => "wifi",
            SourceKind::Mpd => "mpd",
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SourceKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SourceKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| ConfigError::UnknownKind(s.to_string()))
    }
}

/// Errors raised while validating source settings
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("unknown source kind {0:?}")]
    UnknownKind(String),
    #[error("{kind} source requires argument `{name}`")]
    MissingArgument { kind: SourceKind, name: &'static str },
    #[error("{kind} source: invalid argument {value:?}: {reason}")]
    InvalidArgument {
        kind: SourceKind,
        value: String,
        reason: String,
    },
    #[error("{kind} source: {field} must be greater than zero")]
    ZeroDuration { kind: SourceKind, field: &'static str },
}

/// Untyped per-source settings as written in the config file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceSettings {
    #[serde(default)]
    pub args: Vec<String>,
    #[serde(default)]
    pub interval_ms: Option<u64>,
    #[serde(default)]
    pub timeout_ms: Option<u64>,
}

impl SourceSettings {
    pub fn with_args<I, S>(args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            args: args.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    fn arg(&self, index: usize) -> Option<&str> {
        self.args
            .get(index)
            .map(String::as_str)
            .filter(|a| !a.is_empty())
    }

    fn required_arg(&self, kind: SourceKind, index: usize, name: &'static str) -> Result<String, ConfigError> {
        self.arg(index)
            .map(str::to_string)
            .ok_or(ConfigError::MissingArgument { kind, name })
    }

    fn positive(kind: SourceKind, field: &'static str, value: u64) -> Result<u64, ConfigError> {
        if value == 0 {
            Err(ConfigError::ZeroDuration { kind, field })
        } else {
            Ok(value)
        }
    }

    fn interval_or(&self, kind: SourceKind, default: u64) -> Result<u64, ConfigError> {
        Self::positive(kind, "interval_ms", self.interval_ms.unwrap_or(default))
    }

    fn timeout(&self, kind: SourceKind) -> Result<u64, ConfigError> {
        Self::positive(kind, "timeout_ms", self.timeout_ms.unwrap_or_else(default_timeout))
    }
}

/// Typed configuration for one source, tagged by kind
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "source_type", rename_all = "lowercase")]
pub enum SourceConfig {
    Battery(BatteryConfig),
    Clock(ClockConfig),
    Wifi(WifiConfig),
    Mpd(MpdConfig),
}

impl SourceConfig {
    pub fn kind(&self) -> SourceKind {
        match self {
            SourceConfig::Battery(_) => SourceKind::Battery,
            SourceConfig::Clock(_) => SourceKind::Clock,
            SourceConfig::Wifi(_) => SourceKind::Wifi,
            SourceConfig::Mpd(_) => SourceKind::Mpd,
        }
    }

    /// Validate positional settings for `kind` into a typed config
    pub fn from_settings(kind: SourceKind, settings: &SourceSettings) -> Result<Self, ConfigError> {
        Ok(match kind {
            SourceKind::Battery => SourceConfig::Battery(BatteryConfig::from_settings(settings)?),
            SourceKind::Clock => SourceConfig::Clock(ClockConfig::from_settings(settings)?),
            SourceKind::Wifi => SourceConfig::Wifi(WifiConfig::from_settings(settings)?),
            SourceKind::Mpd => SourceConfig::Mpd(MpdConfig::from_settings(settings)?),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_round_trips_through_str() {
        for kind in SourceKind::ALL {
            assert_eq!(kind.as_str().parse::<SourceKind>().unwrap(), kind);
        }
        assert_eq!(
            "volume".parse::<SourceKind>(),
            Err(ConfigError::UnknownKind("volume".to_string()))
        );
    }

    #[test]
    fn test_source_config_serialization() {
        let settings = SourceSettings::with_args(["BAT1"]);
        let config = SourceConfig::from_settings(SourceKind::Battery, &settings).unwrap();
        let json = serde_json::to_string(&config).unwrap();
        assert!(json.contains("\"source_type\":\"battery\""));

        let deserialized: SourceConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(deserialized.kind(), SourceKind::Battery);
        assert_eq!(deserialized, config);
    }

    #[test]
    fn test_zero_interval_rejected() {
        let settings = SourceSettings {
            args: vec!["BAT0".to_string()],
            interval_ms: Some(0),
            timeout_ms: None,
        };
        assert_eq!(
            SourceConfig::from_settings(SourceKind::Battery, &settings),
            Err(ConfigError::ZeroDuration {
                kind: SourceKind::Battery,
                field: "interval_ms"
            })
        );
    }
}
