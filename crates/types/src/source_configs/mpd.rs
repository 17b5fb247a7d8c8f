//! MPD source configuration types.

use super::{default_timeout, ConfigError, SourceKind, SourceSettings};
use serde::{Deserialize, Serialize};

fn default_retry_interval() -> u64 {
    5_000
}

/// MPD source configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MpdConfig {
    /// `host:port` of the MPD server
    pub address: String,
    #[serde(default = "default_timeout")]
    pub timeout_ms: u64,
    /// Back-off before re-establishing a failed change watcher
    #[serde(default = "default_retry_interval")]
    pub retry_interval_ms: u64,
}

impl MpdConfig {
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            timeout_ms: default_timeout(),
            retry_interval_ms: default_retry_interval(),
        }
    }

    /// `args: [address]`; `interval_ms` overrides the retry back-off
    pub fn from_settings(settings: &SourceSettings) -> Result<Self, ConfigError> {
        let kind = SourceKind::Mpd;
        let address = settings.required_arg(kind, 0, "address")?;
        let port_ok = address
            .rsplit_once(':')
            .is_some_and(|(host, port)| !host.is_empty() && port.parse::<u16>().is_ok());
        if !port_ok {
            return Err(ConfigError::InvalidArgument {
                kind,
                value: address,
                reason: "expected host:port".to_string(),
            });
        }
        Ok(Self {
            timeout_ms: settings.timeout(kind)?,
            retry_interval_ms: settings.interval_or(kind, default_retry_interval())?,
            ..Self::new(address)
        })
    }
}
