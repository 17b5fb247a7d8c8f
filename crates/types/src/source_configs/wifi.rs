//! Wireless source configuration types.

use super::{default_timeout, ConfigError, SourceKind, SourceSettings};
use serde::{Deserialize, Serialize};

/// Kernel limit on interface names, including the trailing NUL
pub const IFNAMSIZ: usize = 16;

fn default_update_interval() -> u64 {
    15_000
}

/// Wireless source configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WifiConfig {
    /// Wireless interface name (e.g. "wlan0")
    pub interface: String,
    #[serde(default = "default_update_interval")]
    pub update_interval_ms: u64,
    #[serde(default = "default_timeout")]
    pub timeout_ms: u64,
}

impl WifiConfig {
    pub fn new(interface: impl Into<String>) -> Self {
        Self {
            interface: interface.into(),
            update_interval_ms: default_update_interval(),
            timeout_ms: default_timeout(),
        }
    }

    /// `args: [interface]`
    pub fn from_settings(settings: &SourceSettings) -> Result<Self, ConfigError> {
        let kind = SourceKind::Wifi;
        let interface = settings.required_arg(kind, 0, "interface")?;
        if interface.len() >= IFNAMSIZ || interface.contains('\0') {
            return Err(ConfigError::InvalidArgument {
                kind,
                value: interface,
                reason: format!("interface names are at most {} bytes", IFNAMSIZ - 1),
            });
        }
        Ok(Self {
            update_interval_ms: settings.interval_or(kind, default_update_interval())?,
            timeout_ms: settings.timeout(kind)?,
            ..Self::new(interface)
        })
    }
}
