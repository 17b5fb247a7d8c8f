//! Battery source configuration types.

use super::{default_timeout, ConfigError, SourceKind, SourceSettings};
use serde::{Deserialize, Serialize};

/// Where the kernel exposes power supplies
pub const DEFAULT_SYSFS_ROOT: &str = "/sys/class/power_supply";

fn default_update_interval() -> u64 {
    15_000
}

fn default_sysfs_root() -> String {
    DEFAULT_SYSFS_ROOT.to_string()
}

fn default_warn_threshold() -> u32 {
    15
}

/// Battery source configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatteryConfig {
    /// Power supply device name (e.g. "BAT0")
    pub device: String,
    #[serde(default = "default_update_interval")]
    pub update_interval_ms: u64,
    #[serde(default = "default_timeout")]
    pub timeout_ms: u64,
    /// Capacity at or below this percentage is reported as `warn`
    #[serde(default = "default_warn_threshold")]
    pub warn_threshold: u32,
    #[serde(default = "default_sysfs_root")]
    pub sysfs_root: String,
}

impl BatteryConfig {
    pub fn new(device: impl Into<String>) -> Self {
        Self {
            device: device.into(),
            update_interval_ms: default_update_interval(),
            timeout_ms: default_timeout(),
            warn_threshold: default_warn_threshold(),
            sysfs_root: default_sysfs_root(),
        }
    }

    /// `args: [device]`
    pub fn from_settings(settings: &SourceSettings) -> Result<Self, ConfigError> {
        let kind = SourceKind::Battery;
        let device = settings.required_arg(kind, 0, "device")?;
        if device.contains('/') {
            return Err(ConfigError::InvalidArgument {
                kind,
                value: device,
                reason: "device name must not contain '/'".to_string(),
            });
        }
        Ok(Self {
            update_interval_ms: settings.interval_or(kind, default_update_interval())?,
            timeout_ms: settings.timeout(kind)?,
            ..Self::new(device)
        })
    }
}
