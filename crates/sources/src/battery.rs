//! Battery capacity source
//!
//! Reads the kernel's `capacity` attribute for a power supply device.

use async_trait::async_trait;
use m2bar_core::{FetchError, RefreshPolicy, Source, SourceMetadata};
use m2bar_types::{BatteryConfig, SourceKind, Status, StatusItem};
use std::io::ErrorKind;
use std::path::PathBuf;
use std::time::Duration;

/// Battery data source
///
/// Delivery is deduplicated: an unchanged capacity is not re-sent.
pub struct BatterySource {
    metadata: SourceMetadata,
    config: BatteryConfig,
    path: PathBuf,
}

impl BatterySource {
    pub fn new(config: BatteryConfig) -> Self {
        let metadata = SourceMetadata::new(
            SourceKind::Battery,
            config.device.clone(),
            "Battery charge level from sysfs",
        );
        let path = PathBuf::from(&config.sysfs_root)
            .join(&config.device)
            .join("capacity");

        Self {
            metadata,
            config,
            path,
        }
    }

    /// Get current configuration
    pub fn get_config(&self) -> &BatteryConfig {
        &self.config
    }
}

/// Turn the raw `capacity` contents into a classified item
pub fn battery_item(device: &str, raw: &str, warn_threshold: u32) -> Result<StatusItem, FetchError> {
    let percent: u32 = raw
        .trim()
        .parse()
        .map_err(|e| FetchError::transient(format!("bad capacity {:?}: {}", raw.trim(), e)))?;
    let percent = percent.min(100);
    let status = if percent <= warn_threshold {
        Status::Warn
    } else {
        Status::Normal
    };

    Ok(StatusItem::new("battery", format!("{}%", percent))
        .with_instance(device)
        .with_status(status))
}

#[async_trait]
impl Source for BatterySource {
    fn metadata(&self) -> &SourceMetadata {
        &self.metadata
    }

    fn policy(&self) -> RefreshPolicy {
        RefreshPolicy::Interval {
            period: Duration::from_millis(self.config.update_interval_ms),
            dedup: true,
        }
    }

    fn timeout(&self) -> Duration {
        Duration::from_millis(self.config.timeout_ms)
    }

    async fn fetch(&mut self) -> Result<StatusItem, FetchError> {
        let raw = match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            // The device is not there at all: retrying will not help
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(FetchError::fatal(format!("{}: {}", self.path.display(), e)));
            }
            Err(e) => {
                return Err(FetchError::transient(format!("{}: {}", self.path.display(), e)));
            }
        };
        battery_item(&self.config.device, &raw, self.config.warn_threshold)
    }
}
