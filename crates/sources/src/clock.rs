//! Clock source implementation
//!
//! Formats the wall clock. Updates are aligned to the configured period
//! (the top of each minute by default) rather than drifting with start-up.

use async_trait::async_trait;
use chrono::{DateTime, Local, TimeZone, Utc};
use chrono_tz::Tz;
use m2bar_core::{FetchError, RefreshPolicy, RegistryError, Source, SourceMetadata};
use m2bar_types::{ClockConfig, SourceKind, StatusItem};
use std::fmt::Display;
use std::time::Duration;

/// Clock data source
pub struct ClockSource {
    metadata: SourceMetadata,
    config: ClockConfig,
    timezone: Option<Tz>,
}

impl ClockSource {
    pub fn new(config: ClockConfig) -> Result<Self, RegistryError> {
        let timezone = match config.timezone.as_deref() {
            Some(name) => Some(name.parse::<Tz>().map_err(|e| RegistryError::InvalidConfig {
                kind: SourceKind::Clock,
                message: format!("unknown timezone {:?}: {}", name, e),
            })?),
            None => None,
        };
        let metadata = SourceMetadata::new(SourceKind::Clock, "", "Date and time");

        Ok(Self {
            metadata,
            config,
            timezone,
        })
    }

    /// Get current configuration
    pub fn get_config(&self) -> &ClockConfig {
        &self.config
    }
}

/// Render a point in time with the configured formats
pub fn clock_item<Z: TimeZone>(now: &DateTime<Z>, config: &ClockConfig) -> StatusItem
where
    Z::Offset: Display,
{
    StatusItem::new("clock", now.format(&config.full_format).to_string())
        .with_short_text(now.format(&config.short_format).to_string())
}

#[async_trait]
impl Source for ClockSource {
    fn metadata(&self) -> &SourceMetadata {
        &self.metadata
    }

    fn policy(&self) -> RefreshPolicy {
        RefreshPolicy::Aligned {
            period: Duration::from_millis(self.config.update_interval_ms),
        }
    }

    fn timeout(&self) -> Duration {
        Duration::from_millis(self.config.timeout_ms)
    }

    async fn fetch(&mut self) -> Result<StatusItem, FetchError> {
        Ok(match self.timezone {
            Some(tz) => clock_item(&Utc::now().with_timezone(&tz), &self.config),
            None => clock_item(&Local::now(), &self.config),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_formats() {
        let now = Utc.with_ymd_and_hms(2024, 1, 1, 15, 4, 59).unwrap();
        let item = clock_item(&now, &ClockConfig::default());
        assert_eq!(item.name, "clock");
        assert_eq!(item.full_text, "Mon 1 Jan 15:04");
        assert_eq!(item.short_text, "15:04");
        assert!(item.instance.is_empty());
    }

    #[test]
    fn test_timezone_applied() {
        let config = ClockConfig {
            timezone: Some("Asia/Kolkata".to_string()),
            ..ClockConfig::default()
        };
        let source = ClockSource::new(config).unwrap();
        let utc = Utc.with_ymd_and_hms(2024, 1, 1, 15, 4, 0).unwrap();
        let local = utc.with_timezone(&source.timezone.unwrap());
        assert_eq!(clock_item(&local, source.get_config()).short_text, "20:34");
    }

    #[test]
    fn test_unknown_timezone_rejected() {
        let config = ClockConfig {
            timezone: Some("Mars/Olympus_Mons".to_string()),
            ..ClockConfig::default()
        };
        assert!(matches!(
            ClockSource::new(config),
            Err(RegistryError::InvalidConfig {
                kind: SourceKind::Clock,
                ..
            })
        ));
    }

    #[test]
    fn test_policy_is_minute_aligned() {
        let source = ClockSource::new(ClockConfig::default()).unwrap();
        assert_eq!(
            source.policy(),
            RefreshPolicy::Aligned {
                period: Duration::from_secs(60)
            }
        );
    }

    #[tokio::test]
    async fn test_fetch_produces_text() {
        let mut source = ClockSource::new(ClockConfig::default()).unwrap();
        let item = source.fetch().await.unwrap();
        assert!(!item.full_text.is_empty());
        assert_eq!(item.short_text.len(), 5);
    }
}
