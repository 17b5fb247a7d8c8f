//! m2bar-sources: Built-in status sources for m2bar.

mod battery;
mod clock;
mod mpd;
mod wifi;

pub use battery::{battery_item, BatterySource};
pub use clock::{clock_item, ClockSource};
pub use mpd::{read_response, song_text, MpdConnection, MpdSource};
pub use wifi::WifiSource;

use m2bar_core::{register_source, BoxedSource, RegistryError};
use m2bar_types::{SourceConfig, SourceKind};

fn mismatch(expected: SourceKind, config: &SourceConfig) -> RegistryError {
    RegistryError::InvalidConfig {
        kind: expected,
        message: format!("received a {} config", config.kind()),
    }
}

fn create_battery(config: &SourceConfig) -> Result<BoxedSource, RegistryError> {
    match config {
        SourceConfig::Battery(config) => Ok(Box::new(BatterySource::new(config.clone()))),
        other => Err(mismatch(SourceKind::Battery, other)),
    }
}

fn create_clock(config: &SourceConfig) -> Result<BoxedSource, RegistryError> {
    match config {
        SourceConfig::Clock(config) => Ok(Box::new(ClockSource::new(config.clone())?)),
        other => Err(mismatch(SourceKind::Clock, other)),
    }
}

fn create_wifi(config: &SourceConfig) -> Result<BoxedSource, RegistryError> {
    match config {
        SourceConfig::Wifi(config) => Ok(Box::new(WifiSource::new(config.clone()))),
        other => Err(mismatch(SourceKind::Wifi, other)),
    }
}

fn create_mpd(config: &SourceConfig) -> Result<BoxedSource, RegistryError> {
    match config {
        SourceConfig::Mpd(config) => Ok(Box::new(MpdSource::new(config.clone()))),
        other => Err(mismatch(SourceKind::Mpd, other)),
    }
}

/// Register all built-in sources with the global registry
pub fn register_all() {
    register_source(SourceKind::Battery, create_battery);
    register_source(SourceKind::Clock, create_clock);
    register_source(SourceKind::Wifi, create_wifi);
    register_source(SourceKind::Mpd, create_mpd);
}

#[cfg(test)]
mod tests {
    use super::*;
    use m2bar_core::{create_source, global_registry};
    use m2bar_types::{BatteryConfig, ClockConfig};

    #[test]
    fn test_register_all_covers_every_kind() {
        register_all();
        let registry = global_registry().read().unwrap();
        assert_eq!(registry.list_sources(), SourceKind::ALL.to_vec());
    }

    #[test]
    fn test_create_through_registry() {
        register_all();
        let source = create_source(&SourceConfig::Battery(BatteryConfig::new("BAT0"))).unwrap();
        assert_eq!(source.metadata().label(), "battery:BAT0");

        let bad_tz = ClockConfig {
            timezone: Some("Nowhere/Land".to_string()),
            ..ClockConfig::default()
        };
        assert!(create_source(&SourceConfig::Clock(bad_tz)).is_err());
    }

    #[test]
    fn test_factory_rejects_foreign_config() {
        let err = create_battery(&SourceConfig::Clock(ClockConfig::default())).unwrap_err();
        assert!(matches!(err, RegistryError::InvalidConfig { kind: SourceKind::Battery, .. }));
    }
}
