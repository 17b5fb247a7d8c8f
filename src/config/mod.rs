//! Configuration management

mod settings;

pub use settings::{AppConfig, ConfiguredSource, WidgetConfig};
