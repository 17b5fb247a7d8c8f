//! m2bar-types: Shared data types for the m2bar status line.
//!
//! This crate contains pure data types (status items, themes, source
//! configs) shared by every m2bar crate. It has no runtime dependencies
//! and performs no I/O.

pub mod color;
pub mod source_configs;
pub mod status;
pub mod theme;

// Re-export commonly used types at the crate root for convenience
pub use color::HexColor;
pub use source_configs::{
    BatteryConfig, ClockConfig, ConfigError, MpdConfig, SourceConfig, SourceKind, SourceSettings,
    WifiConfig,
};
pub use status::{Status, StatusItem, ERROR_TEXT};
pub use theme::{ThemeError, ThemeSpec};
