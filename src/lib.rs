//! m2bar: a status line generator for i3bar and swaybar.
//!
//! The binary reads a list of widgets from YAML, runs one source per
//! widget, and streams the merged bar to stdout using the i3bar JSON
//! protocol. Runtime pieces live in `m2bar-core`, the concrete sources in
//! `m2bar-sources`.

pub mod app;
pub mod config;

pub use config::{AppConfig, ConfiguredSource, WidgetConfig};
