//! Status items: the unit of data exchanged between sources and the bar.

use crate::color::HexColor;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Semantic classification of a status value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    #[default]
    Normal,
    Warn,
    Error,
}

impl Status {
    pub fn is_normal(&self) -> bool {
        matches!(self, Status::Normal)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Normal => "normal",
            Status::Warn => "warn",
            Status::Error => "error",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One bar block as produced by a source on a single update.
///
/// Serializes to the block object of the i3bar protocol. Empty optional
/// fields and a `normal` status are left out of the JSON entirely.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StatusItem {
    /// Source kind identifier (e.g. "battery")
    pub name: String,
    /// Disambiguates several sources of the same kind
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub instance: String,
    pub full_text: String,
    /// Used by the host when space is tight
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub short_text: String,
    /// Render hint; `None` means the host default
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<HexColor>,
    #[serde(rename = "_status", default, skip_serializing_if = "Status::is_normal")]
    pub status: Status,
}

/// Text shown in a slot whose source failed
pub const ERROR_TEXT: &str = "error";

impl StatusItem {
    pub fn new(name: impl Into<String>, full_text: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            full_text: full_text.into(),
            ..Self::default()
        }
    }

    /// An item that only reserves the slot (no text yet)
    pub fn empty(name: impl Into<String>, instance: impl Into<String>) -> Self {
        Self::new(name, "").with_instance(instance)
    }

    /// The visible error marker for a failed source
    pub fn error(name: impl Into<String>, instance: impl Into<String>) -> Self {
        Self::new(name, ERROR_TEXT)
            .with_instance(instance)
            .with_status(Status::Error)
    }

    pub fn with_instance(mut self, instance: impl Into<String>) -> Self {
        self.instance = instance.into();
        self
    }

    pub fn with_short_text(mut self, short_text: impl Into<String>) -> Self {
        self.short_text = short_text.into();
        self
    }

    pub fn with_status(mut self, status: Status) -> Self {
        self.status = status;
        self
    }

    pub fn with_color(mut self, color: HexColor) -> Self {
        self.color = Some(color);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normal_item_omits_optional_fields() {
        let item = StatusItem::new("battery", "42%");
        let json = serde_json::to_string(&item).unwrap();
        assert_eq!(json, r#"{"name":"battery","full_text":"42%"}"#);
    }

    #[test]
    fn test_status_serialized_with_underscore_key() {
        let item = StatusItem::new("battery", "10%")
            .with_instance("BAT0")
            .with_status(Status::Warn);
        let json = serde_json::to_string(&item).unwrap();
        assert!(json.contains(r#""instance":"BAT0""#));
        assert!(json.contains(r#""_status":"warn""#));
        assert!(!json.contains("short_text"));
        assert!(!json.contains("color"));
    }

    #[test]
    fn test_error_item() {
        let item = StatusItem::error("mpd", "localhost:6600");
        assert_eq!(item.full_text, ERROR_TEXT);
        assert_eq!(item.status, Status::Error);
        assert_eq!(item.instance, "localhost:6600");
    }

    #[test]
    fn test_missing_status_reads_back_as_normal() {
        let item: StatusItem = serde_json::from_str(r#"{"name":"clock","full_text":"x"}"#).unwrap();
        assert_eq!(item.status, Status::Normal);
        assert!(item.color.is_none());
    }
}
