//! Application and widget configuration

use anyhow::{Context, Result};
use m2bar_types::{SourceConfig, SourceKind, SourceSettings, ThemeSpec};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application-wide configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Bar segments, left to right
    #[serde(default)]
    pub widgets: Vec<WidgetConfig>,
}

/// One bar segment as written in the config file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WidgetConfig {
    /// Source kind (battery, clock, wifi, mpd)
    pub handler: String,
    #[serde(default)]
    pub args: Vec<String>,
    /// 0, 1 or 3 `#RRGGBB` colors
    #[serde(default)]
    pub color: Vec<String>,
    /// Glyph prepended to the text
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default)]
    pub interval_ms: Option<u64>,
    #[serde(default)]
    pub timeout_ms: Option<u64>,
}

/// A validated widget, ready to be turned into a source
#[derive(Debug, Clone, PartialEq)]
pub struct ConfiguredSource {
    pub config: SourceConfig,
    pub theme: ThemeSpec,
}

impl WidgetConfig {
    pub fn new(handler: impl Into<String>) -> Self {
        Self {
            handler: handler.into(),
            args: Vec::new(),
            color: Vec::new(),
            icon: None,
            interval_ms: None,
            timeout_ms: None,
        }
    }

    fn validate(&self) -> Result<ConfiguredSource> {
        let kind: SourceKind = self.handler.parse()?;
        let settings = SourceSettings {
            args: self.args.clone(),
            interval_ms: self.interval_ms,
            timeout_ms: self.timeout_ms,
        };
        Ok(ConfiguredSource {
            config: SourceConfig::from_settings(kind, &settings)?,
            theme: ThemeSpec::parse(self.color.as_slice(), self.icon.clone())?,
        })
    }
}

impl AppConfig {
    /// Default config location, `$XDG_CONFIG_HOME/m2bar/config.yml` on Linux
    pub fn default_path() -> Result<PathBuf> {
        let dirs = directories::ProjectDirs::from("", "", "m2bar")
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;

        Ok(dirs.config_dir().join("config.yml"))
    }

    /// Parse a config document. JSON is accepted too, being valid YAML.
    pub fn from_yaml(content: &str) -> Result<Self> {
        let config = serde_yaml::from_str(content).context("invalid config syntax")?;
        Ok(config)
    }

    /// Load configuration from a specific file path
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Unable to read config file {}", path.display()))?;
        Self::from_yaml(&content).with_context(|| format!("in {}", path.display()))
    }

    /// Load from the default location
    pub fn load() -> Result<Self> {
        Self::load_from_path(&Self::default_path()?)
    }

    /// Validate every widget, in order. The first bad widget fails the load.
    pub fn validate(&self) -> Result<Vec<ConfiguredSource>> {
        self.widgets
            .iter()
            .enumerate()
            .map(|(index, widget)| {
                widget
                    .validate()
                    .with_context(|| format!("widget #{} ({})", index + 1, widget.handler))
            })
            .collect()
    }
}
