//! Source trait and related types

use crate::constants::DEFAULT_FETCH_TIMEOUT;
use crate::error::FetchError;
use async_trait::async_trait;
use m2bar_types::{SourceKind, StatusItem};
use std::fmt;
use std::time::Duration;

/// Metadata about a source instance
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceMetadata {
    pub kind: SourceKind,
    /// Disambiguator when several sources share a kind (device, interface, address)
    pub instance: String,
    /// Human-readable description for listings and logs
    pub description: String,
}

impl SourceMetadata {
    pub fn new(kind: SourceKind, instance: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            kind,
            instance: instance.into(),
            description: description.into(),
        }
    }

    /// Short identifier used in log lines, e.g. `battery:BAT0`
    pub fn label(&self) -> String {
        if self.instance.is_empty() {
            self.kind.to_string()
        } else {
            format!("{}:{}", self.kind, self.instance)
        }
    }
}

/// When a runner refreshes its source
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshPolicy {
    /// Re-fetch every `period`. With `dedup`, a value equal to the last
    /// delivered one is dropped instead of delivered.
    Interval { period: Duration, dedup: bool },
    /// Fetch immediately, then on every multiple of `period` since the
    /// Unix epoch (top of the minute for a 60s period).
    Aligned { period: Duration },
    /// Fetch immediately, then after each [`Source::wait_event`]. A failed
    /// wait is retried after `retry`.
    Event { retry: Duration },
}

/// Trait for all status sources
///
/// A source knows how to fetch one kind of status value. It holds no
/// scheduling logic: the runner drives it according to [`Source::policy`].
#[async_trait]
pub trait Source: Send {
    /// Get metadata about this source
    fn metadata(&self) -> &SourceMetadata;

    fn policy(&self) -> RefreshPolicy;

    /// Upper bound on a single [`Source::fetch`]
    fn timeout(&self) -> Duration {
        DEFAULT_FETCH_TIMEOUT
    }

    /// Item published before the first fetch, for sources whose first fetch
    /// may be slow
    fn placeholder(&self) -> Option<StatusItem> {
        None
    }

    /// Item shown when a fetch fails
    fn error_item(&self) -> StatusItem {
        let meta = self.metadata();
        StatusItem::error(meta.kind.as_str(), meta.instance.clone())
    }

    /// Fetch and classify the current value
    async fn fetch(&mut self) -> Result<StatusItem, FetchError>;

    /// Block until the underlying resource reports a change.
    ///
    /// Only called for [`RefreshPolicy::Event`] sources.
    async fn wait_event(&mut self) -> Result<(), FetchError> {
        Err(FetchError::Fatal(format!(
            "{} source does not support change notification",
            self.metadata().kind
        )))
    }
}

/// Type-erased source for dynamic dispatch
pub type BoxedSource = Box<dyn Source>;

impl fmt::Debug for dyn Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Source")
            .field("metadata", self.metadata())
            .field("policy", &self.policy())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label() {
        let meta = SourceMetadata::new(SourceKind::Battery, "BAT0", "Battery capacity");
        assert_eq!(meta.label(), "battery:BAT0");

        let meta = SourceMetadata::new(SourceKind::Clock, "", "Wall clock");
        assert_eq!(meta.label(), "clock");
    }
}
