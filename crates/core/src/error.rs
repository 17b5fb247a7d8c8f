//! Error types for the m2bar runtime

use m2bar_types::SourceKind;
use std::fmt::Display;
use std::io;
use thiserror::Error;

/// Failure of a single fetch or event wait
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// Resource temporarily unreadable; the slot shows an error and the
    /// runner keeps going.
    #[error("{0}")]
    Transient(String),
    /// Resource misconfigured for good; the runner stops after publishing
    /// a permanent error item.
    #[error("{0}")]
    Fatal(String),
}

impl FetchError {
    pub fn transient(err: impl Display) -> Self {
        FetchError::Transient(err.to_string())
    }

    pub fn fatal(err: impl Display) -> Self {
        FetchError::Fatal(err.to_string())
    }

    pub fn is_fatal(&self) -> bool {
        matches!(self, FetchError::Fatal(_))
    }
}

/// Failure to write a snapshot to the protocol stream
#[derive(Debug, Error)]
pub enum EmitError {
    #[error("failed to encode snapshot: {0}")]
    Serialize(#[from] serde_json::Error),
    /// The consumer went away (broken pipe)
    #[error("output stream closed by consumer")]
    Closed,
    #[error("failed to write snapshot: {0}")]
    Io(io::Error),
}

impl From<io::Error> for EmitError {
    fn from(err: io::Error) -> Self {
        if err.kind() == io::ErrorKind::BrokenPipe {
            EmitError::Closed
        } else {
            EmitError::Io(err)
        }
    }
}

/// Failure to build a source from its config
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("no source registered for kind {0}")]
    Unregistered(SourceKind),
    #[error("{kind} source: {message}")]
    InvalidConfig { kind: SourceKind, message: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_broken_pipe_maps_to_closed() {
        let err: EmitError = io::Error::new(io::ErrorKind::BrokenPipe, "gone").into();
        assert!(matches!(err, EmitError::Closed));

        let err: EmitError = io::Error::new(io::ErrorKind::Other, "disk full").into();
        assert!(matches!(err, EmitError::Io(_)));
    }

    #[test]
    fn test_fetch_error_constructors() {
        assert!(FetchError::fatal("no such device").is_fatal());
        assert!(!FetchError::transient("connection refused").is_fatal());
        assert_eq!(FetchError::transient("x").to_string(), "x");
    }
}
