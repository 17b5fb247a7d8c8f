//! m2bar-core: runtime for the m2bar status line.
//!
//! This crate contains the [`Source`] trait, the kind registry, the
//! per-source [`Runner`], the [`Multiplexer`] that merges every runner into
//! one ordered snapshot, and the [`ProtocolEmitter`] that streams snapshots
//! to the bar.

pub mod constants;
mod emitter;
mod error;
mod multiplexer;
mod registry;
mod runner;
mod source;
mod theme;

pub use constants::{CONDUIT_CAPACITY, DEFAULT_FETCH_TIMEOUT, PROTOCOL_HEADER};
pub use emitter::{encode_snapshot, ProtocolEmitter};
pub use error::{EmitError, FetchError, RegistryError};
pub use multiplexer::{Multiplexer, Snapshot, SourceSlot};
pub use registry::{create_source, global_registry, register_source, Registry, SourceFactory};
pub use runner::{delay_until_boundary, Conduit, Runner};
pub use source::{BoxedSource, RefreshPolicy, Source, SourceMetadata};
pub use theme::apply_theme;

// Re-export types used in trait signatures for convenience
pub use m2bar_types::{SourceConfig, SourceKind, Status, StatusItem, ThemeSpec};
