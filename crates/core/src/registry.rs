//! Registry mapping source kinds to their constructors

use crate::error::RegistryError;
use crate::source::BoxedSource;
use m2bar_types::{SourceConfig, SourceKind};
use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

/// Function that creates a source from its typed config
pub type SourceFactory = fn(&SourceConfig) -> Result<BoxedSource, RegistryError>;

/// Registry of source constructors
///
/// Keys are the closed set of [`SourceKind`]s, so a config naming an unknown
/// kind is rejected while parsing, and a known but unregistered kind is
/// rejected here before any runner starts.
pub struct Registry {
    sources: HashMap<SourceKind, SourceFactory>,
}

impl Registry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self {
            sources: HashMap::new(),
        }
    }

    /// Register a source constructor, replacing any previous one for `kind`
    pub fn register_source(&mut self, kind: SourceKind, factory: SourceFactory) {
        self.sources.insert(kind, factory);
    }

    pub fn contains(&self, kind: SourceKind) -> bool {
        self.sources.contains_key(&kind)
    }

    /// Create a source from its config
    pub fn create_source(&self, config: &SourceConfig) -> Result<BoxedSource, RegistryError> {
        let kind = config.kind();
        let factory = self
            .sources
            .get(&kind)
            .ok_or(RegistryError::Unregistered(kind))?;
        factory(config)
    }

    /// List all registered kinds in a stable order
    pub fn list_sources(&self) -> Vec<SourceKind> {
        let mut kinds: Vec<SourceKind> = self.sources.keys().copied().collect();
        kinds.sort();
        kinds
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

static GLOBAL_REGISTRY: Lazy<RwLock<Registry>> = Lazy::new(|| RwLock::new(Registry::new()));

/// Get the global registry
///
/// Built-in sources are registered once at startup; afterwards the
/// registry is only read.
pub fn global_registry() -> &'static RwLock<Registry> {
    &GLOBAL_REGISTRY
}

/// Register a source with the global registry
pub fn register_source(kind: SourceKind, factory: SourceFactory) {
    global_registry()
        .write()
        .unwrap_or_else(PoisonError::into_inner)
        .register_source(kind, factory);
}

/// Create a source through the global registry
pub fn create_source(config: &SourceConfig) -> Result<BoxedSource, RegistryError> {
    global_registry()
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .create_source(config)
}
