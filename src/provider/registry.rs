//! Registry of the mod sources and mod loaders available to a command.

use std::collections::HashMap;
use std::sync::Arc;

use anyhow::{Context, Result};

use super::{LoaderKind, ModLoader, ModSource, SourceKind};

/// Looks up source and loader implementations by kind.
#[derive(Default)]
pub struct ProviderRegistry {
    sources: HashMap<SourceKind, Arc<dyn ModSource>>,
    loaders: HashMap<LoaderKind, Arc<dyn ModLoader>>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a mod source. Replaces any source of the same kind.
    pub fn register_source(&mut self, source: Arc<dyn ModSource>) {
        self.sources.insert(source.kind(), source);
    }

    /// Register a mod loader. Replaces any loader of the same kind.
    pub fn register_loader(&mut self, loader: Arc<dyn ModLoader>) {
        self.loaders.insert(loader.kind(), loader);
    }

    pub fn source(&self, kind: SourceKind) -> Result<&Arc<dyn ModSource>> {
        self.sources
            .get(&kind)
            .with_context(|| format!("No mod source registered for kind: {}", kind))
    }

    pub fn loader(&self, kind: LoaderKind) -> Result<&Arc<dyn ModLoader>> {
        self.loaders
            .get(&kind)
            .with_context(|| format!("No mod loader registered for kind: {}", kind))
    }

    pub fn has_source(&self, kind: SourceKind) -> bool {
        self.sources.contains_key(&kind)
    }

    pub fn has_loader(&self, kind: LoaderKind) -> bool {
        self.loaders.contains_key(&kind)
    }

    /// Registered source kinds, sorted.
    pub fn source_kinds(&self) -> Vec<SourceKind> {
        let mut kinds: Vec<_> = self.sources.keys().copied().collect();
        kinds.sort();
        kinds
    }

    /// Registered loader kinds, sorted.
    pub fn loader_kinds(&self) -> Vec<LoaderKind> {
        let mut kinds: Vec<_> = self.loaders.keys().copied().collect();
        kinds.sort();
        kinds
    }
}
