//! Name-to-step resolution.
//!
//! The declarative route config refers to steps by name; the registry maps
//! those names onto concrete implementations. Unresolvable names are a
//! fatal configuration error at process start.

use std::sync::Arc;

use rustc_hash::FxHashMap;

use super::{Loader, Step};

/// Registry of available step and loader implementations.
#[derive(Default)]
pub struct StepRegistry {
    steps: FxHashMap<String, Arc<dyn Step>>,
    loaders: FxHashMap<String, Arc<dyn Loader>>,
}

impl StepRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry pre-populated with the built-in steps.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        super::register_builtins(&mut registry);
        registry
    }

    /// Register a producer step under its own name.
    ///
    /// Re-registering a name replaces the previous step; the last
    /// registration wins, so embedders can shadow built-ins.
    pub fn register(&mut self, step: Arc<dyn Step>) {
        self.steps.insert(step.name().to_string(), step);
    }

    /// Register a loader step under its own name.
    pub fn register_loader(&mut self, loader: Arc<dyn Loader>) {
        self.loaders.insert(loader.name().to_string(), loader);
    }

    pub fn resolve(&self, name: &str) -> Option<Arc<dyn Step>> {
        self.steps.get(name).cloned()
    }

    pub fn resolve_loader(&self, name: &str) -> Option<Arc<dyn Loader>> {
        self.loaders.get(name).cloned()
    }

    /// Registered step names, for error hints.
    pub fn step_names(&self) -> Vec<&str> {
        let mut names: Vec<_> = self.steps.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}
