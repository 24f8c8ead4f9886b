//! Handler registry: the handler identifier namespace
//!
//! Maps fully-qualified identifiers such as `app.Foo.Bar.GetBaz` to
//! factories. The registry is append-only; an identifier, once registered,
//! keeps its first factory.

use crate::middleware::Middleware;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use tollgate_router::HandlerExists;

/// Creates a fresh handler for one request
pub type HandlerFactory = Arc<dyn Fn() -> Arc<dyn Middleware> + Send + Sync>;

/// Thread-safe identifier -> handler factory map
#[derive(Default)]
pub struct HandlerRegistry {
    factories: RwLock<HashMap<String, HandlerFactory>>,
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a factory; returns `false` if the identifier already exists
    pub fn register<F, M>(&self, identifier: impl Into<String>, factory: F) -> bool
    where
        F: Fn() -> M + Send + Sync + 'static,
        M: Middleware + 'static,
    {
        self.insert(
            identifier.into(),
            Arc::new(move || Arc::new(factory()) as Arc<dyn Middleware>),
        )
    }

    /// Register a handler type constructed with `Default`
    pub fn register_handler<M>(&self, identifier: impl Into<String>) -> bool
    where
        M: Middleware + Default + 'static,
    {
        self.register(identifier, M::default)
    }

    /// Register one instance shared by every request
    pub fn register_shared(&self, identifier: impl Into<String>, handler: Arc<dyn Middleware>) -> bool {
        self.insert(identifier.into(), Arc::new(move || handler.clone()))
    }

    fn insert(&self, identifier: String, factory: HandlerFactory) -> bool {
        let mut factories = self.factories.write();
        if factories.contains_key(&identifier) {
            tracing::warn!(%identifier, "handler already registered, keeping the first");
            return false;
        }
        tracing::debug!(%identifier, "handler registered");
        factories.insert(identifier, factory);
        true
    }

    pub fn contains(&self, identifier: &str) -> bool {
        self.factories.read().contains_key(identifier)
    }

    /// Create the handler registered under `identifier`
    pub fn instantiate(&self, identifier: &str) -> Option<Arc<dyn Middleware>> {
        // Factory runs outside the lock
        let factory = self.factories.read().get(identifier).cloned()?;
        Some(factory())
    }

    /// Registered identifiers, sorted
    pub fn identifiers(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.factories.read().keys().cloned().collect();
        ids.sort();
        ids
    }

    pub fn len(&self) -> usize {
        self.factories.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.factories.read().is_empty()
    }
}

impl HandlerExists for HandlerRegistry {
    fn exists(&self, identifier: &str) -> bool {
        self.contains(identifier)
    }
}

impl std::fmt::Debug for HandlerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HandlerRegistry")
            .field("identifiers", &self.identifiers())
            .finish()
    }
}
