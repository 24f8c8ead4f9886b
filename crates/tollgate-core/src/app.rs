//! Application: handler registry plus the middleware every request runs

use crate::config::RouterConfig;
use crate::dispatch::Dispatcher;
use crate::middleware::{Middleware, MiddlewareStack};
use crate::registry::HandlerRegistry;
use crate::routing::Router;
use crate::{Request, Response};
use std::sync::Arc;

/// Shared application state
///
/// Each request gets a fresh [`Dispatcher`] whose stack holds the global
/// middleware in insertion order followed by the [`Router`].
pub struct App {
    registry: Arc<HandlerRegistry>,
    middleware: Vec<Arc<dyn Middleware>>,
    router: Arc<Router>,
    fallback: Response,
}

impl App {
    pub fn new(router: Router) -> Self {
        Self {
            registry: Arc::new(HandlerRegistry::new()),
            middleware: Vec::new(),
            router: Arc::new(router),
            fallback: Response::ok(),
        }
    }

    pub fn from_config(config: &RouterConfig) -> Self {
        Self::new(Router::from_config(config))
    }

    /// Add middleware that runs before routing
    pub fn wrap<M: Middleware + 'static>(mut self, middleware: M) -> Self {
        self.middleware.push(Arc::new(middleware));
        self
    }

    /// Response returned when the chain ends without a handler answering
    pub fn with_fallback(mut self, fallback: Response) -> Self {
        self.fallback = fallback;
        self
    }

    pub fn registry(&self) -> &Arc<HandlerRegistry> {
        &self.registry
    }

    pub fn router(&self) -> &Router {
        &self.router
    }

    /// Dispatcher for one request
    pub fn dispatcher(&self) -> Dispatcher {
        let mut stack = MiddlewareStack::new();
        for middleware in &self.middleware {
            stack.push_shared(middleware.clone());
        }
        stack.push_shared(self.router.clone());
        Dispatcher::new(self.registry.clone(), stack).with_fallback(self.fallback.clone())
    }

    /// Dispatch a request, mapping errors to responses
    pub fn handle(&self, req: Request) -> Response {
        self.dispatcher().respond(req)
    }
}

impl std::fmt::Debug for App {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("App")
            .field("registry", &self.registry)
            .field("middleware", &self.middleware.len())
            .field("router", &self.router)
            .finish()
    }
}
