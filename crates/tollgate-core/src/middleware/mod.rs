//! Middleware and the middleware stack
//!
//! A middleware receives the request together with the dispatcher and
//! decides whether to call `next.handle(req)` or answer on its own. Handlers
//! resolved by the router are middleware too; they simply never call `next`.

pub mod trace;

pub use trace::{RequestTrace, TraceConfig};

use crate::dispatch::Dispatcher;
use crate::registry::HandlerRegistry;
use crate::{Error, Request, Response, Result};
use std::collections::VecDeque;
use std::sync::Arc;

/// Middleware trait - process a request, optionally delegating to `next`
pub trait Middleware: Send + Sync {
    fn process(&self, req: Request, next: &mut Dispatcher) -> Result<Response>;
}

impl<F> Middleware for F
where
    F: Fn(Request, &mut Dispatcher) -> Result<Response> + Send + Sync,
{
    fn process(&self, req: Request, next: &mut Dispatcher) -> Result<Response> {
        self(req, next)
    }
}

/// Pin closure argument types for use as a [`Middleware`]
pub fn middleware_fn<F>(f: F) -> F
where
    F: Fn(Request, &mut Dispatcher) -> Result<Response> + Send + Sync,
{
    f
}

/// Terminal handler that never calls `next`
pub struct HandlerFn<F>(F);

/// Wrap a `Fn(&Request) -> Result<Response>` as a terminal handler
///
/// ```
/// use tollgate_core::{handler_fn, Response};
///
/// let index = handler_fn(|_req| Ok(Response::text("hello")));
/// ```
pub fn handler_fn<F>(f: F) -> HandlerFn<F>
where
    F: Fn(&Request) -> Result<Response> + Send + Sync,
{
    HandlerFn(f)
}

impl<F> Middleware for HandlerFn<F>
where
    F: Fn(&Request) -> Result<Response> + Send + Sync,
{
    fn process(&self, req: Request, _next: &mut Dispatcher) -> Result<Response> {
        (self.0)(&req)
    }
}

#[derive(Clone)]
enum Entry {
    Instance(Arc<dyn Middleware>),
    /// Instantiated from the registry when popped
    Named(String),
}

/// FIFO of middleware still to run for one request
#[derive(Clone, Default)]
pub struct MiddlewareStack {
    entries: VecDeque<Entry>,
}

impl MiddlewareStack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a middleware instance
    pub fn push<M: Middleware + 'static>(&mut self, middleware: M) {
        self.entries.push_back(Entry::Instance(Arc::new(middleware)));
    }

    /// Append a shared middleware instance
    pub fn push_shared(&mut self, middleware: Arc<dyn Middleware>) {
        self.entries.push_back(Entry::Instance(middleware));
    }

    /// Append a handler by identifier
    pub fn add(&mut self, identifier: impl Into<String>) {
        self.entries.push_back(Entry::Named(identifier.into()));
    }

    /// Pop the next middleware, instantiating named handlers
    pub fn next(&mut self, registry: &HandlerRegistry) -> Result<Option<Arc<dyn Middleware>>> {
        match self.entries.pop_front() {
            None => Ok(None),
            Some(Entry::Instance(middleware)) => Ok(Some(middleware)),
            Some(Entry::Named(identifier)) => registry
                .instantiate(&identifier)
                .map(Some)
                .ok_or(Error::HandlerMissing(identifier)),
        }
    }

    /// Identifiers of named entries still queued
    pub fn pending(&self) -> Vec<&str> {
        self.entries
            .iter()
            .filter_map(|entry| match entry {
                Entry::Named(identifier) => Some(identifier.as_str()),
                Entry::Instance(_) => None,
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl std::fmt::Debug for MiddlewareStack {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MiddlewareStack")
            .field("len", &self.entries.len())
            .field("pending", &self.pending())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Method;

    #[test]
    fn test_stack_is_fifo() {
        let registry = HandlerRegistry::new();
        registry.register("app.GetA", || handler_fn(|_| Ok(Response::text("a"))));

        let mut stack = MiddlewareStack::new();
        stack.push(handler_fn(|_| Ok(Response::text("first"))));
        stack.add("app.GetA");
        assert_eq!(stack.len(), 2);
        assert_eq!(stack.pending(), ["app.GetA"]);

        let mut next = Dispatcher::new(Arc::new(HandlerRegistry::new()), MiddlewareStack::new());
        let req = Request::new(Method::Get, "/");

        let first = stack.next(&registry).unwrap().unwrap();
        let res = first.process(req.clone(), &mut next).unwrap();
        assert_eq!(res.body_string().as_deref(), Some("first"));

        let second = stack.next(&registry).unwrap().unwrap();
        let res = second.process(req, &mut next).unwrap();
        assert_eq!(res.body_string().as_deref(), Some("a"));

        assert!(stack.next(&registry).unwrap().is_none());
        assert!(stack.is_empty());
    }

    #[test]
    fn test_unregistered_identifier() {
        let registry = HandlerRegistry::new();
        let mut stack = MiddlewareStack::new();
        stack.add("app.GetMissing");

        match stack.next(&registry) {
            Err(Error::HandlerMissing(id)) => assert_eq!(id, "app.GetMissing"),
            other => panic!("unexpected: {:?}", other.map(|m| m.is_some())),
        }
    }
}
