//! Request dispatcher
//!
//! Pulls the next entry off the middleware stack and invokes it, passing
//! itself along as `next`. Once the stack runs dry the fallback response is
//! returned.

use crate::middleware::MiddlewareStack;
use crate::registry::HandlerRegistry;
use crate::{Error, Request, Response, Result};
use std::sync::Arc;

/// Per-request dispatcher
pub struct Dispatcher {
    stack: MiddlewareStack,
    registry: Arc<HandlerRegistry>,
    fallback: Response,
}

impl Dispatcher {
    pub fn new(registry: Arc<HandlerRegistry>, stack: MiddlewareStack) -> Self {
        Self {
            stack,
            registry,
            fallback: Response::ok(),
        }
    }

    /// Response returned when no middleware is left
    pub fn with_fallback(mut self, fallback: Response) -> Self {
        self.fallback = fallback;
        self
    }

    /// Queue a handler identifier to run next
    pub fn enqueue(&mut self, identifier: impl Into<String>) {
        self.stack.add(identifier);
    }

    pub fn stack(&self) -> &MiddlewareStack {
        &self.stack
    }

    pub fn registry(&self) -> &HandlerRegistry {
        &self.registry
    }

    /// Run the next middleware
    pub fn handle(&mut self, req: Request) -> Result<Response> {
        match self.stack.next(&self.registry)? {
            Some(middleware) => middleware.process(req, self),
            None => Ok(self.fallback.clone()),
        }
    }

    /// Run the chain and turn errors into responses
    pub fn respond(mut self, req: Request) -> Response {
        let method = req.method;
        let target = req.target.clone();

        match self.handle(req) {
            Ok(res) => res,
            Err(err) => {
                match &err {
                    Error::RouteNotFound(not_found) => {
                        tracing::debug!(%method, %target, identifier = %not_found.identifier, "no route");
                    }
                    _ => tracing::warn!(%method, %target, error = %err, "request failed"),
                }
                Response::from(&err)
            }
        }
    }
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("stack", &self.stack)
            .field("fallback", &self.fallback.status)
            .finish()
    }
}
