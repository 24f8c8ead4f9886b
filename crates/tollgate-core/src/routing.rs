//! Routing middleware and the per-request route context

use crate::config::RouterConfig;
use crate::dispatch::Dispatcher;
use crate::middleware::Middleware;
use crate::{Request, Response, Result};
use std::sync::Arc;
use tollgate_router::{ResolvedRoute, Resolver};

/// Route information available to handlers through [`Request::route`]
#[derive(Debug, Clone)]
pub struct RouteContext {
    route: Arc<ResolvedRoute>,
    resolver: Arc<Resolver>,
}

impl RouteContext {
    pub fn new(route: ResolvedRoute, resolver: Arc<Resolver>) -> Self {
        Self {
            route: Arc::new(route),
            resolver,
        }
    }

    /// All positional parameters after the matched route
    pub fn params(&self) -> &[String] {
        self.route.params()
    }

    pub fn param(&self, index: usize) -> Option<&str> {
        self.route.param(index)
    }

    /// Parameter at `index`, or `default` if absent
    pub fn param_or<'a>(&'a self, index: usize, default: &'a str) -> &'a str {
        self.param(index).unwrap_or(default)
    }

    /// Mount point of the application, for building links to resources
    pub fn base_path(&self) -> &str {
        self.route.base_path()
    }

    /// Route part of the current request without parameters
    pub fn current_route(&self) -> &str {
        self.route.current_route()
    }

    /// Identifier of the handler serving this request
    pub fn handler(&self) -> &str {
        self.route.handler()
    }

    pub fn resolved(&self) -> &ResolvedRoute {
        &self.route
    }

    /// Route for `identifier`, relative to the base path
    pub fn build_route<S: AsRef<str>>(&self, identifier: &str, params: &[S]) -> String {
        self.resolver.build(identifier, params)
    }

    /// Absolute path for `identifier`, prefixed with the base path
    pub fn link<S: AsRef<str>>(&self, identifier: &str, params: &[S]) -> String {
        let route = self.build_route(identifier, params);
        if route == "/" {
            self.base_path().to_string()
        } else {
            format!("{}{}", self.base_path(), route)
        }
    }
}

/// Resolves the request to a handler identifier and queues it
///
/// Uses the dispatcher's registry as the namespace oracle. On success the
/// [`RouteContext`] is attached to the request before the chain continues.
#[derive(Debug, Clone)]
pub struct Router {
    resolver: Arc<Resolver>,
    script_name: String,
}

impl Router {
    pub fn new(resolver: Resolver) -> Self {
        Self {
            resolver: Arc::new(resolver),
            script_name: String::new(),
        }
    }

    pub fn from_config(config: &RouterConfig) -> Self {
        Self::new(config.resolver()).with_script_name(config.script_name.clone())
    }

    /// Script name used when the request carries none
    pub fn with_script_name(mut self, script_name: impl Into<String>) -> Self {
        self.script_name = script_name.into();
        self
    }

    pub fn resolver(&self) -> &Resolver {
        &self.resolver
    }

    pub fn script_name(&self) -> &str {
        &self.script_name
    }
}

impl Middleware for Router {
    fn process(&self, mut req: Request, next: &mut Dispatcher) -> Result<Response> {
        let script_name = if req.script_name.is_empty() {
            self.script_name.as_str()
        } else {
            req.script_name.as_str()
        };

        let route = self
            .resolver
            .resolve(req.method.as_str(), &req.target, script_name, next.registry())
            .map_err(|err| {
                tracing::debug!(identifier = %err.identifier, "route not found");
                err
            })?;

        tracing::debug!(
            handler = route.handler(),
            route = route.current_route(),
            params = ?route.params(),
            "route resolved"
        );

        let handler = route.handler().to_string();
        req.extensions.insert(RouteContext::new(route, self.resolver.clone()));
        next.enqueue(handler);
        next.handle(req)
    }
}
