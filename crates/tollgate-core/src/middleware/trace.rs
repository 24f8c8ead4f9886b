//! Request tracing middleware
//!
//! Adds request IDs and logs every request through `tracing`.

use super::Middleware;
use crate::dispatch::Dispatcher;
use crate::{Request, Response, Result};
use std::time::Instant;
use uuid::Uuid;

/// Tracing configuration
#[derive(Debug, Clone)]
pub struct TraceConfig {
    /// Header name for request ID
    pub header_name: String,
    /// Generate request ID if not present
    pub generate_id: bool,
    /// Echo the request ID on the response
    pub echo_id: bool,
}

impl Default for TraceConfig {
    fn default() -> Self {
        Self {
            header_name: "X-Request-ID".to_string(),
            generate_id: true,
            echo_id: true,
        }
    }
}

impl TraceConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn header_name(mut self, name: impl Into<String>) -> Self {
        self.header_name = name.into();
        self
    }

    pub fn generate_id(mut self, generate: bool) -> Self {
        self.generate_id = generate;
        self
    }

    pub fn echo_id(mut self, echo: bool) -> Self {
        self.echo_id = echo;
        self
    }
}

/// Tracing middleware
///
/// Opens an `http.request` span around the rest of the chain, so the route
/// resolution and handler logs carry the request ID.
#[derive(Debug, Clone, Default)]
pub struct RequestTrace {
    config: TraceConfig,
}

impl RequestTrace {
    pub fn new(config: TraceConfig) -> Self {
        Self { config }
    }

    fn request_id(&self, req: &Request) -> Option<String> {
        req.header(&self.config.header_name)
            .map(|s| s.to_string())
            .or_else(|| self.config.generate_id.then(|| Uuid::new_v4().to_string()))
    }
}

impl Middleware for RequestTrace {
    fn process(&self, req: Request, next: &mut Dispatcher) -> Result<Response> {
        let request_id = self.request_id(&req);
        let span = tracing::info_span!(
            "http.request",
            id = request_id.as_deref().unwrap_or("-"),
            method = %req.method,
            target = %req.target,
        );
        let _entered = span.enter();

        let start = Instant::now();
        let result = next.handle(req);
        let elapsed_ms = start.elapsed().as_secs_f64() * 1000.0;

        match &result {
            Ok(res) => tracing::info!(status = res.status.as_u16(), elapsed_ms, "request completed"),
            Err(err) => tracing::info!(error = %err, elapsed_ms, "request failed"),
        }

        let mut res = result?;
        if let (true, Some(id)) = (self.config.echo_id, request_id) {
            res.headers.push((self.config.header_name.clone(), id));
        }
        Ok(res)
    }
}
