//! tollgate-core: Dispatch pipeline around the tollgate resolver
//!
//! The router resolves a request path to a handler identifier, the registry
//! turns that identifier into a handler, and the dispatcher runs the
//! middleware stack until something answers.
//!
//! ## Features
//! - `native` - Native server with tokio/hyper
//!
//! ## Example
//! ```
//! use tollgate_core::{handler_fn, App, Method, RequestBuilder, Resolver, Response, Router};
//!
//! let app = App::new(Router::new(Resolver::new("app")).with_script_name("/index.php"));
//! app.registry().register("app.Posts.GetShow", || {
//!     handler_fn(|req| {
//!         let route = req.route().expect("router ran");
//!         Ok(Response::text(format!("post {}", route.param_or(0, "?"))))
//!     })
//! });
//!
//! let res = app.handle(RequestBuilder::new(Method::Get, "/posts/show/7").build());
//! assert_eq!(res.body_string().as_deref(), Some("post 7"));
//! ```

#![forbid(unsafe_code)]
#![warn(clippy::all)]

pub mod app;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod middleware;
pub mod registry;
pub mod request;
pub mod response;
pub mod routing;

#[cfg(feature = "native")]
pub mod server;

// Re-exports
pub use app::App;
pub use config::{Config, RouterConfig, ServerConfig};
pub use dispatch::Dispatcher;
pub use error::{Error, Result, RouteNotFound};
pub use registry::{HandlerFactory, HandlerRegistry};
pub use request::{Method, Request, RequestBuilder};
pub use response::{Response, ResponseBuilder, StatusCode};
pub use routing::{RouteContext, Router};

// Middleware re-exports
pub use middleware::{handler_fn, middleware_fn, HandlerFn, Middleware, MiddlewareStack};
pub use middleware::{RequestTrace, TraceConfig};

// Resolver re-exports
pub use tollgate_router::{build_route, HandlerExists, ResolvedRoute, Resolver};

#[cfg(feature = "native")]
pub use server::{bind, create_optimized_socket, from_hyper_parts, serve, serve_listener, to_hyper_response};
