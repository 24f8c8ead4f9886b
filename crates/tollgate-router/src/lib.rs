//! tollgate-router: Convention-based path resolver and route builder
//!
//! There is no route table. The handler identifier namespace itself is the
//! table: a request path is walked segment by segment, and every step asks
//! an external oracle whether a handler with the derived identifier exists.
//!
//! ## Naming
//! - `GET /foo/bar/baz` tries `root.GetFoo`, then `root.Foo.GetBar`, then
//!   `root.Foo.Bar.GetBaz`
//! - An empty segment (for example the root path) is named `index`
//! - Everything after the matched segment becomes a positional parameter
//!
//! ## Example
//! ```
//! use std::collections::HashSet;
//! use tollgate_router::Resolver;
//!
//! let handlers: HashSet<String> = ["app.Foo.Bar.GetBaz".to_string()].into();
//! let resolver = Resolver::new("app");
//!
//! let route = resolver
//!     .resolve("GET", "/blog/foo/bar/baz/42", "/blog/index.php", &handlers)
//!     .unwrap();
//! assert_eq!(route.handler(), "app.Foo.Bar.GetBaz");
//! assert_eq!(route.base_path(), "/blog/");
//! assert_eq!(route.current_route(), "foo/bar/baz");
//! assert_eq!(route.params(), ["42"]);
//!
//! assert_eq!(resolver.build("app.Foo.Bar.GetBaz", &["42"]), "foo/bar/baz/42");
//! ```

use std::collections::{BTreeSet, HashSet};

mod build;
mod naming;
mod resolver;

pub use build::build_route;
pub use naming::{underscored, upper_camelize};
pub use resolver::{base_path, method_prefix, ResolvedRoute, Resolver, RouteNotFound};

/// Default separator between namespace levels of a handler identifier
pub const DEFAULT_SEPARATOR: &str = ".";

/// Segment name used for empty path components
pub const INDEX: &str = "index";

/// Handler namespace membership oracle
///
/// The resolver never mutates the namespace, it only asks whether an
/// identifier is present. Implementations must be safe for concurrent reads
/// if the resolver is shared across threads.
pub trait HandlerExists {
    /// Whether a handler with this fully-qualified identifier exists
    fn exists(&self, identifier: &str) -> bool;
}

impl<F> HandlerExists for F
where
    F: Fn(&str) -> bool,
{
    fn exists(&self, identifier: &str) -> bool {
        self(identifier)
    }
}

impl HandlerExists for HashSet<String> {
    fn exists(&self, identifier: &str) -> bool {
        self.contains(identifier)
    }
}

impl HandlerExists for BTreeSet<String> {
    fn exists(&self, identifier: &str) -> bool {
        self.contains(identifier)
    }
}
