//! Path Resolver: request path -> handler identifier

use crate::naming::upper_camelize;
use crate::{build_route, HandlerExists, DEFAULT_SEPARATOR, INDEX};
use percent_encoding::percent_decode_str;
use thiserror::Error;

/// No path prefix maps to an existing handler identifier
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{identifier} Not Found")]
pub struct RouteNotFound {
    /// The last identifier the resolver tried
    pub identifier: String,
}

/// Result of resolving one request
///
/// Computed once per request and never modified afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedRoute {
    base_path: String,
    current_route: String,
    params: Vec<String>,
    handler: String,
}

impl ResolvedRoute {
    /// Mount point of the application, always ending in `/`
    pub fn base_path(&self) -> &str {
        &self.base_path
    }

    /// Segments consumed to reach the handler, joined by `/`
    pub fn current_route(&self) -> &str {
        &self.current_route
    }

    /// Decoded segments after the matched one
    pub fn params(&self) -> &[String] {
        &self.params
    }

    /// Positional parameter
    pub fn param(&self, index: usize) -> Option<&str> {
        self.params.get(index).map(|s| s.as_str())
    }

    /// Fully-qualified handler identifier
    pub fn handler(&self) -> &str {
        &self.handler
    }
}

/// Resolves request paths against a handler namespace and builds paths back
///
/// # Example
/// ```
/// use tollgate_router::Resolver;
///
/// let resolver = Resolver::new("app")
///     .with_separator("::")
///     .collapse_empty_segments(true);
///
/// let oracle = |id: &str| id == "app::GetIndex";
/// let route = resolver.resolve("GET", "/", "/index.php", &oracle).unwrap();
/// assert_eq!(route.handler(), "app::GetIndex");
/// assert_eq!(resolver.build(route.handler(), &[] as &[&str]), "/");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolver {
    namespace_root: String,
    separator: String,
    collapse_empty_segments: bool,
}

impl Resolver {
    /// Create a resolver rooted at `namespace_root`
    pub fn new(namespace_root: impl Into<String>) -> Self {
        Self {
            namespace_root: namespace_root.into(),
            separator: DEFAULT_SEPARATOR.to_string(),
            collapse_empty_segments: false,
        }
    }

    /// Separator between namespace levels
    ///
    /// # Panics
    /// If `separator` is empty.
    pub fn with_separator(mut self, separator: impl Into<String>) -> Self {
        let separator = separator.into();
        assert!(!separator.is_empty(), "namespace separator must not be empty");
        self.separator = separator;
        self
    }

    /// Drop empty interior segments (`a//b`) instead of naming them `index`
    pub fn collapse_empty_segments(mut self, collapse: bool) -> Self {
        self.collapse_empty_segments = collapse;
        self
    }

    pub fn namespace_root(&self) -> &str {
        &self.namespace_root
    }

    pub fn separator(&self) -> &str {
        &self.separator
    }

    /// Resolve a request to the shallowest existing handler identifier
    ///
    /// # Arguments
    /// * `method` - HTTP method, any case
    /// * `target` - request target as received (path and query)
    /// * `script_path` - server-provided script name, e.g. `/app/index.php`
    /// * `exists` - handler namespace oracle
    pub fn resolve<E>(
        &self,
        method: &str,
        target: &str,
        script_path: &str,
        exists: &E,
    ) -> Result<ResolvedRoute, RouteNotFound>
    where
        E: HandlerExists + ?Sized,
    {
        let base_path = base_path(script_path);
        let segments = self.segments(strip_mount(target, script_path, &base_path));
        let prefix = method_prefix(method);

        let mut namespace = self.namespace_root.clone();
        let mut candidate = namespace.clone();
        let mut matched = None;

        for (index, raw) in segments.iter().enumerate() {
            let part = segment_name(raw);
            candidate = self.join(&namespace, &upper_camelize(&format!("{prefix}{part}")));
            // a segment may not span namespace levels
            if part.contains(self.separator.as_str()) {
                return Err(RouteNotFound { identifier: candidate });
            }
            if exists.exists(&candidate) {
                matched = Some(index);
                break;
            }
            namespace = self.join(&namespace, &upper_camelize(part));
        }

        // `/foo/bar` falls back to the group's index handler `Foo.Bar.GetIndex`
        if matched.is_none() && segments.last().map(|s| segment_name(s)) != Some(INDEX) {
            candidate = self.join(&namespace, &upper_camelize(&format!("{prefix}{INDEX}")));
            if exists.exists(&candidate) {
                matched = Some(segments.len() - 1);
            }
        }

        let Some(index) = matched else {
            return Err(RouteNotFound { identifier: candidate });
        };

        let current_route = segments[..=index]
            .iter()
            .map(|s| segment_name(s))
            .collect::<Vec<_>>()
            .join("/");

        Ok(ResolvedRoute {
            base_path,
            current_route,
            params: segments[index + 1..].to_vec(),
            handler: candidate,
        })
    }

    /// Build the canonical path of `handler` followed by `params`
    pub fn build<S: AsRef<str>>(&self, handler: &str, params: &[S]) -> String {
        build_route(handler, &self.namespace_root, &self.separator, params)
    }

    /// Decode and split the mount-relative path
    fn segments(&self, path_uri: &str) -> Vec<String> {
        let path = path_uri
            .split(|c: char| c == '?' || c == '#')
            .next()
            .unwrap_or_default();
        let path = path.replace('+', " ");
        let decoded = percent_decode_str(&path).decode_utf8_lossy();

        let mut segments: Vec<String> = decoded
            .trim_matches('/')
            .split('/')
            .map(str::to_owned)
            .collect();

        if self.collapse_empty_segments {
            segments.retain(|s| !s.is_empty());
            if segments.is_empty() {
                segments.push(String::new());
            }
        }
        segments
    }

    fn join(&self, namespace: &str, name: &str) -> String {
        let mut out = String::with_capacity(namespace.len() + self.separator.len() + name.len());
        out.push_str(namespace);
        out.push_str(&self.separator);
        out.push_str(name);
        out
    }
}

/// Handler name prefix for a request method: `GET` -> `get_`
pub fn method_prefix(method: &str) -> String {
    let mut prefix = method.to_lowercase();
    prefix.push('_');
    prefix
}

/// Directory of the script path, with a trailing `/`
///
/// ```
/// use tollgate_router::base_path;
///
/// assert_eq!(base_path("/blog/index.php"), "/blog/");
/// assert_eq!(base_path("/index.php"), "/");
/// ```
pub fn base_path(script_path: &str) -> String {
    match script_path.rfind('/') {
        Some(0) | None => "/".to_string(),
        Some(pos) => format!("{}/", &script_path[..pos]),
    }
}

/// Remove the mount prefix from the request target
///
/// Direct script invocation (`/app/index.php/foo`) strips the script path,
/// rewritten URLs (`/app/foo`) strip the base path. A target outside both is
/// returned unchanged.
fn strip_mount<'a>(target: &'a str, script_path: &str, base_path: &str) -> &'a str {
    if let Some(rest) = target.strip_prefix(script_path) {
        return rest;
    }
    if let Some(rest) = target.strip_prefix(base_path) {
        return rest;
    }

    // `/app` for a base path of `/app/`
    let mount = base_path.trim_end_matches('/');
    match target.strip_prefix(mount) {
        Some(rest)
            if !mount.is_empty()
                && (rest.is_empty() || rest.starts_with(|c: char| c == '?' || c == '#')) =>
        {
            rest
        }
        _ => target,
    }
}

#[inline]
fn segment_name(raw: &str) -> &str {
    if raw.is_empty() {
        INDEX
    } else {
        raw
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    const SCRIPT: &str = "/dryspell/index.php";

    fn handlers() -> HashSet<String> {
        [
            "app.GetIndex",
            "app.PostIndex",
            "app.GetFooBar",
            "app.Foo.Bar.GetBaz",
            "app.Foo.Bar.GetIndex",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect()
    }

    fn resolve(method: &str, target: &str) -> Result<ResolvedRoute, RouteNotFound> {
        Resolver::new("app").resolve(method, target, SCRIPT, &handlers())
    }

    #[test]
    fn test_resolve_handlers() {
        let cases = [
            ("GET", "/dryspell/", "app.GetIndex"),
            ("GET", "/dryspell/index", "app.GetIndex"),
            ("GET", "/dryspell/index/", "app.GetIndex"),
            ("GET", "/dryspell/index.php/index", "app.GetIndex"),
            ("POST", "/dryspell/", "app.PostIndex"),
            ("GET", "/dryspell/foo/bar/baz", "app.Foo.Bar.GetBaz"),
            ("GET", "/dryspell/foo_bar", "app.GetFooBar"),
            ("GET", "/dryspell/foo/bar", "app.Foo.Bar.GetIndex"),
            ("GET", "/dryspell/foo/bar/", "app.Foo.Bar.GetIndex"),
        ];
        for (method, target, expected) in cases {
            let route = resolve(method, target).unwrap();
            assert_eq!(route.handler(), expected, "{} {}", method, target);
        }
    }

    #[test]
    fn test_params_are_decoded() {
        let route = resolve("GET", "/dryspell/index/foo/bar/foo%20bar").unwrap();
        assert_eq!(route.params(), ["foo", "bar", "foo bar"]);
        assert_eq!(route.param(1), Some("bar"));
        assert_eq!(route.param(3), None);
    }

    #[test]
    fn test_base_path() {
        let route = resolve("GET", "/dryspell/index/foo/bar").unwrap();
        assert_eq!(route.base_path(), "/dryspell/");

        assert_eq!(base_path("/index.php"), "/");
        assert_eq!(base_path("index.php"), "/");
        assert_eq!(base_path(""), "/");
        assert_eq!(base_path("/a/b/index.php"), "/a/b/");
    }

    #[test]
    fn test_current_route() {
        let cases = [
            ("/dryspell/", "index"),
            ("/dryspell/index", "index"),
            ("/dryspell/index/foo/bar", "index"),
            ("/dryspell/foo/bar/baz", "foo/bar/baz"),
            ("/dryspell/foo/bar/baz/bla/blub", "foo/bar/baz"),
        ];
        for (target, expected) in cases {
            let route = resolve("GET", target).unwrap();
            assert_eq!(route.current_route(), expected, "target: {}", target);
        }
    }

    #[test]
    fn test_deep_match_without_intermediate_handler() {
        let route = resolve("GET", "/dryspell/foo/bar/baz").unwrap();
        assert_eq!(route.current_route(), "foo/bar/baz");
        assert!(route.params().is_empty());
    }

    #[test]
    fn test_group_index_fallback() {
        let route = resolve("GET", "/dryspell/foo/bar").unwrap();
        assert_eq!(route.handler(), "app.Foo.Bar.GetIndex");
        assert_eq!(route.current_route(), "foo/bar");
        assert!(route.params().is_empty());

        let route = resolve("GET", "/dryspell/foo/bar/index/x").unwrap();
        assert_eq!(route.handler(), "app.Foo.Bar.GetIndex");
        assert_eq!(route.current_route(), "foo/bar/index");
        assert_eq!(route.params(), ["x"]);
    }

    #[test]
    fn test_shallowest_match_wins() {
        let oracle = |id: &str| id == "app.GetFoo" || id == "app.Foo.GetBar";
        let route = Resolver::new("app")
            .resolve("GET", "/foo/bar", "/index.php", &oracle)
            .unwrap();
        assert_eq!(route.handler(), "app.GetFoo");
        assert_eq!(route.params(), ["bar"]);
    }

    #[test]
    fn test_not_found_reports_last_candidate() {
        let err = resolve("GET", "/dryspell/foo/barrr").unwrap_err();
        assert_eq!(err.identifier, "app.Foo.Barrr.GetIndex");
        assert_eq!(err.to_string(), "app.Foo.Barrr.GetIndex Not Found");

        let err = resolve("GET", "/dryspell/nope/").unwrap_err();
        assert_eq!(err.identifier, "app.Nope.GetIndex");

        let err = resolve("DELETE", "/dryspell/").unwrap_err();
        assert_eq!(err.identifier, "app.DeleteIndex");
    }

    #[test]
    fn test_query_string_ignored() {
        let route = resolve("GET", "/dryspell/foo/bar/baz/1?page=2#top").unwrap();
        assert_eq!(route.handler(), "app.Foo.Bar.GetBaz");
        assert_eq!(route.params(), ["1"]);

        let route = resolve("GET", "/dryspell/?q=1").unwrap();
        assert_eq!(route.handler(), "app.GetIndex");
    }

    #[test]
    fn test_plus_decodes_to_space() {
        let route = resolve("GET", "/dryspell/index/a+b/c%2Bd").unwrap();
        assert_eq!(route.params(), ["a b", "c+d"]);
    }

    #[test]
    fn test_script_path_branch() {
        let route = resolve("GET", "/dryspell/index.php/foo/bar/baz/7").unwrap();
        assert_eq!(route.handler(), "app.Foo.Bar.GetBaz");
        assert_eq!(route.params(), ["7"]);
        assert_eq!(route.base_path(), "/dryspell/");
    }

    #[test]
    fn test_base_path_branch() {
        let route = resolve("GET", "/dryspell/foo_bar/7").unwrap();
        assert_eq!(route.handler(), "app.GetFooBar");
        assert_eq!(route.params(), ["7"]);
    }

    #[test]
    fn test_mount_without_trailing_slash() {
        let route = resolve("GET", "/dryspell").unwrap();
        assert_eq!(route.handler(), "app.GetIndex");

        let route = resolve("GET", "/dryspell?x=1").unwrap();
        assert_eq!(route.handler(), "app.GetIndex");
    }

    #[test]
    fn test_target_outside_mount() {
        let route = Resolver::new("app")
            .resolve("GET", "/foo_bar", SCRIPT, &handlers())
            .unwrap();
        assert_eq!(route.handler(), "app.GetFooBar");
    }

    #[test]
    fn test_empty_interior_segment_named_index() {
        let oracle = |id: &str| id == "app.Foo.GetBar";
        let route = Resolver::new("app")
            .resolve("GET", "/foo/bar//x", "/index.php", &oracle)
            .unwrap();
        assert_eq!(route.params(), ["", "x"]);

        let oracle = |id: &str| id == "app.Foo.Index.GetBar";
        let route = Resolver::new("app")
            .resolve("GET", "/foo//bar", "/index.php", &oracle)
            .unwrap();
        assert_eq!(route.current_route(), "foo/index/bar");
    }

    #[test]
    fn test_collapse_empty_segments() {
        let oracle = |id: &str| id == "app.Foo.GetBar" || id == "app.GetIndex";
        let resolver = Resolver::new("app").collapse_empty_segments(true);

        let route = resolver.resolve("GET", "/foo//bar//x", "/index.php", &oracle).unwrap();
        assert_eq!(route.handler(), "app.Foo.GetBar");
        assert_eq!(route.current_route(), "foo/bar");
        assert_eq!(route.params(), ["x"]);

        let route = resolver.resolve("GET", "//", "/index.php", &oracle).unwrap();
        assert_eq!(route.handler(), "app.GetIndex");
    }

    #[test]
    fn test_custom_separator() {
        let oracle = |id: &str| id == "app::Foo::Bar::GetBaz";
        let resolver = Resolver::new("app").with_separator("::");
        let route = resolver.resolve("get", "/foo/bar/baz", "/index.php", &oracle).unwrap();
        assert_eq!(route.handler(), "app::Foo::Bar::GetBaz");
        assert_eq!(resolver.build(route.handler(), &["q"]), "foo/bar/baz/q");
    }

    #[test]
    fn test_segment_with_separator_not_walked() {
        let set = handlers();
        for target in ["/dryspell/foo.Bar/baz", "/dryspell/foo%2EBar/baz", "/dryspell/foo.bar.baz"] {
            let err = resolve("GET", target).unwrap_err();
            assert!(err.identifier.starts_with("app.GetFoo."), "{}: {}", target, err.identifier);
        }

        // params may still carry the separator
        let route = Resolver::new("app")
            .resolve("GET", "/dryspell/foo/bar/baz/file.txt", SCRIPT, &set)
            .unwrap();
        assert_eq!(route.params(), ["file.txt"]);

        let oracle = |id: &str| id == "app::Foo::GetBar";
        let route = Resolver::new("app")
            .with_separator("::")
            .resolve("GET", "/foo/bar.baz", "/index.php", &oracle);
        assert!(route.is_err());
        let route = Resolver::new("app")
            .with_separator("::")
            .resolve("GET", "/foo/bar/a::b", "/index.php", &oracle)
            .unwrap();
        assert_eq!(route.params(), ["a::b"]);
    }

    #[test]
    #[should_panic(expected = "separator must not be empty")]
    fn test_empty_separator_panics() {
        let _ = Resolver::new("app").with_separator("");
    }

    #[test]
    fn test_method_prefix() {
        assert_eq!(method_prefix("GET"), "get_");
        assert_eq!(method_prefix("Delete"), "delete_");
    }

    #[test]
    fn test_build_then_resolve() {
        let resolver = Resolver::new("app");
        let mut set = handlers();
        set.insert("app.Get2Fa".to_string());
        set.insert("app.Account.Get2Fa".to_string());
        for id in &set {
            let path = resolver.build(id, &[] as &[&str]);
            let target = format!("/dryspell/{}", path.trim_start_matches('/'));
            let route = resolver.resolve(method_of(id), &target, SCRIPT, &set).unwrap();
            assert_eq!(route.handler(), id, "path: {}", path);
            assert!(route.params().is_empty());
        }
    }

    fn method_of(id: &str) -> &'static str {
        if id.ends_with("PostIndex") {
            "POST"
        } else {
            "GET"
        }
    }
}
