//! TOML configuration
//!
//! ```toml
//! [router]
//! namespace_root = "app"
//! separator = "."
//! collapse_empty_segments = false
//! script_name = "/index.php"
//!
//! [server]
//! hostname = "0.0.0.0"
//! port = 3000
//! ```

use crate::{Error, Result};
use serde::Deserialize;
use std::path::Path;
use tollgate_router::{Resolver, DEFAULT_SEPARATOR};

/// Top-level configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub router: RouterConfig,
    pub server: ServerConfig,
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("failed to read '{}': {}", path.display(), e)))?;
        Self::from_toml(&content).map_err(|e| match e {
            Error::Config(msg) => Error::Config(format!("'{}': {}", path.display(), msg)),
            other => other,
        })
    }

    /// Parse configuration from a TOML string
    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content).map_err(|e| Error::Config(e.to_string()))?;
        config.router.validate()?;
        Ok(config)
    }
}

/// Resolver settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RouterConfig {
    /// Namespace every handler identifier starts with
    pub namespace_root: String,
    /// Separator between namespace levels
    pub separator: String,
    /// Drop empty interior path segments instead of naming them `index`
    pub collapse_empty_segments: bool,
    /// Script name reported for requests that do not carry one
    pub script_name: String,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            namespace_root: "app".to_string(),
            separator: DEFAULT_SEPARATOR.to_string(),
            collapse_empty_segments: false,
            script_name: "/index.php".to_string(),
        }
    }
}

impl RouterConfig {
    pub fn validate(&self) -> Result<()> {
        if self.separator.is_empty() {
            return Err(Error::Config("router.separator must not be empty".to_string()));
        }
        Ok(())
    }

    /// Build the resolver described by this config
    ///
    /// Panics on an empty separator; configs loaded through [`Config`] are
    /// already validated.
    pub fn resolver(&self) -> Resolver {
        Resolver::new(self.namespace_root.clone())
            .with_separator(self.separator.clone())
            .collapse_empty_segments(self.collapse_empty_segments)
    }
}

/// Server configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub port: u16,
    pub hostname: String,
    pub workers: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 3000,
            hostname: "0.0.0.0".to_string(),
            workers: num_cpus::get(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::from_toml("").unwrap();
        assert_eq!(config.router.namespace_root, "app");
        assert_eq!(config.router.separator, ".");
        assert!(!config.router.collapse_empty_segments);
        assert_eq!(config.router.script_name, "/index.php");
        assert_eq!(config.server.port, 3000);
        assert!(config.server.workers >= 1);
    }

    #[test]
    fn test_partial_sections() {
        let config = Config::from_toml(
            r#"
            [router]
            namespace_root = "site"
            collapse_empty_segments = true

            [server]
            port = 8080
            "#,
        )
        .unwrap();

        assert_eq!(config.router.namespace_root, "site");
        assert!(config.router.collapse_empty_segments);
        assert_eq!(config.router.separator, ".");
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.hostname, "0.0.0.0");
    }

    #[test]
    fn test_resolver_from_config() {
        let config = Config::from_toml("[router]\nnamespace_root = \"site\"\nseparator = \"::\"\n").unwrap();
        let resolver = config.router.resolver();
        assert_eq!(resolver.namespace_root(), "site");
        assert_eq!(resolver.separator(), "::");
    }

    #[test]
    fn test_collapse_reaches_router() {
        let config = Config::from_toml("[router]\ncollapse_empty_segments = true\n").unwrap();
        let router = crate::Router::from_config(&config.router);
        let oracle = |id: &str| id == "app.Foo.GetBar";

        let route = router
            .resolver()
            .resolve("GET", "/foo//bar/x", "/index.php", &oracle)
            .unwrap();
        assert_eq!(route.current_route(), "foo/bar");
        assert_eq!(route.params(), ["x"]);

        let strict = crate::Router::from_config(&RouterConfig::default());
        assert!(strict
            .resolver()
            .resolve("GET", "/foo//bar/x", "/index.php", &oracle)
            .is_err());
    }

    #[test]
    fn test_empty_separator_rejected() {
        let err = Config::from_toml("[router]\nseparator = \"\"\n").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_invalid_toml() {
        assert!(matches!(Config::from_toml("[router"), Err(Error::Config(_))));
    }

    #[test]
    fn test_load_error_not_double_wrapped() {
        let path = std::env::temp_dir().join(format!("tollgate-bad-{}.toml", std::process::id()));
        std::fs::write(&path, "[router]\nseparator = \"\"\n").unwrap();
        let err = Config::load(&path).unwrap_err();
        std::fs::remove_file(&path).unwrap();

        let msg = err.to_string();
        assert!(msg.starts_with("Config error: '"), "{}", msg);
        assert_eq!(msg.matches("Config error").count(), 1, "{}", msg);
        assert!(msg.contains("router.separator must not be empty"), "{}", msg);
    }

    #[test]
    fn test_missing_file() {
        let err = Config::load("/nonexistent/tollgate.toml").unwrap_err();
        assert!(err.to_string().contains("/nonexistent/tollgate.toml"));
    }
}
