//! tollgate - example server
//!
//! Usage:
//!   tollgate [config.toml]
//!
//! Without a config file the defaults apply: handlers live under `app`,
//! the application is mounted at `/` and the server listens on port 3000.

use std::sync::Arc;

use tollgate_core::{
    handler_fn, serve_listener, App, Config, Request, RequestTrace, Response, Result, StatusCode,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const POSTS: &[(&str, &str)] = &[
    ("1", "Hello, tollgate"),
    ("2", "Routing by namespace"),
    ("3", "Middleware all the way down"),
];

fn parse_args() -> Option<String> {
    let mut config_path = None;
    for arg in std::env::args().skip(1) {
        match arg.as_str() {
            "--help" | "-h" => {
                eprintln!("Usage: tollgate [config.toml]");
                std::process::exit(0);
            }
            arg if !arg.starts_with('-') => config_path = Some(arg.to_string()),
            _ => tracing::warn!("Unknown argument: {}", arg),
        }
    }
    config_path
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tollgate=info,tollgate_core=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = match parse_args() {
        Some(path) => {
            tracing::info!("Loading config from {}", path);
            Config::load(&path)?
        }
        None => {
            tracing::info!("No config file given, using defaults");
            Config::default()
        }
    };

    let app = App::from_config(&config.router).wrap(RequestTrace::default());
    register_handlers(&app, &config.router.namespace_root);
    tracing::info!(handlers = ?app.registry().identifiers(), "handlers registered");

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(config.server.workers.max(1))
        .enable_all()
        .build()?;

    runtime.block_on(async move {
        let listener = tollgate_core::bind(&config.server)?;
        serve_listener(Arc::new(app), listener, async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!("Failed to listen for ctrl-c: {}", e);
                std::future::pending::<()>().await;
            }
        })
        .await
    })?;

    tracing::info!("Server stopped");
    Ok(())
}

fn register_handlers(app: &App, root: &str) {
    let registry = app.registry();
    let id = |name: &str| format!("{}.{}", root, name);

    let show = id("Posts.GetShow");
    registry.register(id("GetIndex"), move || {
        let show = show.clone();
        handler_fn(move |req| {
            let route = route(req)?;
            let links: Vec<String> = POSTS
                .iter()
                .map(|(post, _)| route.link(&show, &[post]))
                .collect();
            Ok(Response::text(links.join("\n")))
        })
    });

    registry.register(id("GetHealth"), || handler_fn(|_| Ok(Response::text("ok"))));

    registry.register(id("Posts.GetShow"), || {
        handler_fn(|req| {
            let route = route(req)?;
            let post = route
                .param(0)
                .and_then(|wanted| POSTS.iter().find(|(post, _)| *post == wanted));
            Ok(match post {
                Some((post, title)) => Response::text(format!("#{} {}", post, title)),
                None => Response::error(StatusCode::NOT_FOUND),
            })
        })
    });

    let show = id("Posts.GetShow");
    registry.register(id("Posts.PostCreate"), move || {
        let show = show.clone();
        handler_fn(move |req| {
            let route = route(req)?;
            tracing::info!(bytes = req.body.len(), "post submitted");
            Ok(Response::found(&route.link(&show, &["1"])))
        })
    });
}

fn route(req: &Request) -> Result<&tollgate_core::RouteContext> {
    req.route()
        .ok_or_else(|| tollgate_core::Error::Internal("handler dispatched without a route".into()))
}
