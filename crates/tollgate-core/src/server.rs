//! Native HTTP server implementation
//!
//! - Multi-threaded tokio runtime (owned by the caller)
//! - One hyper HTTP/1.1 connection task per accepted stream
//! - SO_REUSEPORT for load balancing
//! - TCP_NODELAY for low latency

use crate::config::ServerConfig;
use crate::{App, Error, Method, Request, Response, Result};
use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::TokioIo;
use socket2::{Domain, Protocol, Socket, Type};
use std::convert::Infallible;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;

/// Create a TCP socket with optimizations
pub fn create_optimized_socket(addr: &SocketAddr) -> std::io::Result<Socket> {
    let domain = if addr.is_ipv4() {
        Domain::IPV4
    } else {
        Domain::IPV6
    };

    let socket = Socket::new(domain, Type::STREAM, Some(Protocol::TCP))?;

    // SO_REUSEADDR - allow binding to address in TIME_WAIT
    socket.set_reuse_address(true)?;

    // SO_REUSEPORT - enable kernel load balancing across threads
    #[cfg(unix)]
    socket.set_reuse_port(true)?;

    socket.set_nodelay(true)?;
    socket.set_nonblocking(true)?;
    socket.bind(&(*addr).into())?;
    socket.listen(1024)?;

    Ok(socket)
}

/// Bind a listener for `config`
pub fn bind(config: &ServerConfig) -> Result<TcpListener> {
    let addr: SocketAddr = format!("{}:{}", config.hostname, config.port)
        .parse()
        .map_err(|e| Error::Config(format!("invalid listen address: {}", e)))?;
    let socket = create_optimized_socket(&addr)?;
    Ok(TcpListener::from_std(socket.into())?)
}

/// Serve `app` until the process exits
pub async fn serve(app: Arc<App>, config: &ServerConfig) -> Result<()> {
    let listener = bind(config)?;
    serve_listener(app, listener, std::future::pending()).await
}

/// Serve on an existing listener until `shutdown` completes
///
/// In-flight connections keep running on their own tasks after shutdown.
pub async fn serve_listener<S>(app: Arc<App>, listener: TcpListener, shutdown: S) -> Result<()>
where
    S: Future<Output = ()>,
{
    tracing::info!(addr = %listener.local_addr()?, "listening");
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = &mut shutdown => {
                tracing::info!("shutdown signal received, no longer accepting");
                return Ok(());
            }
            accepted = listener.accept() => {
                let (stream, peer) = accepted?;
                let app = app.clone();
                tokio::spawn(async move {
                    let service = service_fn(move |req| {
                        let app = app.clone();
                        async move { Ok::<_, Infallible>(handle(&app, req).await) }
                    });
                    if let Err(err) = http1::Builder::new()
                        .serve_connection(TokioIo::new(stream), service)
                        .await
                    {
                        tracing::debug!(%peer, error = %err, "connection error");
                    }
                });
            }
        }
    }
}

async fn handle(app: &App, req: hyper::Request<Incoming>) -> hyper::Response<Full<Bytes>> {
    let (parts, body) = req.into_parts();
    let body = match body.collect().await {
        Ok(collected) => collected.to_bytes(),
        Err(err) => {
            tracing::debug!(error = %err, "failed to read request body");
            return to_hyper_response(Response::error(crate::StatusCode::BAD_REQUEST));
        }
    };

    let script_name = app.router().script_name().to_string();
    let response = match from_hyper_parts(&parts, body, script_name) {
        Ok(request) => app.handle(request),
        Err(err) => Response::from(&err),
    };
    to_hyper_response(response)
}

/// Convert hyper request parts to our Request type
pub fn from_hyper_parts(
    parts: &http::request::Parts,
    body: Bytes,
    script_name: impl Into<String>,
) -> Result<Request> {
    let method: Method = parts.method.as_str().parse()?;
    let target = parts
        .uri
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or("/");

    let mut request = Request::new(method, target);
    request.script_name = script_name.into();
    request.body = body;

    for (name, value) in &parts.headers {
        if let Ok(v) = value.to_str() {
            request.headers.push((name.to_string(), v.to_string()));
        }
    }

    Ok(request)
}

/// Convert our Response to hyper Response
pub fn to_hyper_response(res: Response) -> hyper::Response<Full<Bytes>> {
    let mut builder = hyper::Response::builder().status(res.status);

    for (name, value) in &res.headers {
        builder = builder.header(name.as_str(), value.as_str());
    }

    builder.body(Full::new(res.body)).unwrap_or_else(|err| {
        tracing::warn!(error = %err, "invalid response, sending 500");
        let mut fallback = hyper::Response::new(Full::new(Bytes::from_static(b"Internal Server Error")));
        *fallback.status_mut() = hyper::StatusCode::INTERNAL_SERVER_ERROR;
        fallback
    })
}
