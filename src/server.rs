//! HTTP server and graceful shutdown.
//!
//! This is the engine the chain plugs into: it accepts connections, builds one
//! [`RequestContext`] per request, calls the composed handler, and writes back
//! whatever the context holds afterwards.
//!
//! The handler runs inline on the connection task. Everything the built-in
//! middleware does is a CPU-bound header check, so nothing blocks a worker.
//! A middleware that does I/O (a remote auth lookup, say) would block the
//! runtime thread it runs on; size the runtime accordingly or move that work
//! behind `spawn_blocking`.
//!
//! # Graceful shutdown
//!
//! On **SIGTERM** or **Ctrl-C** the server:
//! 1. Immediately stops `listener.accept()`, so no new connections are made.
//! 2. Asks every open connection to shut down: requests in flight finish and
//!    get their response, idle keep-alive connections are closed at once.
//! 3. Waits for the connection tasks, then returns from [`Server::serve`],
//!    which lets `main` exit cleanly.

use std::convert::Infallible;
use std::future::Future;
use std::net::SocketAddr;

use bytes::Bytes;
use http::StatusCode;
use http_body_util::{BodyExt, Full};
use hyper::service::service_fn;
use hyper_util::rt::{TokioExecutor, TokioIo};
use hyper_util::server::conn::auto::Builder as ConnBuilder;
use hyper_util::server::graceful::GracefulShutdown;
use tokio::net::TcpListener;
use tracing::{error, info, warn};

use crate::context::RequestContext;
use crate::error::Error;
use crate::handler::BoxedHandler;

/// The HTTP server.
#[derive(Debug)]
pub struct Server {
    addr: SocketAddr,
}

impl Server {
    /// Configures the server to bind to `addr` when [`serve`](Server::serve)
    /// is called.
    ///
    /// ```rust
    /// use hermyx::Server;
    /// let server = Server::bind("0.0.0.0:3000").unwrap();
    /// assert!(Server::bind("not an address").is_err());
    /// ```
    pub fn bind(addr: &str) -> Result<Self, Error> {
        let addr = addr.parse().map_err(|_| Error::InvalidAddress(addr.to_owned()))?;
        Ok(Self { addr })
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Serves `handler` until SIGTERM or Ctrl-C, then drains in-flight
    /// connections and returns.
    pub async fn serve(self, handler: BoxedHandler) -> Result<(), Error> {
        self.serve_with_shutdown(handler, shutdown_signal()).await
    }

    /// Like [`serve`](Server::serve), but stops when `signal` resolves.
    pub async fn serve_with_shutdown<F>(self, handler: BoxedHandler, signal: F) -> Result<(), Error>
    where
        F: Future<Output = ()>,
    {
        let listener = TcpListener::bind(self.addr).await?;
        run(listener, handler, signal).await;
        Ok(())
    }
}

/// The accept loop. Returns once `shutdown` fires and every connection has
/// finished.
async fn run<F>(listener: TcpListener, handler: BoxedHandler, shutdown: F)
where
    F: Future<Output = ()>,
{
    match listener.local_addr() {
        Ok(addr) => info!(%addr, "hermyx listening"),
        Err(e) => warn!("hermyx listening on unknown address: {e}"),
    }

    let builder = ConnBuilder::new(TokioExecutor::new());
    let graceful = GracefulShutdown::new();
    let mut tasks = tokio::task::JoinSet::new();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            // Check shutdown first so a SIGTERM stops accepting immediately,
            // even if more connections are queued.
            biased;

            () = &mut shutdown => {
                info!(in_flight = tasks.len(), "shutdown signal received, draining connections");
                break;
            }

            res = listener.accept() => {
                let (stream, remote_addr) = match res {
                    Ok(v) => v,
                    Err(e) => {
                        error!("accept error: {e}");
                        continue;
                    }
                };

                let handler = BoxedHandler::clone(&handler);
                let io = TokioIo::new(stream);

                // Called once per request on the connection.
                let svc = service_fn(move |req| {
                    let handler = BoxedHandler::clone(&handler);
                    async move { dispatch(handler, req, remote_addr).await }
                });

                let conn = graceful.watch(builder.serve_connection(io, svc).into_owned());
                tasks.spawn(async move {
                    if let Err(e) = conn.await {
                        error!(peer = %remote_addr, "connection error: {e}");
                    }
                });
            }

            // Reap finished connection tasks so the JoinSet does not grow
            // without bound on long-running servers.
            Some(_) = tasks.join_next(), if !tasks.is_empty() => {}
        }
    }

    // Idle keep-alive connections close here; busy ones finish their request.
    graceful.shutdown().await;
    while tasks.join_next().await.is_some() {}

    info!("hermyx stopped");
}

// ── Request dispatch ──────────────────────────────────────────────────────────

/// Reads the body, runs the handler over a fresh context, returns the result.
///
/// Infallible towards hyper: a body that cannot be read answers `400`
/// without ever reaching the chain.
async fn dispatch<B>(
    handler: BoxedHandler,
    req: http::Request<B>,
    remote_addr: SocketAddr,
) -> Result<http::Response<Full<Bytes>>, Infallible>
where
    B: hyper::body::Body,
    B::Error: std::fmt::Display,
{
    let (parts, body) = req.into_parts();

    let body = match body.collect().await {
        Ok(collected) => collected.to_bytes(),
        Err(e) => {
            warn!(peer = %remote_addr, "failed to read request body: {e}");
            let mut response = http::Response::new(Full::new(Bytes::new()));
            *response.status_mut() = StatusCode::BAD_REQUEST;
            return Ok(response);
        }
    };

    let mut ctx = RequestContext::from_parts(parts, body, remote_addr);
    handler.call(&mut ctx);
    Ok(ctx.into_response())
}

// ── Shutdown signal ───────────────────────────────────────────────────────────

/// Resolves on the first SIGTERM or SIGINT. A signal that cannot be installed
/// is logged and never fires.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("failed to install Ctrl-C handler: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let sigterm = async {
        use tokio::signal::unix::{SignalKind, signal};

        match signal(SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                error!("failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let sigterm = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c   => {}
        () = sigterm  => {}
    }
}
