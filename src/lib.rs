//! # hermyx
//!
//! The request-processing pipeline of the hermyx caching reverse proxy: an
//! ordered chain of interceptors wrapped around a single "forward this
//! request" terminal handler.
//!
//! ## The contract
//!
//! Routing, load balancing, TLS termination and cache storage all live
//! somewhere else. This crate only decides how cross-cutting behaviour
//! composes around the terminal handler:
//!
//! - **Before-hooks** run in registration order. The first failure answers
//!   `403 Forbidden` with the failure text; nothing else runs.
//! - **The terminal handler** runs exactly once if every before-hook passed.
//! - **After-hooks** run in the *same* order. Failures are logged and dropped.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use hermyx::{MiddlewareConfig, RequestContext, Server};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), hermyx::Error> {
//!     let config = MiddlewareConfig::from_yaml("auth:\n  header: X-Token\n  value: s3cr3t\n")?;
//!     let handler = config.build_chain()?.handle(forward);
//!
//!     Server::bind("0.0.0.0:8080")?.serve(handler).await
//! }
//!
//! fn forward(ctx: &mut RequestContext) {
//!     // proxy / cache lookup goes here
//!     let key = hermyx::fingerprint_str(ctx.path());
//!     ctx.set_response_body(format!("cache key {key}"));
//! }
//! ```

mod context;
mod error;
mod fingerprint;
mod handler;
mod server;

pub mod config;
pub mod middleware;

pub use config::{AuthConfig, MiddlewareConfig};
pub use context::RequestContext;
pub use error::{Error, MiddlewareError};
pub use fingerprint::{FINGERPRINT_LEN, Fingerprint, fingerprint, fingerprint_str};
pub use handler::{BoxedHandler, Handler, boxed};
pub use middleware::{
    AuthMiddleware, BoxedMiddleware, Chain, ChainBuilder, LoggingMiddleware, Middleware,
    TransformMiddleware,
};
pub use server::Server;
