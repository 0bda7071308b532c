//! Middleware layer.
//!
//! Middleware intercepts requests and responses and is the right place for
//! cross-cutting concerns: authentication-header gating, access logging,
//! forwarding-header rewriting.
//!
//! Every interceptor implements [`Middleware`], two hooks around the terminal
//! handler:
//!
//! ```text
//! A.before → B.before → handler → A.after → B.after
//! ```
//!
//! A failing `before_request` stops the request on the spot and the chain
//! answers `403 Forbidden` with the failure text. A failing `after_response`
//! is logged and otherwise ignored. See [`Chain`] for the exact rules.
//!
//! Built-in middleware:
//! - [`AuthMiddleware`]: header/value gate, open when no value is configured
//! - [`LoggingMiddleware`]: one `info` line per phase
//! - [`TransformMiddleware`]: `X-Forwarded-For` on the way in, a marker header on the way out

mod auth;
mod chain;
mod logging;
mod transform;

use std::sync::Arc;

use crate::context::RequestContext;
use crate::error::MiddlewareError;

pub use auth::AuthMiddleware;
pub use chain::{Chain, ChainBuilder};
pub use logging::LoggingMiddleware;
pub use transform::{MARKER_HEADER, MARKER_VALUE, TransformMiddleware, X_FORWARDED_FOR};

/// A type-erased middleware shared by every request the chain serves.
pub type BoxedMiddleware = Arc<dyn Middleware>;

/// The interceptor capability.
///
/// One instance serves every concurrent request, so an implementation holds
/// only request-independent configuration. Anything per-request lives in the
/// [`RequestContext`]; shared counters need atomics or a lock.
pub trait Middleware: Send + Sync + 'static {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Runs before the terminal handler. An `Err` rejects the request.
    fn before_request(&self, ctx: &mut RequestContext) -> Result<(), MiddlewareError>;

    /// Runs after the terminal handler, only if it ran. An `Err` is advisory.
    fn after_response(&self, _ctx: &mut RequestContext) -> Result<(), MiddlewareError> {
        Ok(())
    }
}
