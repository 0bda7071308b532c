//! Ordered middleware chain.
//!
//! Build it once at startup, share it everywhere. The middleware list lives in
//! an `Arc<[_]>`: cloning a [`Chain`] is one atomic increment, and no worker
//! can change the list another worker is iterating.

use std::sync::Arc;

use http::StatusCode;
use tracing::{debug, warn};

use super::{BoxedMiddleware, Middleware};
use crate::context::RequestContext;
use crate::handler::{BoxedHandler, Handler};

/// An immutable, ordered sequence of middleware.
///
/// Registration order is invocation order for **both** phases:
///
/// 1. `before_request` on each middleware in order. The first `Err` writes
///    `403 Forbidden` with the error text as body and returns; later
///    before-hooks, the terminal handler and every after-hook are skipped.
/// 2. The terminal handler, exactly once.
/// 3. `after_response` on each middleware in the same order, not reversed.
///    An `Err` is logged at `warn` and the next after-hook still runs; the
///    response is left as it was.
///
/// The chain itself writes to the context only when it rejects.
#[derive(Clone)]
pub struct Chain {
    middlewares: Arc<[BoxedMiddleware]>,
}

impl Chain {
    pub fn new(middlewares: impl IntoIterator<Item = BoxedMiddleware>) -> Self {
        Self { middlewares: middlewares.into_iter().collect() }
    }

    pub fn builder() -> ChainBuilder {
        ChainBuilder::new()
    }

    pub fn len(&self) -> usize { self.middlewares.len() }
    pub fn is_empty(&self) -> bool { self.middlewares.is_empty() }

    /// Middleware names in invocation order.
    pub fn names(&self) -> Vec<&'static str> {
        self.middlewares.iter().map(|mw| mw.name()).collect()
    }

    /// Drives one request through the chain and `terminal`.
    pub fn run<H>(&self, ctx: &mut RequestContext, terminal: &H)
    where
        H: Handler + ?Sized,
    {
        for mw in self.middlewares.iter() {
            if let Err(e) = mw.before_request(ctx) {
                debug!(middleware = mw.name(), path = ctx.path(), reason = %e, "request rejected");
                ctx.error(e.to_string(), StatusCode::FORBIDDEN);
                return;
            }
        }

        terminal.call(ctx);

        for mw in self.middlewares.iter() {
            if let Err(e) = mw.after_response(ctx) {
                warn!(middleware = mw.name(), path = ctx.path(), "after-response hook failed: {e}");
            }
        }
    }

    /// Wraps `terminal` into the composed handler the server calls per request.
    pub fn handle(&self, terminal: impl Handler) -> BoxedHandler {
        let chain = self.clone();
        Arc::new(move |ctx: &mut RequestContext| chain.run(ctx, &terminal))
    }
}

impl std::fmt::Debug for Chain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Chain").field("middlewares", &self.names()).finish()
    }
}

/// Append-then-freeze builder for [`Chain`].
///
/// ```rust
/// use hermyx::{Chain, LoggingMiddleware, TransformMiddleware};
///
/// let chain = Chain::builder()
///     .with(LoggingMiddleware::new())
///     .with(TransformMiddleware::new())
///     .build();
/// assert_eq!(chain.names(), ["logging", "transform"]);
/// ```
#[derive(Default)]
pub struct ChainBuilder {
    middlewares: Vec<BoxedMiddleware>,
}

impl ChainBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `middleware`. Returns `self` for chaining.
    pub fn with(mut self, middleware: impl Middleware) -> Self {
        self.middlewares.push(Arc::new(middleware));
        self
    }

    /// Appends an already-shared middleware.
    pub fn push(&mut self, middleware: BoxedMiddleware) -> &mut Self {
        self.middlewares.push(middleware);
        self
    }

    pub fn build(self) -> Chain {
        Chain::new(self.middlewares)
    }
}
