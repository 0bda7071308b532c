//! Handler trait and type erasure.
//!
//! A handler receives the [`RequestContext`] of one request and communicates
//! only by mutating it. There is no return value. Two kinds of handler exist:
//!
//! - the **terminal handler**: the proxy/cache logic the chain wraps;
//! - the **composed handler**: what [`Chain::handle`](crate::Chain::handle)
//!   returns, and what the server calls once per request.
//!
//! Both are stored the same way:
//!
//! ```text
//! |ctx: &mut RequestContext| { … }        ← caller writes this
//!        ↓ chain.handle(terminal)
//! Arc<dyn Handler>                        ← BoxedHandler, shared by every worker
//!        ↓
//! handler.call(&mut ctx)  at request time ← one vtable dispatch
//! ```

use std::sync::Arc;

use crate::context::RequestContext;

/// A heap-allocated, type-erased handler shared across concurrent requests.
pub type BoxedHandler = Arc<dyn Handler>;

/// Anything that can serve a request by mutating its context.
///
/// Implemented for every `Fn(&mut RequestContext) + Send + Sync + 'static`,
/// so closures and plain `fn` items work directly. The same instance is
/// called from many workers at once: keep per-request state in the context,
/// not in the handler.
pub trait Handler: Send + Sync + 'static {
    fn call(&self, ctx: &mut RequestContext);
}

impl<F> Handler for F
where
    F: Fn(&mut RequestContext) + Send + Sync + 'static,
{
    fn call(&self, ctx: &mut RequestContext) {
        self(ctx)
    }
}

/// Boxes any handler into the shared form the chain and server store.
pub fn boxed(handler: impl Handler) -> BoxedHandler {
    Arc::new(handler)
}
