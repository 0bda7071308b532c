//! Header rewriting.

use http::header::{HeaderName, HeaderValue};
use tracing::debug;

use super::Middleware;
use crate::context::RequestContext;
use crate::error::MiddlewareError;

pub const X_FORWARDED_FOR: HeaderName = HeaderName::from_static("x-forwarded-for");

/// Set on every response that made it through the terminal handler.
pub const MARKER_HEADER: HeaderName = HeaderName::from_static("x-hermyx-middleware");
pub const MARKER_VALUE: &str = "transformed";

/// First-hop forwarding header on the way in, processing marker on the way out.
///
/// `X-Forwarded-For` is only added when the client did not send one; an
/// existing forwarding chain is left untouched. The value is the peer
/// socket address (`ip:port`).
#[derive(Debug, Clone, Copy, Default)]
pub struct TransformMiddleware;

impl TransformMiddleware {
    pub fn new() -> Self {
        Self
    }
}

impl Middleware for TransformMiddleware {
    fn name(&self) -> &'static str { "transform" }

    fn before_request(&self, ctx: &mut RequestContext) -> Result<(), MiddlewareError> {
        if ctx.headers().get(&X_FORWARDED_FOR).is_some_and(|v| !v.is_empty()) {
            return Ok(());
        }

        let addr = ctx.remote_addr().to_string();
        match HeaderValue::from_str(&addr) {
            Ok(value) => {
                ctx.headers_mut().insert(X_FORWARDED_FOR, value);
                debug!(remote = %addr, "Transform middleware: set X-Forwarded-For");
            }
            Err(e) => debug!(remote = %addr, "Transform middleware: unusable remote address: {e}"),
        }
        Ok(())
    }

    fn after_response(&self, ctx: &mut RequestContext) -> Result<(), MiddlewareError> {
        ctx.response_headers_mut().insert(MARKER_HEADER, HeaderValue::from_static(MARKER_VALUE));
        Ok(())
    }
}
