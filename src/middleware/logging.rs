//! Access logging.

use tracing::info;

use super::Middleware;
use crate::context::RequestContext;
use crate::error::MiddlewareError;

/// Logs one `info` line before and one after each request. Read-only.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingMiddleware;

impl LoggingMiddleware {
    pub fn new() -> Self {
        Self
    }
}

impl Middleware for LoggingMiddleware {
    fn name(&self) -> &'static str { "logging" }

    fn before_request(&self, ctx: &mut RequestContext) -> Result<(), MiddlewareError> {
        info!(method = %ctx.method(), path = ctx.path(), "Middleware(before)");
        Ok(())
    }

    fn after_response(&self, ctx: &mut RequestContext) -> Result<(), MiddlewareError> {
        info!(status = ctx.status().as_u16(), path = ctx.path(), "Middleware(after)");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use http::{Method, StatusCode};

    use super::*;

    #[test]
    fn never_fails_and_never_mutates() {
        let mut ctx = RequestContext::new(
            Method::DELETE,
            "/cache/k".parse().unwrap(),
            "127.0.0.1:1".parse().unwrap(),
        );
        ctx.set_status(StatusCode::NOT_FOUND);

        let logging = LoggingMiddleware::new();
        assert_eq!(logging.before_request(&mut ctx), Ok(()));
        assert_eq!(logging.after_response(&mut ctx), Ok(()));

        assert_eq!(ctx.status(), StatusCode::NOT_FOUND);
        assert!(ctx.headers().is_empty());
        assert!(ctx.response_headers().is_empty());
    }
}
