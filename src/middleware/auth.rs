//! Shared-secret header gate.

use http::HeaderName;
use subtle::ConstantTimeEq;
use tracing::warn;

use super::Middleware;
use crate::config::AuthConfig;
use crate::context::RequestContext;
use crate::error::{Error, MiddlewareError};

/// Rejects requests whose auth header does not carry the expected value.
///
/// With an empty expected value the gate is open and every request passes.
/// That is the unconfigured default, not a fallback.
///
/// The header name is matched case-insensitively, the value byte-exactly
/// (and in constant time). An empty header counts as missing.
#[derive(Debug, Clone)]
pub struct AuthMiddleware {
    header: HeaderName,
    expected: String,
}

impl AuthMiddleware {
    /// Fails with [`Error::InvalidHeaderName`] when `header` is not a valid
    /// HTTP field name (empty, or containing spaces or control bytes).
    pub fn new(header: &str, expected: impl Into<String>) -> Result<Self, Error> {
        let header = HeaderName::from_bytes(header.as_bytes())
            .map_err(|_| Error::InvalidHeaderName(header.to_owned()))?;
        Ok(Self { header, expected: expected.into() })
    }

    pub fn from_config(config: &AuthConfig) -> Result<Self, Error> {
        Self::new(&config.header, config.value.clone())
    }

    pub fn is_enabled(&self) -> bool {
        !self.expected.is_empty()
    }
}

impl Middleware for AuthMiddleware {
    fn name(&self) -> &'static str { "auth" }

    fn before_request(&self, ctx: &mut RequestContext) -> Result<(), MiddlewareError> {
        if !self.is_enabled() {
            return Ok(());
        }

        let provided = match ctx.headers().get(&self.header) {
            Some(v) if !v.is_empty() => v.as_bytes(),
            _ => {
                warn!(header = %self.header, "Auth middleware: missing header");
                return Err(MiddlewareError::MissingAuth);
            }
        };

        if bool::from(provided.ct_eq(self.expected.as_bytes())) {
            Ok(())
        } else {
            warn!("Auth middleware: invalid token");
            Err(MiddlewareError::InvalidAuth)
        }
    }
}
