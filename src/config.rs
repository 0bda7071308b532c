//! Middleware configuration.
//!
//! This is the `middleware` section of the proxy's YAML config. Reading the
//! file is the CLI's job; this module parses the section and turns it into a
//! [`Chain`].
//!
//! ```yaml
//! auth:
//!   header: X-Hermyx-Token
//!   value: s3cr3t          # empty or omitted: auth disabled
//! logging: true
//! transform: true
//! ```

use serde::Deserialize;

use crate::error::Error;
use crate::middleware::{AuthMiddleware, Chain, LoggingMiddleware, TransformMiddleware};

/// Header checked by [`AuthMiddleware`] when the config names none.
pub const DEFAULT_AUTH_HEADER: &str = "Authorization";

/// Header name and expected value for [`AuthMiddleware`].
///
/// An empty `value` disables authentication. Unknown keys are rejected, so a
/// misspelt `value` cannot silently open the gate.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AuthConfig {
    pub header: String,
    pub value: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self { header: DEFAULT_AUTH_HEADER.to_owned(), value: String::new() }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MiddlewareConfig {
    pub auth: AuthConfig,
    pub logging: bool,
    pub transform: bool,
}

impl Default for MiddlewareConfig {
    fn default() -> Self {
        Self { auth: AuthConfig::default(), logging: true, transform: true }
    }
}

impl MiddlewareConfig {
    pub fn from_yaml(src: &str) -> Result<Self, Error> {
        Ok(serde_yaml::from_str(src)?)
    }

    /// Builds the chain: logging (if enabled), auth, transform (if enabled).
    ///
    /// Logging goes first so rejected requests still show up in the log.
    /// Fails if `auth.header` is not a valid header name.
    pub fn build_chain(&self) -> Result<Chain, Error> {
        let mut builder = Chain::builder();
        if self.logging {
            builder = builder.with(LoggingMiddleware::new());
        }
        builder = builder.with(AuthMiddleware::from_config(&self.auth)?);
        if self.transform {
            builder = builder.with(TransformMiddleware::new());
        }
        Ok(builder.build())
    }
}
