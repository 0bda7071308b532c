//! Error types.
//!
//! Two families live here. [`MiddlewareError`] is what a
//! [`Middleware`](crate::Middleware) hook returns; the chain turns a
//! before-hook failure into a `403` and logs an after-hook failure. [`Error`]
//! surfaces infrastructure failures: binding a port, parsing configuration.

use thiserror::Error;

/// Outcome of a failed middleware hook.
///
/// The `Display` text of a before-hook failure is sent verbatim as the body
/// of the `403` response, so keep it short and free of secrets.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MiddlewareError {
    /// Auth is enabled and the configured header is absent (or empty).
    #[error("missing auth")]
    MissingAuth,

    /// Auth is enabled and the header value does not match.
    #[error("invalid auth")]
    InvalidAuth,

    /// Any other before-hook rejection.
    #[error("{0}")]
    Rejected(String),

    /// An after-hook failure. Logged by the chain, never sent to the client.
    #[error("{0}")]
    Advisory(String),
}

impl MiddlewareError {
    pub fn rejected(message: impl Into<String>) -> Self {
        Self::Rejected(message.into())
    }

    pub fn advisory(message: impl Into<String>) -> Self {
        Self::Advisory(message.into())
    }
}

/// The error type returned by hermyx's fallible setup operations.
#[derive(Debug, Error)]
pub enum Error {
    #[error("io: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid socket address `{0}`")]
    InvalidAddress(String),

    #[error("config: {0}")]
    Config(#[from] serde_yaml::Error),

    #[error("invalid header name `{0}`")]
    InvalidHeaderName(String),
}
