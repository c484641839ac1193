//! Error types for navigation resolution
//!
//! Most degraded conditions (no shell, no links, no semantic objects)
//! resolve to empty results instead of surfacing here; these variants cover
//! the genuine failures the resolver logs and absorbs.

/// Navigation resolution errors
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum NavError {
    /// Shell services are not present in this runtime
    #[error("shell services unavailable")]
    ShellUnavailable,

    /// Link-resolution service failure
    #[error("link resolution failed: {0}")]
    Service(String),

    /// App-state persistence failure
    #[error("app-state persistence failed: {0}")]
    AppState(String),
}

impl NavError {
    /// Wrap a link-resolution failure message
    #[inline]
    #[must_use]
    pub fn service(message: impl Into<String>) -> Self {
        Self::Service(message.into())
    }
}
