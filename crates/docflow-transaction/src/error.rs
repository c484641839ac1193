//! Error types for transaction orchestration
//!
//! Tagged variants replace the string sentinels the consumed services use
//! for control flow; the three soft-cancel variants trigger transient-state
//! recovery instead of propagating.

use docflow_lifecycle::LifecycleError;

/// Transaction orchestration errors
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum TxError {
    /// User dismissed a confirmation dialog
    #[error("cancelled by user")]
    UserCancelled,

    /// Action invocation failed in a recoverable way
    #[error("action execution failed")]
    ActionExecutionFailed,

    /// Document creation failed in a recoverable way
    #[error("document creation failed")]
    CreationFailed,

    /// Document validation rejected the operation before any mutation
    #[error("validation failed: {0}")]
    ValidationFailed(String),

    /// Collaborator service failure (backend/network)
    #[error("service failed: {0}")]
    Service(String),

    /// Lifecycle rule violation
    #[error(transparent)]
    Lifecycle(#[from] LifecycleError),

    /// Another user-triggered operation holds the busy lock
    #[error("another operation is in progress")]
    Busy,
}

impl TxError {
    /// The three recovery sentinels: absorbed after back-navigation from
    /// transient state rather than rethrown.
    #[inline]
    #[must_use]
    pub fn is_soft_cancel(&self) -> bool {
        matches!(
            self,
            Self::UserCancelled | Self::ActionExecutionFailed | Self::CreationFailed
        )
    }

    /// Whether the error must reach the caller
    #[inline]
    #[must_use]
    pub fn is_propagated(&self) -> bool {
        !self.is_soft_cancel()
    }

    /// Wrap a collaborator failure message
    #[inline]
    #[must_use]
    pub fn service(message: impl Into<String>) -> Self {
        Self::Service(message.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn soft_cancel_classification() {
        assert!(TxError::UserCancelled.is_soft_cancel());
        assert!(TxError::ActionExecutionFailed.is_soft_cancel());
        assert!(TxError::CreationFailed.is_soft_cancel());

        assert!(!TxError::Busy.is_soft_cancel());
        assert!(!TxError::service("boom").is_soft_cancel());
        assert!(TxError::service("boom").is_propagated());
    }
}
