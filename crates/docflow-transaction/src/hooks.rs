//! Injectable lifecycle hooks
//!
//! Applications extend the orchestrator through these callback fields; every
//! hook defaults to a no-op that resolves successfully. A failing
//! `on_before_*` hook vetoes its operation; `on_after_*` failures are logged
//! and absorbed.

use crate::error::TxError;
use docflow_model::DocumentContext;
use futures::future::BoxFuture;
use std::sync::Arc;

/// A lifecycle hook: async callback over the affected context
pub type Hook = Arc<dyn Fn(&DocumentContext) -> BoxFuture<'static, Result<(), TxError>> + Send + Sync>;

fn noop() -> Hook {
    Arc::new(|_| Box::pin(async { Ok(()) }))
}

/// The extensible points of the orchestrator
#[derive(Clone)]
pub struct LifecycleHooks {
    /// Runs before an edit session is requested; an error vetoes the edit
    pub on_before_edit: Hook,
    /// Runs before save; an error vetoes the save
    pub on_before_save: Hook,
    /// Runs after a successful save (post-save survey point)
    pub on_after_save: Hook,
    /// Runs after a successful creation
    pub on_after_create: Hook,
    /// Runs after a successful discard
    pub on_after_discard: Hook,
}

impl Default for LifecycleHooks {
    fn default() -> Self {
        Self {
            on_before_edit: noop(),
            on_before_save: noop(),
            on_after_save: noop(),
            on_after_create: noop(),
            on_after_discard: noop(),
        }
    }
}

impl LifecycleHooks {
    /// All-default hooks
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the before-save hook
    #[must_use]
    pub fn with_before_save(mut self, hook: Hook) -> Self {
        self.on_before_save = hook;
        self
    }

    /// Replace the after-save hook
    #[must_use]
    pub fn with_after_save(mut self, hook: Hook) -> Self {
        self.on_after_save = hook;
        self
    }

    /// Replace the after-create hook
    #[must_use]
    pub fn with_after_create(mut self, hook: Hook) -> Self {
        self.on_after_create = hook;
        self
    }

    /// Replace the before-edit hook
    #[must_use]
    pub fn with_before_edit(mut self, hook: Hook) -> Self {
        self.on_before_edit = hook;
        self
    }

    /// Replace the after-discard hook
    #[must_use]
    pub fn with_after_discard(mut self, hook: Hook) -> Self {
        self.on_after_discard = hook;
        self
    }
}

impl std::fmt::Debug for LifecycleHooks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LifecycleHooks").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use docflow_model::DocPath;
    use std::sync::atomic::{AtomicBool, Ordering};

    #[tokio::test]
    async fn default_hooks_resolve() {
        let hooks = LifecycleHooks::new();
        let ctx = DocumentContext::new(DocPath::single("SalesOrder(1)"), "SalesOrder");
        assert!((hooks.on_before_save)(&ctx).await.is_ok());
        assert!((hooks.on_after_save)(&ctx).await.is_ok());
    }

    #[tokio::test]
    async fn custom_hook_is_invoked() {
        let fired = Arc::new(AtomicBool::new(false));
        let fired_in_hook = fired.clone();
        let hooks = LifecycleHooks::new().with_after_save(Arc::new(move |_| {
            let fired = fired_in_hook.clone();
            Box::pin(async move {
                fired.store(true, Ordering::SeqCst);
                Ok(())
            })
        }));

        let ctx = DocumentContext::new(DocPath::single("SalesOrder(1)"), "SalesOrder");
        (hooks.on_after_save)(&ctx).await.unwrap();
        assert!(fired.load(Ordering::SeqCst));
    }
}
