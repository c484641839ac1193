//! Document flow orchestration
//!
//! [`DocumentFlow`] is the single component owning the public operation
//! surface and the per-page session state. Every mutating operation is
//! serialized through the sync-task queue; user-triggered operations
//! additionally take the busy lock, which fails fast instead of queuing.

use crate::error::TxError;
use crate::hooks::LifecycleHooks;
use crate::services::{
    ActionMetadata, ActivityKind, CollaborationService, ListBinding, MessageHandler,
    NavigationListener, TransactionService,
};
use crate::sync::{BusyLock, SyncTaskQueue};
use docflow_lifecycle::{
    validate_draft_transition, validate_edit_transition, DraftSiblingAlgorithm, SiblingResolver,
};
use docflow_model::{
    CreationMode, DocPath, DocumentContext, DraftStatus, EditMode, ProgrammingModel, SessionId,
    SessionState, SiblingInformation,
};
use parking_lot::RwLock;
use serde_json::{Map, Value};
use std::sync::Arc;

/// Collaborator bundle handed to [`DocumentFlow::new`]
#[derive(Clone)]
pub struct FlowServices {
    pub transaction: Arc<dyn TransactionService>,
    pub navigation: Arc<dyn NavigationListener>,
    pub messages: Arc<dyn MessageHandler>,
    pub collaboration: Arc<dyn CollaborationService>,
    pub metadata: Arc<dyn ActionMetadata>,
    pub draft_sibling: Arc<dyn DraftSiblingAlgorithm>,
}

/// Parameters for [`DocumentFlow::create_document`]
#[derive(Clone, Default)]
pub struct CreateParams {
    /// Explicitly requested creation mode; wins over metadata-based resolution
    pub creation_mode: Option<CreationMode>,
    /// Entity set the new instance belongs to
    pub entity_set: String,
    /// Initial attribute values
    pub data: Map<String, Value>,
    /// Outbound target for [`CreationMode::External`]
    pub outbound: Option<String>,
}

/// Outcome of a create operation
#[derive(Debug, Clone, PartialEq)]
pub enum CreateOutcome {
    /// Instance created and materialized
    Created(DocumentContext),
    /// Navigation initiated; creation happens when the target page materializes
    Deferred,
    /// Hand-off to an external application completed
    External,
    /// Creation cancelled by the user; transient state was navigated away
    Cancelled,
}

/// Parameters for [`DocumentFlow::invoke_action`]
#[derive(Clone, Default)]
pub struct InvokeActionParams {
    /// Binding context for bound actions
    pub bound_context: Option<DocumentContext>,
    /// Action parameter values
    pub parameters: Map<String, Value>,
    /// Navigate forward to a returned context
    pub navigate_on_result: bool,
}

/// Options for [`DocumentFlow::secured_execution`]
#[derive(Debug, Clone, Copy)]
pub struct SecuredExecutionOptions {
    /// Reject when another operation holds the busy lock
    pub busy_check: bool,
    /// Hold the busy lock for the duration of the function
    pub busy_lock: bool,
    /// Track draft status around the function
    pub updates_document: bool,
}

impl Default for SecuredExecutionOptions {
    fn default() -> Self {
        Self {
            busy_check: true,
            busy_lock: true,
            updates_document: false,
        }
    }
}

/// Split an action name into base name and overload entity-type suffix
///
/// `"Approve(com.acme.SalesOrderType)"` resolves the overload bound to that
/// entity type; a bare name resolves against the binding context's type.
fn split_overload(name: &str) -> (&str, Option<&str>) {
    match (name.find('('), name.ends_with(')')) {
        (Some(open), true) => (&name[..open], Some(&name[open + 1..name.len() - 1])),
        _ => (name, None),
    }
}

/// Per-page transaction orchestrator
///
/// Owns the session state and serializes every document mutation. All
/// persistence, routing and messaging is delegated to the collaborator
/// traits in [`crate::services`].
pub struct DocumentFlow {
    session_id: SessionId,
    programming_model: ProgrammingModel,
    state: RwLock<SessionState>,
    queue: SyncTaskQueue,
    busy: BusyLock,
    services: FlowServices,
    sibling_resolver: SiblingResolver,
    list_binding: Option<Arc<dyn ListBinding>>,
    hooks: LifecycleHooks,
}

impl DocumentFlow {
    /// Create a flow for one page session
    #[must_use]
    pub fn new(programming_model: ProgrammingModel, services: FlowServices) -> Self {
        let sibling_resolver = SiblingResolver::new(services.draft_sibling.clone());
        Self {
            session_id: SessionId::new(),
            programming_model,
            state: RwLock::new(SessionState::new()),
            queue: SyncTaskQueue::new(),
            busy: BusyLock::new(),
            services,
            sibling_resolver,
            list_binding: None,
            hooks: LifecycleHooks::default(),
        }
    }

    /// With lifecycle hooks
    #[must_use]
    pub fn with_hooks(mut self, hooks: LifecycleHooks) -> Self {
        self.hooks = hooks;
        self
    }

    /// With a dependent list binding
    #[must_use]
    pub fn with_list_binding(mut self, binding: Arc<dyn ListBinding>) -> Self {
        self.list_binding = Some(binding);
        self
    }

    /// Session identifier
    #[inline]
    #[must_use]
    pub fn session_id(&self) -> SessionId {
        self.session_id
    }

    /// Programming model of the hosted entity set
    #[inline]
    #[must_use]
    pub fn programming_model(&self) -> ProgrammingModel {
        self.programming_model
    }

    /// Snapshot of the session state
    #[must_use]
    pub fn session_state(&self) -> SessionState {
        self.state.read().clone()
    }

    /// Whether a user-triggered operation is in flight
    #[inline]
    #[must_use]
    pub fn is_busy(&self) -> bool {
        self.busy.is_locked()
    }

    /// Request an editable document for `context`
    ///
    /// On success the session switches to `Editable`, the modified flag is
    /// cleared and, for sticky entity sets, the edit-session token is
    /// recorded. Service rejections are logged and absorbed (best effort);
    /// the session stays in display mode.
    pub async fn edit_document(
        &self,
        context: &DocumentContext,
    ) -> Result<Option<DocumentContext>, TxError> {
        let _busy = self.busy.try_acquire().ok_or(TxError::Busy)?;
        self.queue
            .run(async {
                tracing::info!(session = %self.session_id, path = %context.path, "edit document");

                let current = self.state.read().edit_mode;
                if let Err(e) = validate_edit_transition(current, EditMode::Editable) {
                    tracing::warn!(error = %e, "edit rejected");
                    return Ok(None);
                }

                if let Err(e) = (self.hooks.on_before_edit)(context).await {
                    tracing::warn!(error = %e, "edit vetoed by hook");
                    return Ok(None);
                }

                match self.services.transaction.edit_document(context).await {
                    Ok(edit) => {
                        {
                            let mut state = self.state.write();
                            state.edit_mode = EditMode::Editable;
                            state.document_modified = false;
                            if self.programming_model.uses_sticky_session() {
                                state.sticky_session_token = edit.sticky_session_token.clone();
                            }
                        }

                        if self.programming_model.uses_draft()
                            && self.services.collaboration.is_connected()
                        {
                            if let Err(e) = self.services.collaboration.share(&edit.context).await
                            {
                                tracing::warn!(error = %e, "collaboration share failed");
                            }
                        }

                        Ok(Some(edit.context))
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, "edit request rejected");
                        Ok(None)
                    }
                }
            })
            .await
    }

    /// Persist the editable document and return to display mode
    ///
    /// Submits pending changes, validates, then saves. On failure the draft
    /// status is reset and the original error propagates.
    pub async fn save_document(
        &self,
        context: &DocumentContext,
    ) -> Result<DocumentContext, TxError> {
        let _busy = self.busy.try_acquire().ok_or(TxError::Busy)?;
        self.queue
            .run(async {
                tracing::info!(session = %self.session_id, path = %context.path, "save document");

                {
                    let mut state = self.state.write();
                    validate_draft_transition(state.draft_status, DraftStatus::Saving)?;
                    state.draft_status = DraftStatus::Saving;
                }

                let result = async {
                    (self.hooks.on_before_save)(context).await?;
                    self.services.transaction.submit_pending_changes().await?;
                    self.services.transaction.validate_document(context).await?;
                    self.services.transaction.save_document(context).await
                }
                .await;

                match result {
                    Ok(saved) => {
                        {
                            let mut state = self.state.write();
                            state.edit_mode = EditMode::Display;
                            state.draft_status = DraftStatus::Saved;
                            state.document_modified = false;
                            state.sticky_session_token = None;
                        }

                        if self.services.collaboration.is_connected() {
                            if let Err(e) = self
                                .services
                                .collaboration
                                .send_activity(ActivityKind::Activate, &saved)
                                .await
                            {
                                tracing::warn!(error = %e, "activate notification failed");
                            }
                        }

                        if let Err(e) = (self.hooks.on_after_save)(&saved).await {
                            tracing::warn!(error = %e, "after-save hook failed");
                        }

                        Ok(saved)
                    }
                    Err(e) => {
                        self.state.write().draft_status = DraftStatus::Clear;
                        self.services.messages.show_message_dialog().await;
                        tracing::error!(error = %e, "save failed");
                        Err(e)
                    }
                }
            })
            .await
    }

    /// Discard the editable document
    ///
    /// Returns the active sibling the page should display, or `None` for a
    /// new document (where the page navigates back instead of reloading).
    /// A [`TxError::UserCancelled`] from the discard confirmation keeps the
    /// session editable and resolves to `None`.
    pub async fn cancel_document(
        &self,
        context: &DocumentContext,
    ) -> Result<Option<DocumentContext>, TxError> {
        let _busy = self.busy.try_acquire().ok_or(TxError::Busy)?;
        self.queue
            .run(async {
                tracing::info!(session = %self.session_id, path = %context.path, "cancel document");

                match self.services.transaction.cancel_document(context).await {
                    Ok(active_sibling) => {
                        self.state.write().reset();
                        self.services.messages.remove_transition_messages();

                        if let Err(e) = (self.hooks.on_after_discard)(context).await {
                            tracing::warn!(error = %e, "after-discard hook failed");
                        }

                        if context.is_new_document() {
                            // Nothing to fall back to; leave the page
                            self.services
                                .navigation
                                .navigate_back_from_context(context)
                                .await?;
                            return Ok(None);
                        }

                        if let Some(active) = &active_sibling {
                            self.services.navigation.navigate_to_context(active).await?;
                        }
                        Ok(active_sibling)
                    }
                    Err(TxError::UserCancelled) => {
                        tracing::debug!("discard dismissed, staying editable");
                        Ok(None)
                    }
                    Err(e) => {
                        self.state.write().draft_status = DraftStatus::Clear;
                        tracing::error!(error = %e, "cancel failed");
                        Err(e)
                    }
                }
            })
            .await
    }

    /// Switch between the draft and active versions of a document
    ///
    /// Computes the sibling of `rightmost` under `root`, adjusts the edit
    /// mode to the target's lifecycle state and navigates there. Without a
    /// sibling document the toggle resolves to `None` and nothing happens.
    pub async fn toggle_draft_active(
        &self,
        root: &DocumentContext,
        rightmost: &DocumentContext,
    ) -> Result<Option<SiblingInformation>, TxError> {
        let info = self
            .sibling_resolver
            .compute_sibling_information(root, rightmost, self.programming_model, false)
            .await?;

        if let Some(info) = &info {
            {
                let mut state = self.state.write();
                state.edit_mode = if info.target.is_draft() {
                    EditMode::Editable
                } else {
                    EditMode::Display
                };
                state.document_modified = false;
            }
            self.services
                .navigation
                .navigate_to_context(&info.target)
                .await?;
        }

        Ok(info)
    }

    /// Create a new document instance under `target`
    ///
    /// The creation mode resolves from the explicit request, then from a
    /// declared parameterized creation action, then from non-computed
    /// mandatory key fields. [`CreationMode::External`] delegates navigation
    /// immediately and never touches session state.
    pub async fn create_document(
        &self,
        target: &DocPath,
        params: CreateParams,
    ) -> Result<CreateOutcome, TxError> {
        let mode = self.resolve_creation_mode(&params);

        if mode == CreationMode::External {
            let outbound = params.outbound.as_deref().unwrap_or(&params.entity_set);
            self.services
                .navigation
                .navigate_external(outbound, &params.data)
                .await?;
            return Ok(CreateOutcome::External);
        }

        let _busy = self.busy.try_acquire().ok_or(TxError::Busy)?;
        self.queue
            .run(async {
                tracing::info!(
                    session = %self.session_id,
                    target = %target,
                    ?mode,
                    "create document"
                );

                // Validation aborts before any mutation
                self.validate_creation_data(&params)?;

                let result = self.create_with_mode(target, &params, mode).await;
                match result {
                    Ok(CreateOutcome::Created(context)) => {
                        {
                            let mut state = self.state.write();
                            state.document_modified = true;
                            state.creation_mode = Some(mode);
                            state.edit_mode = EditMode::Editable;
                        }

                        if self.services.collaboration.is_connected() {
                            if let Err(e) = self
                                .services
                                .collaboration
                                .send_activity(ActivityKind::Create, &context)
                                .await
                            {
                                tracing::warn!(error = %e, "create notification failed");
                            }
                            if let Err(e) = self.services.collaboration.share(&context).await {
                                tracing::warn!(error = %e, "collaboration share failed");
                            }
                        }

                        if let Err(e) = (self.hooks.on_after_create)(&context).await {
                            tracing::warn!(error = %e, "after-create hook failed");
                        }

                        Ok(CreateOutcome::Created(context))
                    }
                    Ok(outcome) => Ok(outcome),
                    Err(e) if e.is_soft_cancel() => {
                        tracing::debug!(error = %e, "creation cancelled, leaving transient state");
                        if let Err(nav) = self
                            .services
                            .navigation
                            .navigate_back_from_transient_state()
                            .await
                        {
                            tracing::warn!(error = %nav, "transient-state recovery failed");
                        }
                        Ok(CreateOutcome::Cancelled)
                    }
                    Err(e) => {
                        self.services.messages.show_message_dialog().await;
                        tracing::error!(error = %e, "creation failed");
                        Err(e)
                    }
                }
            })
            .await
    }

    /// Invoke a bound or unbound action
    ///
    /// Bound/unbound is decided by metadata; an entity-type suffix in the
    /// action name (`"Approve(com.acme.Type)"`) resolves overloads. A
    /// dependent list is refreshed only when the response keys differ from
    /// the binding context; forward navigation never targets the context the
    /// action started from.
    pub async fn invoke_action(
        &self,
        name: &str,
        params: InvokeActionParams,
    ) -> Result<Option<DocumentContext>, TxError> {
        let _busy = self.busy.try_acquire().ok_or(TxError::Busy)?;
        self.queue
            .run(async {
                let (base, overload) = split_overload(name);
                tracing::info!(session = %self.session_id, action = base, "invoke action");

                let bound_context = params.bound_context.as_ref().filter(|ctx| {
                    let entity_type = overload.unwrap_or(ctx.entity_type.as_str());
                    self.services.metadata.is_bound(base, entity_type)
                });

                let result = self
                    .services
                    .transaction
                    .call_action(base, bound_context, &params.parameters)
                    .await;

                match result {
                    Ok(response) => {
                        self.services.messages.remove_transition_messages();

                        if let (Some(bound), Some(returned)) =
                            (bound_context, response.context.as_ref())
                        {
                            if returned.key_values() != bound.key_values() {
                                if let Some(list) = &self.list_binding {
                                    if let Err(e) = list.refresh().await {
                                        tracing::warn!(error = %e, "list refresh failed");
                                    }
                                }
                            }

                            if params.navigate_on_result && returned.path != bound.path {
                                self.services
                                    .navigation
                                    .navigate_forward_to_context(returned)
                                    .await?;
                            }
                        }

                        Ok(response.context)
                    }
                    Err(e) if e.is_soft_cancel() => {
                        tracing::debug!(action = base, error = %e, "action cancelled");
                        if let Err(nav) = self
                            .services
                            .navigation
                            .navigate_back_from_transient_state()
                            .await
                        {
                            tracing::warn!(error = %nav, "transient-state recovery failed");
                        }
                        Ok(None)
                    }
                    Err(e) => {
                        self.services.messages.show_message_dialog().await;
                        tracing::error!(action = base, error = %e, "action failed");
                        Err(e)
                    }
                }
            })
            .await
    }

    /// Delete one document instance
    pub async fn delete_document(&self, context: &DocumentContext) -> Result<(), TxError> {
        self.delete_multiple_documents(std::slice::from_ref(context))
            .await
    }

    /// Delete several document instances
    ///
    /// An active entity whose draft is displayed in the dependent list gets
    /// its draft entry swapped for the active one before removal, keeping
    /// the list binding consistent. A user-cancelled confirmation aborts
    /// the remaining deletions without error.
    pub async fn delete_multiple_documents(
        &self,
        contexts: &[DocumentContext],
    ) -> Result<(), TxError> {
        let _busy = self.busy.try_acquire().ok_or(TxError::Busy)?;
        self.queue
            .run(async {
                tracing::info!(session = %self.session_id, count = contexts.len(), "delete documents");

                for context in contexts {
                    if context.is_active() && context.flags.has_draft_entity {
                        self.swap_draft_list_entry(context).await?;
                    }

                    match self.services.transaction.delete_document(context).await {
                        Ok(()) => {
                            if self.services.collaboration.is_connected() {
                                if let Err(e) = self
                                    .services
                                    .collaboration
                                    .send_activity(ActivityKind::Delete, context)
                                    .await
                                {
                                    tracing::warn!(error = %e, "delete notification failed");
                                }
                            }
                        }
                        Err(TxError::UserCancelled) => {
                            tracing::debug!("delete dismissed");
                            return Ok(());
                        }
                        Err(e) => {
                            self.services.messages.show_message_dialog().await;
                            tracing::error!(error = %e, path = %context.path, "delete failed");
                            return Err(e);
                        }
                    }
                }

                self.state.write().document_modified = true;
                Ok(())
            })
            .await
    }

    /// Persist sub-object changes and navigate back to the parent page
    ///
    /// The session stays editable; only pending changes are submitted.
    pub async fn apply_document(&self, context: &DocumentContext) -> Result<(), TxError> {
        let _busy = self.busy.try_acquire().ok_or(TxError::Busy)?;
        self.queue
            .run(async {
                tracing::info!(session = %self.session_id, path = %context.path, "apply document");

                match self.services.transaction.submit_pending_changes().await {
                    Ok(()) => {
                        self.services
                            .navigation
                            .navigate_back_from_context(context)
                            .await
                    }
                    Err(e) => {
                        self.services.messages.show_message_dialog().await;
                        tracing::error!(error = %e, "apply failed");
                        Err(e)
                    }
                }
            })
            .await
    }

    /// Run an arbitrary function under the orchestrator's guarantees
    ///
    /// Provides busy precondition check, busy locking, draft-status
    /// bookkeeping and serialized execution for callers outside the named
    /// lifecycle operations.
    pub async fn secured_execution<T, F, Fut>(
        &self,
        f: F,
        options: SecuredExecutionOptions,
    ) -> Result<T, TxError>
    where
        F: FnOnce() -> Fut,
        Fut: std::future::Future<Output = Result<T, TxError>>,
    {
        if options.busy_check && self.busy.is_locked() {
            return Err(TxError::Busy);
        }

        let _busy = if options.busy_lock {
            Some(self.busy.try_acquire().ok_or(TxError::Busy)?)
        } else {
            None
        };

        let result = self
            .queue
            .run(async {
                if options.updates_document {
                    self.state.write().draft_status = DraftStatus::Saving;
                }

                let result = f().await;

                if options.updates_document {
                    let mut state = self.state.write();
                    state.draft_status = match &result {
                        Ok(_) => DraftStatus::Saved,
                        Err(_) => DraftStatus::Clear,
                    };
                }

                result
            })
            .await;

        self.services.messages.remove_transition_messages();
        result
    }

    fn resolve_creation_mode(&self, params: &CreateParams) -> CreationMode {
        if let Some(mode) = params.creation_mode {
            return mode;
        }
        if self
            .services
            .metadata
            .creation_action(&params.entity_set)
            .is_some()
        {
            // Parameter dialog collects input on the target page
            return CreationMode::Deferred;
        }
        if !self
            .services
            .metadata
            .mandatory_key_fields(&params.entity_set)
            .is_empty()
        {
            return CreationMode::Sync;
        }
        CreationMode::Async
    }

    fn validate_creation_data(&self, params: &CreateParams) -> Result<(), TxError> {
        for field in self
            .services
            .metadata
            .mandatory_key_fields(&params.entity_set)
        {
            let missing = match params.data.get(&field) {
                None | Some(Value::Null) => true,
                Some(_) => false,
            };
            if missing {
                return Err(TxError::ValidationFailed(format!(
                    "mandatory key field '{field}' missing"
                )));
            }
        }
        Ok(())
    }

    async fn create_with_mode(
        &self,
        target: &DocPath,
        params: &CreateParams,
        mode: CreationMode,
    ) -> Result<CreateOutcome, TxError> {
        match mode {
            CreationMode::Deferred => {
                let transient =
                    DocumentContext::new(target.clone(), params.entity_set.clone());
                self.services
                    .navigation
                    .navigate_forward_to_context(&transient)
                    .await?;
                Ok(CreateOutcome::Deferred)
            }
            CreationMode::Sync => {
                let context = self
                    .services
                    .transaction
                    .create_document(target, &params.data)
                    .await?;
                self.services
                    .navigation
                    .navigate_forward_to_context(&context)
                    .await?;
                Ok(CreateOutcome::Created(context))
            }
            CreationMode::Async => {
                // Navigation and creation run in parallel; the page binds to
                // the created instance once both complete.
                let transient =
                    DocumentContext::new(target.clone(), params.entity_set.clone());
                let (nav, created) = tokio::join!(
                    self.services.navigation.navigate_forward_to_context(&transient),
                    self.services.transaction.create_document(target, &params.data),
                );
                nav?;
                Ok(CreateOutcome::Created(created?))
            }
            CreationMode::Inline | CreationMode::CreationRow => {
                let context = self
                    .services
                    .transaction
                    .create_document(target, &params.data)
                    .await?;
                if let Some(list) = &self.list_binding {
                    if let Err(e) = list.refresh().await {
                        tracing::warn!(error = %e, "list refresh failed");
                    }
                }
                Ok(CreateOutcome::Created(context))
            }
            CreationMode::External => unreachable!("external hand-off returns before enqueuing"),
        }
    }

    async fn swap_draft_list_entry(&self, active: &DocumentContext) -> Result<(), TxError> {
        let Some(list) = &self.list_binding else {
            return Ok(());
        };
        let draft_entry = list
            .contexts()
            .into_iter()
            .find(|entry| entry.is_draft() && entry.key_values() == active.key_values());
        if let Some(draft) = draft_entry {
            tracing::debug!(draft = %draft.path, active = %active.path, "swapping list entry");
            list.swap_entry(&draft, active).await?;
        }
        Ok(())
    }
}

impl std::fmt::Debug for DocumentFlow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DocumentFlow")
            .field("session_id", &self.session_id)
            .field("programming_model", &self.programming_model)
            .field("state", &*self.state.read())
            .finish_non_exhaustive()
    }
}
