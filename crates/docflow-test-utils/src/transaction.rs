//! In-memory fakes for the transaction collaborator traits

use async_trait::async_trait;
use docflow_lifecycle::{DraftSiblingAlgorithm, LifecycleError};
use docflow_model::{DocPath, DocumentContext, DocumentFlags};
use docflow_transaction::{
    ActionMetadata, ActionResponse, ActivityKind, CollaborationService, EditResult, ListBinding,
    MessageHandler, NavigationListener, TransactionService, TxError,
};
use parking_lot::Mutex;
use serde_json::{Map, Value};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

/// Scriptable transaction service recording every call
#[derive(Default)]
pub struct FakeTransactionService {
    calls: Mutex<Vec<String>>,
    edit_error: Mutex<Option<TxError>>,
    save_error: Mutex<Option<TxError>>,
    validate_error: Mutex<Option<TxError>>,
    create_error: Mutex<Option<TxError>>,
    cancel_error: Mutex<Option<TxError>>,
    delete_error: Mutex<Option<TxError>>,
    action_error: Mutex<Option<TxError>>,
    sticky_token: Mutex<Option<String>>,
    action_context: Mutex<Option<DocumentContext>>,
    cancel_sibling: Mutex<Option<DocumentContext>>,
    create_counter: AtomicUsize,
}

impl FakeTransactionService {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Names of all recorded calls, in order
    #[must_use]
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }

    fn record(&self, call: impl Into<String>) {
        self.calls.lock().push(call.into());
    }

    fn take(&self, slot: &Mutex<Option<TxError>>) -> Result<(), TxError> {
        match slot.lock().take() {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    pub fn fail_edit(&self, error: TxError) {
        *self.edit_error.lock() = Some(error);
    }

    pub fn fail_save(&self, error: TxError) {
        *self.save_error.lock() = Some(error);
    }

    pub fn fail_validate(&self, error: TxError) {
        *self.validate_error.lock() = Some(error);
    }

    pub fn fail_create(&self, error: TxError) {
        *self.create_error.lock() = Some(error);
    }

    pub fn fail_cancel(&self, error: TxError) {
        *self.cancel_error.lock() = Some(error);
    }

    pub fn fail_delete(&self, error: TxError) {
        *self.delete_error.lock() = Some(error);
    }

    pub fn fail_action(&self, error: TxError) {
        *self.action_error.lock() = Some(error);
    }

    pub fn set_sticky_token(&self, token: impl Into<String>) {
        *self.sticky_token.lock() = Some(token.into());
    }

    pub fn set_action_context(&self, context: DocumentContext) {
        *self.action_context.lock() = Some(context);
    }

    pub fn set_cancel_sibling(&self, context: DocumentContext) {
        *self.cancel_sibling.lock() = Some(context);
    }
}

#[async_trait]
impl TransactionService for FakeTransactionService {
    async fn edit_document(&self, context: &DocumentContext) -> Result<EditResult, TxError> {
        self.record("edit_document");
        self.take(&self.edit_error)?;
        let mut editable = context.clone();
        editable.flags = DocumentFlags::draft_of_active();
        Ok(EditResult {
            context: editable,
            sticky_session_token: self.sticky_token.lock().clone(),
        })
    }

    async fn create_document(
        &self,
        target: &DocPath,
        data: &Map<String, Value>,
    ) -> Result<DocumentContext, TxError> {
        self.record("create_document");
        self.take(&self.create_error)?;
        let n = self.create_counter.fetch_add(1, Ordering::SeqCst) + 1;
        let entity_set = target.last().unwrap_or("Entity").to_string();
        let path = match target.parent() {
            Some(parent) => parent.child(format!("{entity_set}({n})")),
            None => DocPath::single(format!("{entity_set}({n})")),
        };
        let mut context = DocumentContext::new(path, entity_set)
            .with_flags(DocumentFlags::new_draft());
        context.properties = data.clone();
        Ok(context)
    }

    async fn save_document(
        &self,
        context: &DocumentContext,
    ) -> Result<DocumentContext, TxError> {
        self.record("save_document");
        self.take(&self.save_error)?;
        let mut saved = context.clone();
        saved.flags = DocumentFlags::active();
        Ok(saved)
    }

    async fn cancel_document(
        &self,
        _context: &DocumentContext,
    ) -> Result<Option<DocumentContext>, TxError> {
        self.record("cancel_document");
        self.take(&self.cancel_error)?;
        Ok(self.cancel_sibling.lock().clone())
    }

    async fn delete_document(&self, context: &DocumentContext) -> Result<(), TxError> {
        self.record(format!("delete_document:{}", context.path));
        self.take(&self.delete_error)
    }

    async fn call_action(
        &self,
        name: &str,
        bound_to: Option<&DocumentContext>,
        _parameters: &Map<String, Value>,
    ) -> Result<ActionResponse, TxError> {
        let binding = if bound_to.is_some() { "bound" } else { "unbound" };
        self.record(format!("call_action:{name}:{binding}"));
        self.take(&self.action_error)?;
        Ok(ActionResponse {
            context: self.action_context.lock().clone(),
        })
    }

    async fn validate_document(&self, _context: &DocumentContext) -> Result<(), TxError> {
        self.record("validate_document");
        self.take(&self.validate_error)
    }

    async fn submit_pending_changes(&self) -> Result<(), TxError> {
        self.record("submit_pending_changes");
        Ok(())
    }
}

/// A navigation call recorded by [`FakeNavigationListener`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavCall {
    To(String),
    Forward(String),
    Back(String),
    BackFromTransient,
    MessagePage(String),
    External(String),
}

/// Navigation listener recording every call
#[derive(Default)]
pub struct FakeNavigationListener {
    calls: Mutex<Vec<NavCall>>,
}

impl FakeNavigationListener {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// All recorded navigation calls, in order
    #[must_use]
    pub fn calls(&self) -> Vec<NavCall> {
        self.calls.lock().clone()
    }
}

#[async_trait]
impl NavigationListener for FakeNavigationListener {
    async fn navigate_to_context(&self, context: &DocumentContext) -> Result<(), TxError> {
        self.calls.lock().push(NavCall::To(context.path.to_string()));
        Ok(())
    }

    async fn navigate_forward_to_context(
        &self,
        context: &DocumentContext,
    ) -> Result<(), TxError> {
        self.calls
            .lock()
            .push(NavCall::Forward(context.path.to_string()));
        Ok(())
    }

    async fn navigate_back_from_context(
        &self,
        context: &DocumentContext,
    ) -> Result<(), TxError> {
        self.calls.lock().push(NavCall::Back(context.path.to_string()));
        Ok(())
    }

    async fn navigate_back_from_transient_state(&self) -> Result<(), TxError> {
        self.calls.lock().push(NavCall::BackFromTransient);
        Ok(())
    }

    async fn navigate_to_message_page(&self, message: &str) -> Result<(), TxError> {
        self.calls
            .lock()
            .push(NavCall::MessagePage(message.to_string()));
        Ok(())
    }

    async fn navigate_external(
        &self,
        outbound: &str,
        _parameters: &Map<String, Value>,
    ) -> Result<(), TxError> {
        self.calls
            .lock()
            .push(NavCall::External(outbound.to_string()));
        Ok(())
    }
}

/// Message handler counting surface interactions
#[derive(Default)]
pub struct FakeMessageHandler {
    dialogs: AtomicUsize,
    shown: AtomicUsize,
    removed: AtomicUsize,
}

impl FakeMessageHandler {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn dialogs_shown(&self) -> usize {
        self.dialogs.load(Ordering::SeqCst)
    }

    #[must_use]
    pub fn messages_shown(&self) -> usize {
        self.shown.load(Ordering::SeqCst)
    }

    #[must_use]
    pub fn transitions_removed(&self) -> usize {
        self.removed.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MessageHandler for FakeMessageHandler {
    async fn show_message_dialog(&self) {
        self.dialogs.fetch_add(1, Ordering::SeqCst);
    }

    async fn show_messages(&self) {
        self.shown.fetch_add(1, Ordering::SeqCst);
    }

    fn remove_transition_messages(&self) {
        self.removed.fetch_add(1, Ordering::SeqCst);
    }
}

/// Collaboration service recording shares and activities
#[derive(Default)]
pub struct FakeCollaborationService {
    connected: AtomicBool,
    shares: Mutex<Vec<String>>,
    activities: Mutex<Vec<(ActivityKind, String)>>,
}

impl FakeCollaborationService {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Connected variant
    #[must_use]
    pub fn connected() -> Self {
        let service = Self::default();
        service.connected.store(true, Ordering::SeqCst);
        service
    }

    pub fn set_connected(&self, connected: bool) {
        self.connected.store(connected, Ordering::SeqCst);
    }

    /// Paths shared with collaborators, in order
    #[must_use]
    pub fn shares(&self) -> Vec<String> {
        self.shares.lock().clone()
    }

    /// Activities broadcast, in order
    #[must_use]
    pub fn activities(&self) -> Vec<(ActivityKind, String)> {
        self.activities.lock().clone()
    }
}

#[async_trait]
impl CollaborationService for FakeCollaborationService {
    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    async fn share(&self, context: &DocumentContext) -> Result<(), TxError> {
        self.shares.lock().push(context.path.to_string());
        Ok(())
    }

    async fn send_activity(
        &self,
        kind: ActivityKind,
        context: &DocumentContext,
    ) -> Result<(), TxError> {
        self.activities.lock().push((kind, context.path.to_string()));
        Ok(())
    }
}

/// Scriptable entity metadata
#[derive(Default)]
pub struct FakeActionMetadata {
    bound_actions: Mutex<HashSet<(String, String)>>,
    creation_actions: Mutex<HashMap<String, String>>,
    mandatory_fields: Mutex<HashMap<String, Vec<String>>>,
}

impl FakeActionMetadata {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare `action` as bound to `entity_type`
    pub fn bind_action(&self, action: impl Into<String>, entity_type: impl Into<String>) {
        self.bound_actions
            .lock()
            .insert((action.into(), entity_type.into()));
    }

    pub fn set_creation_action(&self, entity_set: impl Into<String>, action: impl Into<String>) {
        self.creation_actions
            .lock()
            .insert(entity_set.into(), action.into());
    }

    pub fn set_mandatory_key_fields(&self, entity_set: impl Into<String>, fields: Vec<String>) {
        self.mandatory_fields
            .lock()
            .insert(entity_set.into(), fields);
    }
}

impl ActionMetadata for FakeActionMetadata {
    fn is_bound(&self, action: &str, entity_type: &str) -> bool {
        self.bound_actions
            .lock()
            .contains(&(action.to_string(), entity_type.to_string()))
    }

    fn creation_action(&self, entity_set: &str) -> Option<String> {
        self.creation_actions.lock().get(entity_set).cloned()
    }

    fn mandatory_key_fields(&self, entity_set: &str) -> Vec<String> {
        self.mandatory_fields
            .lock()
            .get(entity_set)
            .cloned()
            .unwrap_or_default()
    }
}

/// List binding over an in-memory entry vector
#[derive(Default)]
pub struct FakeListBinding {
    entries: Mutex<Vec<DocumentContext>>,
    swaps: Mutex<Vec<(String, String)>>,
    refreshes: AtomicUsize,
}

impl FakeListBinding {
    #[must_use]
    pub fn new(entries: Vec<DocumentContext>) -> Self {
        Self {
            entries: Mutex::new(entries),
            swaps: Mutex::new(Vec::new()),
            refreshes: AtomicUsize::new(0),
        }
    }

    /// Recorded (old, new) swap pairs
    #[must_use]
    pub fn swaps(&self) -> Vec<(String, String)> {
        self.swaps.lock().clone()
    }

    #[must_use]
    pub fn refresh_count(&self) -> usize {
        self.refreshes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ListBinding for FakeListBinding {
    fn contexts(&self) -> Vec<DocumentContext> {
        self.entries.lock().clone()
    }

    async fn swap_entry(
        &self,
        old: &DocumentContext,
        new: &DocumentContext,
    ) -> Result<(), TxError> {
        let mut entries = self.entries.lock();
        if let Some(entry) = entries.iter_mut().find(|e| e.path == old.path) {
            *entry = new.clone();
        }
        self.swaps
            .lock()
            .push((old.path.to_string(), new.path.to_string()));
        Ok(())
    }

    async fn refresh(&self) -> Result<(), TxError> {
        self.refreshes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Draft sibling algorithm backed by scripted lookups
///
/// Unscripted roots resolve to no sibling; unscripted segments map to
/// themselves.
#[derive(Default)]
pub struct FakeDraftSiblingAlgorithm {
    sibling_roots: Mutex<HashMap<String, DocumentContext>>,
    segment_map: Mutex<HashMap<String, String>>,
}

impl FakeDraftSiblingAlgorithm {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_sibling_root(&self, root_path: impl Into<String>, sibling: DocumentContext) {
        self.sibling_roots.lock().insert(root_path.into(), sibling);
    }

    pub fn map_segment_as(&self, from: impl Into<String>, to: impl Into<String>) {
        self.segment_map.lock().insert(from.into(), to.into());
    }
}

#[async_trait]
impl DraftSiblingAlgorithm for FakeDraftSiblingAlgorithm {
    async fn sibling_root(
        &self,
        root: &DocumentContext,
    ) -> Result<Option<DocumentContext>, LifecycleError> {
        Ok(self.sibling_roots.lock().get(&root.path.to_string()).cloned())
    }

    async fn map_segment(
        &self,
        _sibling_parent: &DocPath,
        segment: &str,
    ) -> Result<String, LifecycleError> {
        Ok(self
            .segment_map
            .lock()
            .get(segment)
            .cloned()
            .unwrap_or_else(|| segment.to_string()))
    }
}
