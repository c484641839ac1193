//! Testing utilities for the docflow workspace
//!
//! Shared in-memory fakes for every collaborator trait, plus fixture
//! builders for contexts and payloads.

#![allow(missing_docs)]

pub mod navigation;
pub mod transaction;

pub use navigation::{FakeAppStateService, FakeShellServices};
pub use transaction::{
    FakeActionMetadata, FakeCollaborationService, FakeDraftSiblingAlgorithm, FakeListBinding,
    FakeMessageHandler, FakeNavigationListener, FakeTransactionService, NavCall,
};

use docflow_model::{DocPath, DocumentContext, DocumentFlags};
use docflow_navigation::SemanticPayload;
use docflow_transaction::FlowServices;
use std::str::FromStr;
use std::sync::Arc;

/// Active document context at `path`
#[must_use]
pub fn active_context(path: &str) -> DocumentContext {
    DocumentContext::new(DocPath::from_str(path).unwrap(), entity_set_of(path))
        .with_flags(DocumentFlags::active())
}

/// Draft context (with an active sibling) at `path`
#[must_use]
pub fn draft_context(path: &str) -> DocumentContext {
    DocumentContext::new(DocPath::from_str(path).unwrap(), entity_set_of(path))
        .with_flags(DocumentFlags::draft_of_active())
}

/// New draft context (no active sibling yet) at `path`
#[must_use]
pub fn new_draft_context(path: &str) -> DocumentContext {
    DocumentContext::new(DocPath::from_str(path).unwrap(), entity_set_of(path))
        .with_flags(DocumentFlags::new_draft())
}

fn entity_set_of(path: &str) -> String {
    let last = path.rsplit('/').next().unwrap_or(path);
    last.split('(').next().unwrap_or(last).to_string()
}

/// Payload over a fixed list of semantic objects
#[must_use]
pub fn payload_with_objects(semantic_objects: &[&str]) -> SemanticPayload {
    SemanticPayload::new(
        semantic_objects.iter().map(|s| (*s).to_string()).collect(),
        "com.example.EntityType",
    )
}

/// Handles to the individual fakes bundled into a [`FlowServices`]
pub struct FakeServiceHandles {
    pub transaction: Arc<FakeTransactionService>,
    pub navigation: Arc<FakeNavigationListener>,
    pub messages: Arc<FakeMessageHandler>,
    pub collaboration: Arc<FakeCollaborationService>,
    pub metadata: Arc<FakeActionMetadata>,
    pub draft_sibling: Arc<FakeDraftSiblingAlgorithm>,
}

/// Build a [`FlowServices`] bundle over fresh fakes, keeping the handles
#[must_use]
pub fn fake_flow_services() -> (FlowServices, FakeServiceHandles) {
    let handles = FakeServiceHandles {
        transaction: Arc::new(FakeTransactionService::new()),
        navigation: Arc::new(FakeNavigationListener::new()),
        messages: Arc::new(FakeMessageHandler::new()),
        collaboration: Arc::new(FakeCollaborationService::new()),
        metadata: Arc::new(FakeActionMetadata::new()),
        draft_sibling: Arc::new(FakeDraftSiblingAlgorithm::new()),
    };
    let services = FlowServices {
        transaction: handles.transaction.clone(),
        navigation: handles.navigation.clone(),
        messages: handles.messages.clone(),
        collaboration: handles.collaboration.clone(),
        metadata: handles.metadata.clone(),
        draft_sibling: handles.draft_sibling.clone(),
    };
    (services, handles)
}
