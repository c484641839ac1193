//! docflow transaction orchestrator
//!
//! Sequences edit/create/save/cancel/delete operations over business
//! documents:
//! - Serializes every mutating operation through a per-session task queue
//! - Guards user-triggered operations with a fail-fast busy lock
//! - Drives the lifecycle state machine and sibling resolution
//! - Delegates persistence, routing and messaging to collaborator traits
//!
//! # Example
//!
//! ```rust,ignore
//! use docflow_transaction::{DocumentFlow, FlowServices};
//! use docflow_model::ProgrammingModel;
//!
//! # async fn example(services: FlowServices) -> Result<(), Box<dyn std::error::Error>> {
//! let flow = DocumentFlow::new(ProgrammingModel::Draft, services);
//!
//! let editable = flow.edit_document(&context).await?;
//! let saved = flow.save_document(&editable.unwrap()).await?;
//! # Ok(())
//! # }
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod error;
pub mod flow;
pub mod hooks;
pub mod services;
pub mod sync;

// Re-exports for convenience
pub use error::TxError;
pub use flow::{
    CreateOutcome, CreateParams, DocumentFlow, FlowServices, InvokeActionParams,
    SecuredExecutionOptions,
};
pub use hooks::{Hook, LifecycleHooks};
pub use services::{
    ActionMetadata, ActionResponse, ActivityKind, CollaborationService, EditResult, ListBinding,
    MessageHandler, NavigationListener, TransactionService,
};
pub use sync::{BusyGuard, BusyLock, SyncTaskQueue};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
