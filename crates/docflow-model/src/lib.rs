//! docflow model - core vocabulary
//!
//! Defines the fundamental types shared across the engine:
//! - Document data paths and their prefix algebra
//! - Document contexts with lifecycle flags
//! - Per-page session state and the programming-model discriminator
//! - Sibling-resolution result types

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod context;
pub mod path;
pub mod session;

// Re-exports for convenience
pub use context::{DocumentContext, DocumentFlags, PathMapping, SiblingInformation};
pub use path::{DocPath, PathError};
pub use session::{
    CreationMode, DraftStatus, EditMode, ProgrammingModel, SessionId, SessionState,
};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
