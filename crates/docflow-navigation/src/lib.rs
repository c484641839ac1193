//! docflow navigation
//!
//! Semantic navigation resolution:
//! - Declarative semantic-object payloads with dynamic name resolution
//! - Attribute mapping with per-object rename rules
//! - Shell link queries, unavailable-action filtering, ranking
//! - Title-link deduplication and app-state parameter enrichment
//!
//! The shell and app-state services are consumed behind traits; their
//! absence degrades resolution to an empty result instead of failing.

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod error;
pub mod info_log;
pub mod resolver;
pub mod services;
pub mod types;

// Re-exports for convenience
pub use error::NavError;
pub use info_log::{InfoEntry, InfoLevel, InfoLog};
pub use resolver::{set_object_mappings, LinkResolver, LinkResolverConfig, ObjectMappings};
pub use services::{AppStateEntry, AppStateService, ShellServices};
pub use types::{
    Intent, IntentParseError, LinkItem, LinkQuery, MappingItem, ResolvedTargets, SelectionVariant,
    SemanticObjectMapping, SemanticObjectUnavailableActions, SemanticPayload, ShellLink,
};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
