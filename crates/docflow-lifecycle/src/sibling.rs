//! Sibling context resolution
//!
//! Given a root document and a rightmost (possibly nested) context, computes
//! the corresponding sibling context after a draft/activate/discard
//! transition, together with a path-remapping table for navigation history.

use crate::error::LifecycleError;
use async_trait::async_trait;
use docflow_model::{
    DocPath, DocumentContext, PathMapping, ProgrammingModel, SiblingInformation,
};
use std::sync::Arc;

/// Draft-specific sibling algorithm (opaque collaborator)
///
/// The hosting data model owns the actual lookups; the resolver only drives
/// the walk from root to rightmost and assembles the remapping table.
#[async_trait]
pub trait DraftSiblingAlgorithm: Send + Sync {
    /// Sibling of the root document in the other lifecycle state
    ///
    /// Returns `None` when no sibling exists (e.g. a new draft that was
    /// never activated).
    async fn sibling_root(
        &self,
        root: &DocumentContext,
    ) -> Result<Option<DocumentContext>, LifecycleError>;

    /// Map one child segment into the sibling tree under `sibling_parent`
    ///
    /// Keys may differ between the draft and active trees; the returned
    /// segment addresses the equivalent child there.
    async fn map_segment(
        &self,
        sibling_parent: &DocPath,
        segment: &str,
    ) -> Result<String, LifecycleError>;
}

/// Computes sibling contexts and path remappings
#[derive(Clone)]
pub struct SiblingResolver {
    draft_algorithm: Arc<dyn DraftSiblingAlgorithm>,
}

impl SiblingResolver {
    /// Create a resolver delegating draft lookups to `draft_algorithm`
    #[must_use]
    pub fn new(draft_algorithm: Arc<dyn DraftSiblingAlgorithm>) -> Self {
        Self { draft_algorithm }
    }

    /// Compute the sibling of `rightmost` relative to `root`
    ///
    /// # Preconditions
    /// `rightmost.path` must be nested under `root.path`; violation is a
    /// caller bug and returns [`LifecycleError::PathNotNested`].
    ///
    /// # Returns
    /// - `Ok(None)` if `skip_if_same` is set and the paths are equal, or if
    ///   no sibling document exists
    /// - `Ok(Some(info))` with the target context and the remapping table
    pub async fn compute_sibling_information(
        &self,
        root: &DocumentContext,
        rightmost: &DocumentContext,
        programming_model: ProgrammingModel,
        skip_if_same: bool,
    ) -> Result<Option<SiblingInformation>, LifecycleError> {
        let Ok(suffix) = rightmost.path.relative_to(&root.path) else {
            return Err(LifecycleError::PathNotNested {
                root: root.path.to_string(),
                rightmost: rightmost.path.to_string(),
            });
        };

        if skip_if_same && root.path == rightmost.path {
            return Ok(None);
        }

        match programming_model {
            ProgrammingModel::Draft => self.resolve_through_draft(root, rightmost, &suffix).await,
            ProgrammingModel::Sticky | ProgrammingModel::NoDraftSupport => {
                // Same technical path on both sides of the transition;
                // rebinding the rightmost context is sufficient.
                Ok(Some(SiblingInformation {
                    target: rightmost.clone(),
                    path_mapping: Vec::new(),
                }))
            }
        }
    }

    /// Walk from root to rightmost through the sibling document
    async fn resolve_through_draft(
        &self,
        root: &DocumentContext,
        rightmost: &DocumentContext,
        suffix: &DocPath,
    ) -> Result<Option<SiblingInformation>, LifecycleError> {
        let Some(sibling_root) = self.draft_algorithm.sibling_root(root).await? else {
            tracing::debug!(root = %root.path, "no sibling document");
            return Ok(None);
        };

        let mut path_mapping = vec![PathMapping {
            old_path: root.path.clone(),
            new_path: sibling_root.path.clone(),
        }];

        let mut old_path = root.path.clone();
        let mut new_path = sibling_root.path.clone();
        for segment in suffix.iter() {
            let mapped = self.draft_algorithm.map_segment(&new_path, segment).await?;
            old_path = old_path.child(segment);
            new_path = new_path.child(mapped);
            path_mapping.push(PathMapping {
                old_path: old_path.clone(),
                new_path: new_path.clone(),
            });
        }

        let target = DocumentContext {
            path: new_path,
            entity_set: rightmost.entity_set.clone(),
            entity_type: rightmost.entity_type.clone(),
            flags: sibling_root.flags,
            keys: rightmost.keys.clone(),
            properties: Default::default(),
        };

        tracing::debug!(
            root = %root.path,
            target = %target.path,
            mappings = path_mapping.len(),
            "sibling resolved"
        );

        Ok(Some(SiblingInformation {
            target,
            path_mapping,
        }))
    }
}

/// Remap a history path through a mapping table
///
/// Applies the longest-prefix mapping entry; paths outside every mapped
/// prefix are returned unchanged. Used when rewriting navigation history
/// after a lifecycle transition.
#[must_use]
pub fn remap_path(path: &DocPath, mapping: &[PathMapping]) -> DocPath {
    mapping
        .iter()
        .filter_map(|m| {
            let rebased = path.rebase(&m.old_path, &m.new_path).ok()?;
            Some((m.old_path.len(), rebased))
        })
        .max_by_key(|(depth, _)| *depth)
        .map(|(_, rebased)| rebased)
        .unwrap_or_else(|| path.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    struct KeyShiftAlgorithm;

    #[async_trait]
    impl DraftSiblingAlgorithm for KeyShiftAlgorithm {
        async fn sibling_root(
            &self,
            root: &DocumentContext,
        ) -> Result<Option<DocumentContext>, LifecycleError> {
            let path = DocPath::from_str("SalesOrder(active-1)").unwrap();
            Ok(Some(DocumentContext {
                path,
                flags: docflow_model::DocumentFlags::active(),
                ..root.clone()
            }))
        }

        async fn map_segment(
            &self,
            _sibling_parent: &DocPath,
            segment: &str,
        ) -> Result<String, LifecycleError> {
            Ok(format!("mapped-{segment}"))
        }
    }

    fn ctx(path: &str) -> DocumentContext {
        DocumentContext::new(DocPath::from_str(path).unwrap(), "SalesOrder")
    }

    #[tokio::test]
    async fn non_nested_paths_are_a_caller_bug() {
        let resolver = SiblingResolver::new(Arc::new(KeyShiftAlgorithm));
        let err = resolver
            .compute_sibling_information(
                &ctx("SalesOrder(1)"),
                &ctx("Customer(2)"),
                ProgrammingModel::Draft,
                false,
            )
            .await
            .unwrap_err();
        assert!(err.is_caller_bug());
    }

    #[tokio::test]
    async fn equal_paths_skip() {
        let resolver = SiblingResolver::new(Arc::new(KeyShiftAlgorithm));
        let result = resolver
            .compute_sibling_information(
                &ctx("SalesOrder(1)"),
                &ctx("SalesOrder(1)"),
                ProgrammingModel::Draft,
                true,
            )
            .await
            .unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn sticky_rebinds_rightmost_with_empty_mapping() {
        let resolver = SiblingResolver::new(Arc::new(KeyShiftAlgorithm));
        let rightmost = ctx("SalesOrder(1)/Items(2)");
        let info = resolver
            .compute_sibling_information(
                &ctx("SalesOrder(1)"),
                &rightmost,
                ProgrammingModel::Sticky,
                false,
            )
            .await
            .unwrap()
            .unwrap();
        assert_eq!(info.target.path, rightmost.path);
        assert!(info.path_mapping.is_empty());
    }

    #[tokio::test]
    async fn draft_maps_every_segment() {
        let resolver = SiblingResolver::new(Arc::new(KeyShiftAlgorithm));
        let info = resolver
            .compute_sibling_information(
                &ctx("SalesOrder(1)"),
                &ctx("SalesOrder(1)/Items(2)/Schedules(3)"),
                ProgrammingModel::Draft,
                false,
            )
            .await
            .unwrap()
            .unwrap();

        assert_eq!(
            info.target.path.to_string(),
            "SalesOrder(active-1)/mapped-Items(2)/mapped-Schedules(3)"
        );
        // One mapping per depth, root included
        assert_eq!(info.path_mapping.len(), 3);
        assert_eq!(
            info.path_mapping[1].new_path.to_string(),
            "SalesOrder(active-1)/mapped-Items(2)"
        );
    }

    #[test]
    fn remap_prefers_longest_prefix() {
        let mapping = vec![
            PathMapping {
                old_path: DocPath::from_str("SalesOrder(1)").unwrap(),
                new_path: DocPath::from_str("SalesOrder(9)").unwrap(),
            },
            PathMapping {
                old_path: DocPath::from_str("SalesOrder(1)/Items(2)").unwrap(),
                new_path: DocPath::from_str("SalesOrder(9)/Items(8)").unwrap(),
            },
        ];

        let remapped = remap_path(
            &DocPath::from_str("SalesOrder(1)/Items(2)/Schedules(3)").unwrap(),
            &mapping,
        );
        assert_eq!(remapped.to_string(), "SalesOrder(9)/Items(8)/Schedules(3)");

        let untouched = remap_path(&DocPath::from_str("Customer(5)").unwrap(), &mapping);
        assert_eq!(untouched.to_string(), "Customer(5)");
    }
}
