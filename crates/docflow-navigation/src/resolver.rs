//! Semantic link resolution
//!
//! Turns a declarative semantic-object payload plus a bound context into a
//! ranked list of navigation targets: placeholder resolution, attribute
//! mapping, shell queries, unavailable-action filtering, own-navigation
//! exclusion, ranking, title-link deduplication and app-state enrichment.

use crate::error::NavError;
use crate::info_log::{log_to, InfoLevel, InfoLog};
use crate::services::{AppStateEntry, AppStateService, ShellServices};
use crate::types::{
    Intent, LinkItem, LinkQuery, ResolvedTargets, SelectionVariant, SemanticObjectMapping,
    SemanticPayload,
};
use dashmap::DashMap;
use docflow_model::DocumentContext;
use indexmap::IndexMap;
use parking_lot::Mutex;
use serde_json::{Map, Value};
use std::sync::Arc;

/// URL parameter carrying the persisted app-state key
const APP_STATE_PARAM: &str = "sap-xapp-state";

/// Cache key for the default app-state entry (unchanged selection variant)
const DEFAULT_CACHE_KEY: &str = "";

/// Resolver tuning
#[derive(Debug, Clone, Copy)]
pub struct LinkResolverConfig {
    /// Links shown without expanding the "more links" section
    pub visible_link_count: usize,
}

impl Default for LinkResolverConfig {
    fn default() -> Self {
        Self {
            visible_link_count: 3,
        }
    }
}

/// Result of applying rename rules to one link's parameters
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectMappings {
    /// Parameters after renames
    pub parameters: IndexMap<String, String>,
    /// Selection variant after the same renames
    pub selection_variant: SelectionVariant,
    /// Whether any rename actually applied
    pub has_changed: bool,
}

/// Apply the rename rules of `semantic_object` to URL parameters and the
/// selection variant
///
/// Renamed source keys are removed; the later write wins on a target clash.
#[must_use]
pub fn set_object_mappings(
    semantic_object: &str,
    parameters: &IndexMap<String, String>,
    mappings: &[SemanticObjectMapping],
    selection_variant: &SelectionVariant,
) -> ObjectMappings {
    let items = mappings
        .iter()
        .find(|m| m.semantic_object == semantic_object)
        .map(|m| m.items.as_slice())
        .unwrap_or(&[]);

    let mut parameters = parameters.clone();
    let mut selection_variant = selection_variant.clone();
    let mut has_changed = false;

    for item in items {
        if let Some(value) = parameters.shift_remove(&item.key) {
            parameters.insert(item.value.clone(), value);
            has_changed = true;
        }
        if let Some(value) = selection_variant.parameters.shift_remove(&item.key) {
            selection_variant.parameters.insert(item.value.clone(), value);
            has_changed = true;
        }
    }

    ObjectMappings {
        parameters,
        selection_variant,
        has_changed,
    }
}

/// Resolves navigation targets for semantic-object payloads
///
/// Failure philosophy: a missing shell, an empty payload or an empty result
/// set resolve to `None`/empty rather than erroring; genuine service
/// failures are logged and degrade to an empty actionable list so the
/// popover still opens.
pub struct LinkResolver {
    shell: Arc<dyn ShellServices>,
    app_state: Arc<dyn AppStateService>,
    config: LinkResolverConfig,
    app_state_cache: DashMap<String, AppStateEntry>,
    title_href: Mutex<Option<String>>,
}

impl LinkResolver {
    /// Create a resolver over the given shell and app-state services
    #[must_use]
    pub fn new(shell: Arc<dyn ShellServices>, app_state: Arc<dyn AppStateService>) -> Self {
        Self {
            shell,
            app_state,
            config: LinkResolverConfig::default(),
            app_state_cache: DashMap::new(),
            title_href: Mutex::new(None),
        }
    }

    /// With custom tuning
    #[must_use]
    pub fn with_config(mut self, config: LinkResolverConfig) -> Self {
        self.config = config;
        self
    }

    /// Resolved href of the deduplicated title link, if one was cached
    #[must_use]
    pub fn cached_title_href(&self) -> Option<String> {
        self.title_href.lock().clone()
    }

    /// Substitute dynamic `{propertyPath}` semantic-object names against the
    /// control's custom data
    ///
    /// Unresolvable names are dropped and logged, not errored.
    #[must_use]
    pub fn resolve_payload(
        payload: &SemanticPayload,
        custom_data: &Map<String, Value>,
        info_log: Option<&InfoLog>,
    ) -> SemanticPayload {
        let substitute = |name: &str| -> Option<String> {
            let Some(path) = name.strip_prefix('{').and_then(|n| n.strip_suffix('}')) else {
                return Some(name.to_string());
            };
            match custom_data.get(path) {
                Some(Value::String(resolved)) if !resolved.is_empty() => {
                    Some(resolved.clone())
                }
                _ => {
                    log_to(
                        info_log,
                        InfoLevel::Warning,
                        format!("dynamic semantic object '{name}' not resolvable"),
                    );
                    tracing::debug!(name, "dynamic semantic object not resolvable");
                    None
                }
            }
        };

        let mut concrete = payload.clone();
        concrete.semantic_objects = payload
            .semantic_objects
            .iter()
            .filter_map(|name| substitute(name))
            .collect();
        concrete.main_semantic_object = payload
            .main_semantic_object
            .as_deref()
            .and_then(|name| substitute(name));
        for mapping in &mut concrete.semantic_object_mappings {
            if let Some(resolved) = substitute(&mapping.semantic_object) {
                mapping.semantic_object = resolved;
            }
        }
        for unavailable in &mut concrete.semantic_object_unavailable_actions {
            if let Some(resolved) = substitute(&unavailable.semantic_object) {
                unavailable.semantic_object = resolved;
            }
        }
        concrete
    }

    /// Build the attribute map for one semantic object from the bound
    /// context's properties
    ///
    /// Null values are dropped, plain nested objects are excluded (logged),
    /// and rename rules are applied with later-write-wins clash semantics.
    #[must_use]
    pub fn attribute_map(
        semantic_object: &str,
        payload: &SemanticPayload,
        context: &DocumentContext,
        info_log: Option<&InfoLog>,
    ) -> IndexMap<String, Value> {
        let mut attributes: IndexMap<String, Value> = IndexMap::new();
        for (name, value) in &context.properties {
            match value {
                Value::Null => {}
                Value::Object(_) | Value::Array(_) => {
                    log_to(
                        info_log,
                        InfoLevel::Info,
                        format!("attribute '{name}' excluded: plain nested object"),
                    );
                }
                _ => {
                    attributes.insert(name.clone(), value.clone());
                }
            }
        }

        for item in payload.mappings_for(semantic_object) {
            let Some(value) = attributes.shift_remove(&item.key) else {
                continue;
            };
            if attributes.contains_key(&item.value) {
                log_to(
                    info_log,
                    InfoLevel::Error,
                    format!(
                        "mapping clash on '{}': attributes '{}' and existing value both target it",
                        item.value, item.key
                    ),
                );
                tracing::error!(
                    target_attribute = %item.value,
                    source_attribute = %item.key,
                    "attribute mapping clash, later write wins"
                );
            }
            attributes.insert(item.value.clone(), value);
        }

        attributes
    }

    /// Query the shell and partition results into offered actions and the
    /// own-navigation entry
    ///
    /// Both collections are returned together; unavailable actions are
    /// filtered per semantic object and ranking marks the initially visible
    /// subset.
    pub async fn resolve_targets(
        &self,
        payload: &SemanticPayload,
        context: &DocumentContext,
        info_log: Option<&InfoLog>,
    ) -> Result<ResolvedTargets, NavError> {
        let queries: Vec<LinkQuery> = payload
            .semantic_objects
            .iter()
            .map(|semantic_object| LinkQuery {
                semantic_object: semantic_object.clone(),
                parameters: Self::attribute_map(semantic_object, payload, context, info_log),
            })
            .collect();

        let results = self.shell.get_links(&queries).await?;
        let own_target = self.shell.current_app_target();

        let mut candidates: Vec<(LinkItem, bool)> = Vec::new();
        let mut own_navigation = None;

        for (query, links) in queries.iter().zip(results) {
            let unavailable = payload.unavailable_actions_for(&query.semantic_object);
            for link in links {
                let intent: Intent = match link.intent.parse() {
                    Ok(intent) => intent,
                    Err(e) => {
                        log_to(info_log, InfoLevel::Warning, e.to_string());
                        continue;
                    }
                };

                if unavailable.iter().any(|action| action == &intent.action) {
                    log_to(
                        info_log,
                        InfoLevel::Info,
                        format!("action '{}' unavailable for '{}'", intent.action, query.semantic_object),
                    );
                    continue;
                }

                let item = LinkItem {
                    key: intent.target(),
                    text: link.text.clone(),
                    href: link.intent.clone(),
                    initially_visible: false,
                };

                if intent.target() == own_target {
                    // The running app itself; never offered as an action
                    own_navigation = Some(item);
                    continue;
                }

                candidates.push((item, link.is_superior()));
            }
        }

        Ok(ResolvedTargets {
            available_actions: self.rank(candidates),
            own_navigation,
        })
    }

    /// Rank candidates: superior actions are initially visible; with none
    /// tagged, the first N in discovery order are shown
    fn rank(&self, candidates: Vec<(LinkItem, bool)>) -> Vec<LinkItem> {
        let any_superior = candidates.iter().any(|(_, superior)| *superior);
        candidates
            .into_iter()
            .enumerate()
            .map(|(index, (mut item, superior))| {
                item.initially_visible = if any_superior {
                    superior
                } else {
                    index < self.config.visible_link_count
                };
                item
            })
            .collect()
    }

    /// Resolve link items for a payload and bound context
    ///
    /// Returns `None` when the shell is absent or no semantic object
    /// resolves; service failures degrade to an empty list.
    pub async fn fetch_link_items(
        &self,
        payload: &SemanticPayload,
        context: &DocumentContext,
        custom_data: &Map<String, Value>,
        info_log: Option<&InfoLog>,
    ) -> Result<Option<Vec<LinkItem>>, NavError> {
        if !self.shell.is_available() {
            log_to(info_log, InfoLevel::Info, "shell services unavailable");
            tracing::debug!("shell services unavailable, no links resolved");
            return Ok(None);
        }

        let concrete = Self::resolve_payload(payload, custom_data, info_log);
        if concrete.semantic_objects.is_empty() {
            log_to(info_log, InfoLevel::Info, "no semantic objects on payload");
            return Ok(None);
        }

        match self.resolve_targets(&concrete, context, info_log).await {
            Ok(targets) => {
                if targets.available_actions.is_empty() && targets.own_navigation.is_none() {
                    return Ok(None);
                }
                Ok(Some(targets.available_actions))
            }
            Err(e) => {
                log_to(info_log, InfoLevel::Error, e.to_string());
                tracing::warn!(error = %e, "link resolution degraded to empty list");
                Ok(Some(Vec::new()))
            }
        }
    }

    /// Remove the resolved item duplicating the title link
    ///
    /// Matching ignores query parameters; the removed item's href is cached
    /// so the title control can reuse it.
    #[must_use]
    pub fn modify_link_items(
        &self,
        links: Vec<LinkItem>,
        title_intent: &Intent,
        info_log: Option<&InfoLog>,
    ) -> Vec<LinkItem> {
        let mut out = Vec::with_capacity(links.len());
        for item in links {
            if let Ok(intent) = item.href.parse::<Intent>() {
                if intent.same_target(title_intent) {
                    log_to(
                        info_log,
                        InfoLevel::Info,
                        format!("'{}' removed: duplicates the title link", item.key),
                    );
                    *self.title_href.lock() = Some(item.href.clone());
                    continue;
                }
            }
            out.push(item);
        }
        out
    }

    /// Enrich link parameters with rename rules and a persisted app state
    ///
    /// The app-state key is cached per semantic object; when the selection
    /// variant is unchanged the shared default entry is reused.
    pub async fn enrich_link_parameters(
        &self,
        links: Vec<LinkItem>,
        payload: &SemanticPayload,
        context: &DocumentContext,
        selection_variant: &SelectionVariant,
    ) -> Result<Vec<LinkItem>, NavError> {
        let mixed = self
            .app_state
            .mix_attributes_and_selection_variant(&context.properties, selection_variant);

        let mut out = Vec::with_capacity(links.len());
        for mut item in links {
            let Ok(mut intent) = item.href.parse::<Intent>() else {
                out.push(item);
                continue;
            };

            let mapped = set_object_mappings(
                &intent.semantic_object,
                &intent.parameters,
                &payload.semantic_object_mappings,
                &mixed,
            );

            let cache_key = if mapped.has_changed {
                intent.semantic_object.clone()
            } else {
                DEFAULT_CACHE_KEY.to_string()
            };
            let entry = match self.app_state_cache.get(&cache_key) {
                Some(entry) => entry.clone(),
                None => {
                    let entry = self
                        .app_state
                        .app_state_key_and_url_parameters(&mapped.selection_variant)
                        .await?;
                    self.app_state_cache.insert(cache_key, entry.clone());
                    entry
                }
            };

            intent.parameters = mapped.parameters;
            for (key, value) in &entry.url_parameters {
                intent.parameters.insert(key.clone(), value.clone());
            }
            intent
                .parameters
                .insert(APP_STATE_PARAM.to_string(), entry.key.clone());

            item.href = intent.to_string();
            out.push(item);
        }

        Ok(out)
    }

    /// Full resolution pipeline: fetch, title-link dedup, enrichment
    ///
    /// `title_hash` may be compact; it is expanded through the shell before
    /// comparison. Enrichment failures are logged and leave hrefs untouched.
    pub async fn resolve(
        &self,
        payload: &SemanticPayload,
        context: &DocumentContext,
        custom_data: &Map<String, Value>,
        title_hash: Option<&str>,
        selection_variant: &SelectionVariant,
        info_log: Option<&InfoLog>,
    ) -> Result<Option<Vec<LinkItem>>, NavError> {
        let Some(mut links) = self
            .fetch_link_items(payload, context, custom_data, info_log)
            .await?
        else {
            return Ok(None);
        };

        if let Some(title_hash) = title_hash {
            let expanded = match self.shell.expand_compact_hash(title_hash).await {
                Ok(expanded) => expanded,
                Err(e) => {
                    log_to(info_log, InfoLevel::Warning, e.to_string());
                    title_hash.to_string()
                }
            };
            match expanded.parse::<Intent>() {
                Ok(title_intent) => {
                    links = self.modify_link_items(links, &title_intent, info_log);
                }
                Err(e) => log_to(info_log, InfoLevel::Warning, e.to_string()),
            }
        }

        match self
            .enrich_link_parameters(links.clone(), payload, context, selection_variant)
            .await
        {
            Ok(enriched) => Ok(Some(enriched)),
            Err(e) => {
                log_to(info_log, InfoLevel::Error, e.to_string());
                tracing::warn!(error = %e, "parameter enrichment failed, links left untouched");
                Ok(Some(links))
            }
        }
    }
}

impl std::fmt::Debug for LinkResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LinkResolver")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::MappingItem;

    #[test]
    fn object_mappings_rename_and_flag() {
        let mut parameters = IndexMap::new();
        parameters.insert("x".to_string(), "v1".to_string());
        let mappings = vec![SemanticObjectMapping {
            semantic_object: "SO1".to_string(),
            items: vec![MappingItem {
                key: "x".to_string(),
                value: "y".to_string(),
            }],
        }];

        let mapped = set_object_mappings("SO1", &parameters, &mappings, &SelectionVariant::new());

        assert_eq!(mapped.parameters.get("y").map(String::as_str), Some("v1"));
        assert!(!mapped.parameters.contains_key("x"));
        assert!(mapped.has_changed);
    }

    #[test]
    fn object_mappings_no_rule_is_unchanged() {
        let mut parameters = IndexMap::new();
        parameters.insert("a".to_string(), "1".to_string());

        let mapped = set_object_mappings("SO1", &parameters, &[], &SelectionVariant::new());

        assert_eq!(mapped.parameters.get("a").map(String::as_str), Some("1"));
        assert!(!mapped.has_changed);
    }

    #[test]
    fn object_mappings_rename_applies_to_selection_variant() {
        let selection_variant =
            SelectionVariant::new().with_parameter("x", serde_json::json!("sv"));
        let mappings = vec![SemanticObjectMapping {
            semantic_object: "SO1".to_string(),
            items: vec![MappingItem {
                key: "x".to_string(),
                value: "y".to_string(),
            }],
        }];

        let mapped = set_object_mappings("SO1", &IndexMap::new(), &mappings, &selection_variant);

        assert!(mapped.has_changed);
        assert_eq!(
            mapped.selection_variant.parameters.get("y"),
            Some(&serde_json::json!("sv"))
        );
        assert!(!mapped.selection_variant.parameters.contains_key("x"));
    }
}
