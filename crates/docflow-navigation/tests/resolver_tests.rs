use docflow_navigation::{
    InfoLevel, InfoLog, Intent, LinkResolver, LinkResolverConfig, MappingItem, NavError,
    SelectionVariant, SemanticObjectMapping, SemanticObjectUnavailableActions, ShellLink,
};
use docflow_test_utils::{active_context, payload_with_objects, FakeAppStateService, FakeShellServices};
use pretty_assertions::assert_eq;
use serde_json::{json, Map};
use std::sync::Arc;

fn resolver() -> (LinkResolver, Arc<FakeShellServices>, Arc<FakeAppStateService>) {
    let shell = Arc::new(FakeShellServices::new());
    let app_state = Arc::new(FakeAppStateService::new());
    let resolver = LinkResolver::new(shell.clone(), app_state.clone());
    (resolver, shell, app_state)
}

#[tokio::test]
async fn attribute_map_drops_null_and_nested_values() {
    let (resolver, shell, _) = resolver();
    shell.set_links("SO1", vec![ShellLink::new("#SO1-display", "Display")]);

    let mut ctx = active_context("SalesOrder(1)");
    ctx.properties.insert("A".to_string(), json!(1));
    ctx.properties.insert("B".to_string(), json!(null));
    ctx.properties
        .insert("Nested".to_string(), json!({"x": 1}));

    let payload = payload_with_objects(&["SO1"]);
    let log = InfoLog::new();
    let links = resolver
        .fetch_link_items(&payload, &ctx, &Map::new(), Some(&log))
        .await
        .unwrap();
    assert!(links.is_some());

    // Exactly one query bucket for SO1, holding only the scalar attribute
    let queries = shell.recorded_queries();
    assert_eq!(queries.len(), 1);
    assert_eq!(queries[0].semantic_object, "SO1");
    assert_eq!(queries[0].parameters.get("A"), Some(&json!(1)));
    assert!(!queries[0].parameters.contains_key("B"));
    assert!(!queries[0].parameters.contains_key("Nested"));

    // The nested exclusion is diagnosed, not errored
    assert!(log.has_level(InfoLevel::Info));
}

#[tokio::test]
async fn mapping_renames_attributes_in_query() {
    let (resolver, shell, _) = resolver();
    shell.set_links("SO1", vec![ShellLink::new("#SO1-display", "Display")]);

    let mut ctx = active_context("SalesOrder(1)");
    ctx.properties.insert("x".to_string(), json!("v1"));

    let mut payload = payload_with_objects(&["SO1"]);
    payload.semantic_object_mappings = vec![SemanticObjectMapping {
        semantic_object: "SO1".to_string(),
        items: vec![MappingItem {
            key: "x".to_string(),
            value: "y".to_string(),
        }],
    }];

    resolver
        .fetch_link_items(&payload, &ctx, &Map::new(), None)
        .await
        .unwrap();

    let queries = shell.recorded_queries();
    assert_eq!(queries[0].parameters.get("y"), Some(&json!("v1")));
    assert!(!queries[0].parameters.contains_key("x"));
}

#[tokio::test]
async fn mapping_clash_logs_error_and_later_write_wins() {
    let (resolver, shell, _) = resolver();
    shell.set_links("SO1", vec![ShellLink::new("#SO1-display", "Display")]);

    let mut ctx = active_context("SalesOrder(1)");
    ctx.properties.insert("x".to_string(), json!("from-x"));
    ctx.properties.insert("y".to_string(), json!("plain-y"));

    let mut payload = payload_with_objects(&["SO1"]);
    payload.semantic_object_mappings = vec![SemanticObjectMapping {
        semantic_object: "SO1".to_string(),
        items: vec![MappingItem {
            key: "x".to_string(),
            value: "y".to_string(),
        }],
    }];

    let log = InfoLog::new();
    resolver
        .fetch_link_items(&payload, &ctx, &Map::new(), Some(&log))
        .await
        .unwrap();

    let queries = shell.recorded_queries();
    assert_eq!(queries[0].parameters.get("y"), Some(&json!("from-x")));
    assert!(log.has_level(InfoLevel::Error));
}

#[tokio::test]
async fn missing_shell_resolves_to_none() {
    let (resolver, shell, _) = resolver();
    shell.set_available(false);

    let result = resolver
        .fetch_link_items(
            &payload_with_objects(&["SO1"]),
            &active_context("SalesOrder(1)"),
            &Map::new(),
            None,
        )
        .await
        .unwrap();

    assert!(result.is_none());
}

#[tokio::test]
async fn empty_payload_resolves_to_none() {
    let (resolver, _, _) = resolver();

    let result = resolver
        .fetch_link_items(
            &payload_with_objects(&[]),
            &active_context("SalesOrder(1)"),
            &Map::new(),
            None,
        )
        .await
        .unwrap();

    assert!(result.is_none());
}

#[tokio::test]
async fn service_failure_degrades_to_empty_list() {
    let (resolver, shell, _) = resolver();
    shell.fail_get_links(NavError::service("shell exploded"));

    let log = InfoLog::new();
    let result = resolver
        .fetch_link_items(
            &payload_with_objects(&["SO1"]),
            &active_context("SalesOrder(1)"),
            &Map::new(),
            Some(&log),
        )
        .await
        .unwrap();

    assert_eq!(result, Some(Vec::new()));
    assert!(log.has_level(InfoLevel::Error));
}

#[tokio::test]
async fn dynamic_semantic_objects_resolve_against_custom_data() {
    let (resolver, shell, _) = resolver();
    shell.set_links("Resolved", vec![ShellLink::new("#Resolved-display", "Go")]);

    let payload = payload_with_objects(&["{soProperty}", "{missing}"]);
    let mut custom_data = Map::new();
    custom_data.insert("soProperty".to_string(), json!("Resolved"));

    let log = InfoLog::new();
    let links = resolver
        .fetch_link_items(
            &payload,
            &active_context("SalesOrder(1)"),
            &custom_data,
            Some(&log),
        )
        .await
        .unwrap()
        .unwrap();

    assert_eq!(links.len(), 1);
    let queries = shell.recorded_queries();
    assert_eq!(queries.len(), 1);
    assert_eq!(queries[0].semantic_object, "Resolved");
    // The unresolvable name is logged, not errored
    assert!(log.has_level(InfoLevel::Warning));
}

#[tokio::test]
async fn unavailable_actions_are_filtered() {
    let (resolver, shell, _) = resolver();
    shell.set_links(
        "SO1",
        vec![
            ShellLink::new("#SO1-display", "Display"),
            ShellLink::new("#SO1-delete", "Delete"),
        ],
    );

    let mut payload = payload_with_objects(&["SO1"]);
    payload.semantic_object_unavailable_actions = vec![SemanticObjectUnavailableActions {
        semantic_object: "SO1".to_string(),
        actions: vec!["delete".to_string()],
    }];

    let links = resolver
        .fetch_link_items(&payload, &active_context("SalesOrder(1)"), &Map::new(), None)
        .await
        .unwrap()
        .unwrap();

    assert_eq!(links.len(), 1);
    assert_eq!(links[0].key, "SO1-display");
}

#[tokio::test]
async fn own_navigation_is_excluded_from_actions() {
    let (resolver, shell, _) = resolver();
    shell.set_current_app_target("SO1-manage");
    shell.set_links(
        "SO1",
        vec![
            ShellLink::new("#SO1-manage", "This app"),
            ShellLink::new("#SO1-display", "Display"),
        ],
    );

    let targets = resolver
        .resolve_targets(
            &payload_with_objects(&["SO1"]),
            &active_context("SalesOrder(1)"),
            None,
        )
        .await
        .unwrap();

    assert_eq!(targets.available_actions.len(), 1);
    assert_eq!(targets.available_actions[0].key, "SO1-display");
    assert_eq!(
        targets.own_navigation.as_ref().map(|l| l.key.as_str()),
        Some("SO1-manage")
    );
}

#[tokio::test]
async fn first_three_links_visible_without_superior_tags() {
    let (resolver, shell, _) = resolver();
    shell.set_links(
        "SO1",
        (1..=5)
            .map(|i| ShellLink::new(format!("#SO1-action{i}"), format!("A{i}")))
            .collect(),
    );

    let links = resolver
        .fetch_link_items(&payload_with_objects(&["SO1"]), &active_context("SalesOrder(1)"), &Map::new(), None)
        .await
        .unwrap()
        .unwrap();

    let visible: Vec<_> = links.iter().filter(|l| l.initially_visible).collect();
    assert_eq!(visible.len(), 3);
    assert!(links[0].initially_visible);
    assert!(links[2].initially_visible);
    assert!(!links[3].initially_visible);
}

#[tokio::test]
async fn superior_actions_override_positional_visibility() {
    let shell = Arc::new(FakeShellServices::new());
    let app_state = Arc::new(FakeAppStateService::new());
    let resolver = LinkResolver::new(shell.clone(), app_state)
        .with_config(LinkResolverConfig { visible_link_count: 1 });

    shell.set_links(
        "SO1",
        vec![
            ShellLink::new("#SO1-a", "A"),
            ShellLink::new("#SO1-b", "B").superior(),
            ShellLink::new("#SO1-c", "C").superior(),
        ],
    );

    let links = resolver
        .fetch_link_items(&payload_with_objects(&["SO1"]), &active_context("SalesOrder(1)"), &Map::new(), None)
        .await
        .unwrap()
        .unwrap();

    assert!(!links[0].initially_visible);
    assert!(links[1].initially_visible);
    assert!(links[2].initially_visible);
}

#[tokio::test]
async fn title_link_duplicate_is_removed_and_href_cached() {
    let (resolver, shell, _) = resolver();
    shell.set_links(
        "SO1",
        vec![
            ShellLink::new("#SO1-display?ID=42", "Display"),
            ShellLink::new("#SO1-manage", "Manage"),
        ],
    );

    let links = resolver
        .fetch_link_items(&payload_with_objects(&["SO1"]), &active_context("SalesOrder(1)"), &Map::new(), None)
        .await
        .unwrap()
        .unwrap();

    // Title intent matches ignoring the query string
    let title: Intent = "#SO1-display".parse().unwrap();
    let deduped = resolver.modify_link_items(links, &title, None);

    assert_eq!(deduped.len(), 1);
    assert_eq!(deduped[0].key, "SO1-manage");
    assert_eq!(
        resolver.cached_title_href().as_deref(),
        Some("#SO1-display?ID=42")
    );
}

#[tokio::test]
async fn enrichment_rewrites_href_with_app_state_key() {
    let (resolver, shell, _) = resolver();
    shell.set_links("SO1", vec![ShellLink::new("#SO1-display?x=v1", "Display")]);

    let mut payload = payload_with_objects(&["SO1"]);
    payload.semantic_object_mappings = vec![SemanticObjectMapping {
        semantic_object: "SO1".to_string(),
        items: vec![MappingItem {
            key: "x".to_string(),
            value: "y".to_string(),
        }],
    }];

    let links = resolver
        .resolve(
            &payload,
            &active_context("SalesOrder(1)"),
            &Map::new(),
            None,
            &SelectionVariant::new(),
            None,
        )
        .await
        .unwrap()
        .unwrap();

    assert_eq!(links.len(), 1);
    let href = &links[0].href;
    assert!(href.contains("y=v1"), "renamed parameter missing: {href}");
    assert!(!href.contains("x=v1"), "source parameter kept: {href}");
    assert!(href.contains("sap-xapp-state=ASKEY1"), "app-state key missing: {href}");
}

#[tokio::test]
async fn unchanged_selection_variant_reuses_default_app_state_entry() {
    let (resolver, shell, app_state) = resolver();
    shell.set_links(
        "SO1",
        vec![
            ShellLink::new("#SO1-display", "Display"),
            ShellLink::new("#SO1-manage", "Manage"),
        ],
    );
    shell.set_links("SO2", vec![ShellLink::new("#SO2-display", "Display")]);

    // No mappings apply, so every link shares the default cache entry
    let links = resolver
        .resolve(
            &payload_with_objects(&["SO1", "SO2"]),
            &active_context("SalesOrder(1)"),
            &Map::new(),
            None,
            &SelectionVariant::new(),
            None,
        )
        .await
        .unwrap()
        .unwrap();

    assert_eq!(links.len(), 3);
    assert_eq!(app_state.keys_generated(), 1);
    for link in &links {
        assert!(link.href.contains("sap-xapp-state=ASKEY1"));
    }
}

#[tokio::test]
async fn changed_selection_variant_caches_per_semantic_object() {
    let (resolver, shell, app_state) = resolver();
    shell.set_links(
        "SO1",
        vec![
            ShellLink::new("#SO1-display?x=1", "Display"),
            ShellLink::new("#SO1-manage?x=2", "Manage"),
        ],
    );

    let mut payload = payload_with_objects(&["SO1"]);
    payload.semantic_object_mappings = vec![SemanticObjectMapping {
        semantic_object: "SO1".to_string(),
        items: vec![MappingItem {
            key: "x".to_string(),
            value: "y".to_string(),
        }],
    }];

    let links = resolver
        .resolve(
            &payload,
            &active_context("SalesOrder(1)"),
            &Map::new(),
            None,
            &SelectionVariant::new(),
            None,
        )
        .await
        .unwrap()
        .unwrap();

    // Both links changed under the same semantic object: one generated key
    assert_eq!(links.len(), 2);
    assert_eq!(app_state.keys_generated(), 1);
}

#[tokio::test]
async fn resolve_applies_title_dedup_through_expanded_hash() {
    let (resolver, shell, _) = resolver();
    shell.set_links(
        "SO1",
        vec![
            ShellLink::new("#SO1-display", "Display"),
            ShellLink::new("#SO1-manage", "Manage"),
        ],
    );

    let links = resolver
        .resolve(
            &payload_with_objects(&["SO1"]),
            &active_context("SalesOrder(1)"),
            &Map::new(),
            Some("#SO1-display?sap-xapp-state=OLD"),
            &SelectionVariant::new(),
            None,
        )
        .await
        .unwrap()
        .unwrap();

    assert_eq!(links.len(), 1);
    assert_eq!(links[0].key, "SO1-manage");
}
