//! In-memory fakes for the shell and app-state services

use async_trait::async_trait;
use docflow_navigation::{
    AppStateEntry, AppStateService, LinkQuery, NavError, SelectionVariant, ShellLink,
    ShellServices,
};
use indexmap::IndexMap;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

/// Shell services with canned link responses
pub struct FakeShellServices {
    available: AtomicBool,
    links: Mutex<HashMap<String, Vec<ShellLink>>>,
    recorded_queries: Mutex<Vec<LinkQuery>>,
    current_target: Mutex<String>,
    get_links_error: Mutex<Option<NavError>>,
}

impl Default for FakeShellServices {
    fn default() -> Self {
        Self {
            available: AtomicBool::new(true),
            links: Mutex::new(HashMap::new()),
            recorded_queries: Mutex::new(Vec::new()),
            current_target: Mutex::new(String::new()),
            get_links_error: Mutex::new(None),
        }
    }
}

impl FakeShellServices {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    /// Canned links returned for one semantic object
    pub fn set_links(&self, semantic_object: impl Into<String>, links: Vec<ShellLink>) {
        self.links.lock().insert(semantic_object.into(), links);
    }

    pub fn set_current_app_target(&self, target: impl Into<String>) {
        *self.current_target.lock() = target.into();
    }

    pub fn fail_get_links(&self, error: NavError) {
        *self.get_links_error.lock() = Some(error);
    }

    /// Queries received by `get_links`, in order
    #[must_use]
    pub fn recorded_queries(&self) -> Vec<LinkQuery> {
        self.recorded_queries.lock().clone()
    }
}

#[async_trait]
impl ShellServices for FakeShellServices {
    fn is_available(&self) -> bool {
        self.available.load(Ordering::SeqCst)
    }

    async fn get_links(&self, queries: &[LinkQuery]) -> Result<Vec<Vec<ShellLink>>, NavError> {
        self.recorded_queries.lock().extend(queries.iter().cloned());
        if let Some(e) = self.get_links_error.lock().take() {
            return Err(e);
        }
        let links = self.links.lock();
        Ok(queries
            .iter()
            .map(|q| links.get(&q.semantic_object).cloned().unwrap_or_default())
            .collect())
    }

    async fn expand_compact_hash(&self, hash: &str) -> Result<String, NavError> {
        Ok(hash.to_string())
    }

    fn current_app_target(&self) -> String {
        self.current_target.lock().clone()
    }
}

/// App-state service minting sequential keys
#[derive(Default)]
pub struct FakeAppStateService {
    counter: AtomicUsize,
}

impl FakeAppStateService {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of keys generated so far
    #[must_use]
    pub fn keys_generated(&self) -> usize {
        self.counter.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AppStateService for FakeAppStateService {
    async fn app_state_key_and_url_parameters(
        &self,
        _selection_variant: &SelectionVariant,
    ) -> Result<AppStateEntry, NavError> {
        let n = self.counter.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(AppStateEntry {
            key: format!("ASKEY{n}"),
            url_parameters: IndexMap::new(),
        })
    }

    fn mix_attributes_and_selection_variant(
        &self,
        attributes: &serde_json::Map<String, serde_json::Value>,
        selection_variant: &SelectionVariant,
    ) -> SelectionVariant {
        let mut mixed = selection_variant.clone();
        for (key, value) in attributes {
            if value.is_null() || value.is_object() || value.is_array() {
                continue;
            }
            if !mixed.parameters.contains_key(key) {
                mixed.parameters.insert(key.clone(), value.clone());
            }
        }
        mixed
    }
}
