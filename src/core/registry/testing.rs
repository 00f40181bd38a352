//! In-memory registry used by resolver and session tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use super::lookup::ModRegistry;
use super::model::{DependencyDescriptor, DependencyKind, ReleaseChannel};
use crate::core::error::{PackerError, PackerResult};
use crate::core::mods::{ModTarget, ResolvedMod};

#[derive(Default)]
pub struct FakeRegistry {
    searches: HashMap<String, Vec<String>>,
    mods: HashMap<String, ResolvedMod>,
    search_fails: bool,
    delay: Option<Duration>,
    search_calls: AtomicUsize,
    lookups: Mutex<Vec<String>>,
}

impl FakeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_search(mut self, query: &str, hits: &[&str]) -> Self {
        self.searches
            .insert(query.to_string(), hits.iter().map(|h| h.to_string()).collect());
        self
    }

    /// Project `id` whose version requires each of `required`.
    pub fn with_mod(self, id: &str, title: &str, required: &[&str]) -> Self {
        let deps = required
            .iter()
            .map(|dep| DependencyDescriptor {
                project_id: Some(dep.to_string()),
                dependency_type: DependencyKind::Required,
            })
            .collect();
        self.with_mod_deps(id, title, deps)
    }

    pub fn with_mod_deps(self, id: &str, title: &str, deps: Vec<DependencyDescriptor>) -> Self {
        let item = ResolvedMod {
            original_query: String::new(),
            display_name: title.to_string(),
            project_id: id.to_string(),
            version_id: format!("{id}-v1"),
            download_url: format!("https://cdn.invalid/{id}.jar"),
            filename: format!("{id}.jar"),
            release_channel: ReleaseChannel::Release,
            dependencies: deps,
            is_dependency: false,
            update_available: false,
        };
        self.with_item(id, item)
    }

    /// Register `item` under the lookup key `key` (an id or a slug).
    pub fn with_item(mut self, key: &str, item: ResolvedMod) -> Self {
        self.mods.insert(key.to_string(), item);
        self
    }

    pub fn failing_search(mut self) -> Self {
        self.search_fails = true;
        self
    }

    /// Every call sleeps first, to widen races in concurrency tests.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn search_calls(&self) -> usize {
        self.search_calls.load(Ordering::SeqCst)
    }

    pub fn lookups_of(&self, key: &str) -> usize {
        self.lookups
            .lock()
            .unwrap()
            .iter()
            .filter(|k| k.as_str() == key)
            .count()
    }

    async fn pause(&self) {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
    }
}

#[async_trait]
impl ModRegistry for FakeRegistry {
    async fn search_by_text(&self, query: &str, _limit: usize) -> PackerResult<Vec<String>> {
        self.search_calls.fetch_add(1, Ordering::SeqCst);
        self.pause().await;
        if self.search_fails {
            return Err(PackerError::RegistryApi("search unavailable".into()));
        }
        Ok(self.searches.get(query).cloned().unwrap_or_default())
    }

    async fn get_mod_info(&self, id_or_slug: &str, _target: &ModTarget) -> Option<ResolvedMod> {
        self.lookups.lock().unwrap().push(id_or_slug.to_string());
        self.pause().await;
        self.mods.get(id_or_slug).cloned()
    }
}
