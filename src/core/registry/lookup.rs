use async_trait::async_trait;

use crate::core::error::PackerResult;
use crate::core::mods::{ModTarget, ResolvedMod};

/// What the resolvers need from a mod registry.
#[async_trait]
pub trait ModRegistry: Send + Sync {
    /// Free-text search restricted to mod projects; candidate project ids in
    /// registry ranking order.
    async fn search_by_text(&self, query: &str, limit: usize) -> PackerResult<Vec<String>>;

    /// Resolve a project id or slug to the version selected for `target`.
    ///
    /// Misses and transport failures are both reported as `None`.
    async fn get_mod_info(&self, id_or_slug: &str, target: &ModTarget) -> Option<ResolvedMod>;
}
