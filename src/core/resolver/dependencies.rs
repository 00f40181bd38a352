use std::collections::{HashSet, VecDeque};
use std::sync::Arc;

use tracing::{debug, info};

use crate::core::mods::{ModTarget, ResolvedMod};
use crate::core::registry::ModRegistry;

/// Expands a selection with its required dependencies, transitively.
pub struct DependencyResolver {
    registry: Arc<dyn ModRegistry>,
    target: ModTarget,
}

impl DependencyResolver {
    pub fn new(registry: Arc<dyn ModRegistry>, target: ModTarget) -> Self {
        Self { registry, target }
    }

    /// Build the download queue for `initial`.
    ///
    /// Every project id appears once. Each visited item is pushed to the
    /// front, so dependencies tend to precede their dependents; the order is
    /// not a strict topological sort. Optional, incompatible and unresolvable
    /// dependencies are skipped. Cycles terminate on the seen-set.
    pub async fn resolve(&self, initial: Vec<ResolvedMod>) -> Vec<ResolvedMod> {
        let mut worklist: VecDeque<ResolvedMod> = initial.into();
        let mut seen: HashSet<String> = HashSet::new();
        let mut queue: VecDeque<ResolvedMod> = VecDeque::new();

        while let Some(current) = worklist.pop_front() {
            if !seen.insert(current.project_id.clone()) {
                continue;
            }

            for dep_id in current.required_dependency_ids() {
                info!("Resolving dependency: {}", dep_id);
                match self.registry.get_mod_info(dep_id, &self.target).await {
                    Some(dep) => worklist.push_back(dep.as_dependency()),
                    None => debug!(
                        "Dependency {} of {} has no {} {} build, skipping",
                        dep_id, current.display_name, self.target.loader, self.target.game_version
                    ),
                }
            }

            queue.push_front(current);
        }

        queue.into()
    }
}
