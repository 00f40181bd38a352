// ─── Session ───
// Single-owner coordinator between the presentation layer and the engine.
//
// Worker tasks (name lookups, the dependency walk, transfers) never touch
// session state. They send messages over a channel that the session drains
// inside `search` / `download`, and only that loop mutates results.
// Pending counters are decremented by the finishing task itself; the one
// that reaches zero sends the batch-complete message.

mod download;
mod events;
mod search;


use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::debug;

pub use events::{DownloadSummary, SearchSummary, SessionEvent};

use crate::core::downloader::Downloader;
use crate::core::mods::{FoundTag, ModTarget, ResolvedMod};
use crate::core::pool::WorkerPool;
use crate::core::registry::ModRegistry;

/// State owned by the coordinator loop.
#[derive(Debug, Default)]
struct SessionState {
    /// Surfaced items keyed by raw query (or project id for dependencies).
    results: BTreeMap<String, ResolvedMod>,
    /// Project ids already shown to the presentation layer.
    surfaced: HashSet<String>,
    /// Raw names of the last batch that matched nothing.
    not_found: Vec<String>,
}

pub struct Session {
    registry: Arc<dyn ModRegistry>,
    downloader: Arc<Downloader>,
    pool: WorkerPool,
    target: ModTarget,
    cancel: CancellationToken,
    events: mpsc::UnboundedSender<SessionEvent>,
    state: SessionState,
}

impl Session {
    pub fn new(
        registry: Arc<dyn ModRegistry>,
        downloader: Arc<Downloader>,
        pool: WorkerPool,
        target: ModTarget,
        cancel: CancellationToken,
        events: mpsc::UnboundedSender<SessionEvent>,
    ) -> Self {
        Self {
            registry,
            downloader,
            pool,
            target,
            cancel,
            events,
            state: SessionState::default(),
        }
    }

    /// Items found so far, keyed by the raw query that found them.
    pub fn results(&self) -> &BTreeMap<String, ResolvedMod> {
        &self.state.results
    }

    pub fn not_found(&self) -> &[String] {
        &self.state.not_found
    }

    /// Token that cancels this session's registry calls and transfers.
    pub fn cancellation(&self) -> CancellationToken {
        self.cancel.clone()
    }

    fn emit(&self, event: SessionEvent) {
        if self.events.send(event).is_err() {
            debug!("Event receiver dropped");
        }
    }

    /// Record a found item unless its project already surfaced.
    /// Returns whether it was new.
    fn surface(&mut self, item: ResolvedMod, tag: FoundTag) -> bool {
        if !self.state.surfaced.insert(item.project_id.clone()) {
            debug!(
                "{} already listed, dropping duplicate from {:?}",
                item.project_id, item.original_query
            );
            return false;
        }

        let status = format!("{} ({})", tag.status(), item.release_channel);
        self.state
            .results
            .insert(item.result_key().to_string(), item.clone());
        self.emit(SessionEvent::ModFound { item, status, tag });
        true
    }
}
