use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{info, warn};

use super::{Session, SessionEvent, SessionState, SearchSummary};
use crate::core::resolver::{resolve_name, NameOutcome};

enum SearchMessage {
    Outcome(NameOutcome),
    /// Sent once, by the task whose decrement took the pending count to zero.
    BatchDone,
}

impl Session {
    /// Start a fresh batch: forget previous results and resolve `names`.
    pub async fn search(&mut self, names: Vec<String>) -> SearchSummary {
        self.state = SessionState::default();
        self.run_search(names).await
    }

    /// Search again for the names the previous batch could not match.
    pub async fn research_not_found(&mut self) -> SearchSummary {
        let names = std::mem::take(&mut self.state.not_found);
        self.run_search(names).await
    }

    async fn run_search(&mut self, names: Vec<String>) -> SearchSummary {
        let names: Vec<String> = names
            .into_iter()
            .map(|name| name.trim().to_string())
            .filter(|name| !name.is_empty())
            .collect();

        let mut summary = SearchSummary {
            found: 0,
            total: names.len(),
        };
        if names.is_empty() {
            self.emit(SessionEvent::SearchComplete { found: 0, total: 0 });
            return summary;
        }

        info!(
            "Searching {} names for {} {}",
            summary.total, self.target.loader, self.target.game_version
        );

        let (tx, mut rx) = mpsc::unbounded_channel();
        let pending = Arc::new(AtomicUsize::new(names.len()));

        for name in names {
            let tx = tx.clone();
            let pending = Arc::clone(&pending);
            let registry = Arc::clone(&self.registry);
            let target = self.target.clone();

            self.pool.spawn(async move {
                let outcome = resolve_name(registry.as_ref(), &name, &target).await;
                let _ = tx.send(SearchMessage::Outcome(outcome));
                if pending.fetch_sub(1, Ordering::AcqRel) == 1 {
                    let _ = tx.send(SearchMessage::BatchDone);
                }
            });
        }
        drop(tx);

        let mut done = false;
        while let Some(message) = rx.recv().await {
            match message {
                SearchMessage::Outcome(NameOutcome::Found { item, tag }) => {
                    if self.surface(item, tag) {
                        summary.found += 1;
                    }
                }
                SearchMessage::Outcome(NameOutcome::NotFound { name }) => {
                    self.state.not_found.push(name.clone());
                    self.emit(SessionEvent::ModNotFound { name });
                }
                SearchMessage::BatchDone => {
                    done = true;
                    break;
                }
            }
        }
        if !done {
            warn!("Search workers exited without finishing the batch");
        }

        info!(
            "Search complete. Found {} of {} mods.",
            summary.found, summary.total
        );
        self.emit(SessionEvent::SearchComplete {
            found: summary.found,
            total: summary.total,
        });
        summary
    }
}
