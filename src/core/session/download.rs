use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use super::{DownloadSummary, Session, SessionEvent};
use crate::core::downloader::Downloader;
use crate::core::mods::{FoundTag, ResolvedMod};
use crate::core::resolver::DependencyResolver;

enum TransferMessage {
    Progress {
        project_id: String,
        received: u64,
        total: Option<u64>,
    },
    Finished {
        project_id: String,
        error: Option<String>,
    },
    /// Sent once, by the transfer whose decrement took the active count to zero.
    AllDone,
}

impl Session {
    /// Download every item found by the last search, plus dependencies.
    pub async fn download_all(&mut self, dest_dir: &Path) -> DownloadSummary {
        let ids: Vec<String> = self
            .state
            .results
            .iter()
            .filter(|(_, item)| !item.is_dependency)
            .map(|(key, _)| key.clone())
            .collect();
        self.download(&ids, dest_dir).await
    }

    /// Download the items named by `ids` (result keys or project ids) and
    /// their required dependencies into `dest_dir`.
    ///
    /// `AllDownloadsComplete` is emitted exactly once per call, however many
    /// transfers fail. Local file errors, including an uncreatable `dest_dir`,
    /// surface as failed items.
    pub async fn download(&mut self, ids: &[String], dest_dir: &Path) -> DownloadSummary {
        let mut summary = DownloadSummary::default();

        let selection: Vec<ResolvedMod> = ids
            .iter()
            .filter_map(|id| {
                let found = self.lookup(id);
                if found.is_none() {
                    debug!("No search result for {:?}", id);
                }
                found
            })
            .collect();

        if let Err(e) = tokio::fs::create_dir_all(dest_dir).await {
            warn!("Could not create {:?}: {}", dest_dir, e);
        }

        let (present, initial): (Vec<_>, Vec<_>) = selection
            .into_iter()
            .partition(|item| Downloader::is_present(dest_dir, item));
        summary.skipped += present.len();

        if initial.is_empty() {
            info!("All selected mods are already downloaded.");
            self.emit(SessionEvent::AllDownloadsComplete);
            return summary;
        }

        info!("Resolving dependencies...");
        let queue = self.resolve_dependencies(initial).await;
        self.emit(SessionEvent::ResolutionFinished {
            queue: queue.clone(),
        });

        self.run_transfers(queue, dest_dir, &mut summary).await;
        summary
    }

    fn lookup(&self, id: &str) -> Option<ResolvedMod> {
        self.state.results.get(id).cloned().or_else(|| {
            self.state
                .results
                .values()
                .find(|item| item.project_id == id)
                .cloned()
        })
    }

    /// Run the dependency walk on the pool, off the coordinator loop.
    async fn resolve_dependencies(&self, initial: Vec<ResolvedMod>) -> Vec<ResolvedMod> {
        let resolver = DependencyResolver::new(Arc::clone(&self.registry), self.target.clone());
        let fallback = initial.clone();

        match self.pool.spawn(async move { resolver.resolve(initial).await }).await {
            Ok(queue) => queue,
            Err(e) => {
                warn!("Dependency resolution aborted ({}), downloading selection only", e);
                fallback
            }
        }
    }

    async fn run_transfers(
        &mut self,
        queue: Vec<ResolvedMod>,
        dest_dir: &Path,
        summary: &mut DownloadSummary,
    ) {
        let (present, pending): (Vec<_>, Vec<_>) = queue
            .into_iter()
            .partition(|item| Downloader::is_present(dest_dir, item));
        summary.skipped += present.len();

        if pending.is_empty() {
            info!("All downloads completed.");
            self.emit(SessionEvent::AllDownloadsComplete);
            return;
        }

        let (tx, mut rx) = mpsc::unbounded_channel();
        let active = Arc::new(AtomicUsize::new(pending.len()));
        let dest_dir: PathBuf = dest_dir.to_path_buf();

        for item in pending {
            if item.is_dependency && !self.state.surfaced.contains(&item.project_id) {
                self.surface(item.clone(), FoundTag::Dependency);
            }
            self.spawn_transfer(item, dest_dir.clone(), tx.clone(), Arc::clone(&active));
        }
        drop(tx);

        let mut done = false;
        while let Some(message) = rx.recv().await {
            match message {
                TransferMessage::Progress {
                    project_id,
                    received,
                    total,
                } => self.emit(SessionEvent::DownloadProgress {
                    project_id,
                    received,
                    total,
                }),
                TransferMessage::Finished { project_id, error } => {
                    match &error {
                        None => summary.downloaded.push(project_id.clone()),
                        Some(e) => {
                            warn!("Download of {} failed: {}", project_id, e);
                            summary.failed.push((project_id.clone(), e.clone()));
                        }
                    }
                    self.emit(SessionEvent::DownloadComplete { project_id, error });
                }
                TransferMessage::AllDone => {
                    done = true;
                    break;
                }
            }
        }
        if !done {
            warn!("Transfer workers exited without reporting completion");
        }

        info!(
            "All downloads completed. {} ok, {} failed.",
            summary.downloaded.len(),
            summary.failed.len()
        );
        self.emit(SessionEvent::AllDownloadsComplete);
    }

    fn spawn_transfer(
        &self,
        item: ResolvedMod,
        dest_dir: PathBuf,
        tx: mpsc::UnboundedSender<TransferMessage>,
        active: Arc<AtomicUsize>,
    ) {
        let downloader = Arc::clone(&self.downloader);
        let cancel = self.cancel.clone();

        self.pool.spawn(async move {
            info!("Downloading {} ({})", item.display_name, item.filename);

            let progress_tx = tx.clone();
            let progress_id = item.project_id.clone();
            let result = downloader
                .download_mod(&item, &dest_dir, &cancel, move |received, total| {
                    let _ = progress_tx.send(TransferMessage::Progress {
                        project_id: progress_id.clone(),
                        received,
                        total,
                    });
                })
                .await;

            let _ = tx.send(TransferMessage::Finished {
                project_id: item.project_id.clone(),
                error: result.err().map(|e| e.to_string()),
            });
            if active.fetch_sub(1, Ordering::AcqRel) == 1 {
                let _ = tx.send(TransferMessage::AllDone);
            }
        });
    }
}
