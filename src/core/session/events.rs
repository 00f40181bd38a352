use serde::Serialize;

use crate::core::mods::{FoundTag, ResolvedMod};

/// Everything the engine reports to its presentation layer.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum SessionEvent {
    ModFound {
        item: ResolvedMod,
        status: String,
        tag: FoundTag,
    },
    ModNotFound {
        name: String,
    },
    SearchComplete {
        found: usize,
        total: usize,
    },
    /// The deduplicated, dependency-expanded queue for a download request.
    ResolutionFinished {
        queue: Vec<ResolvedMod>,
    },
    DownloadProgress {
        project_id: String,
        received: u64,
        total: Option<u64>,
    },
    /// Terminal outcome of one transfer; `error` is `None` on success.
    DownloadComplete {
        project_id: String,
        error: Option<String>,
    },
    AllDownloadsComplete,
}

/// Result of one search batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SearchSummary {
    pub found: usize,
    pub total: usize,
}

/// Result of one download request.
#[derive(Debug, Clone, Default)]
pub struct DownloadSummary {
    /// Project ids transferred successfully.
    pub downloaded: Vec<String>,
    /// Project ids with the error text of their failed transfer.
    pub failed: Vec<(String, String)>,
    /// Items whose file already existed at the destination.
    pub skipped: usize,
}
