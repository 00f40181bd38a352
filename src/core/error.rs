use std::path::PathBuf;
use thiserror::Error;

/// Central error type for the resolution and download engine.
/// Every fallible module returns `Result<T, PackerError>`.
#[derive(Debug, Error)]
pub enum PackerError {
    // ── IO ──────────────────────────────────────────────
    #[error("IO error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Unsafe file name from registry: {0:?}")]
    InvalidFileName(String),

    // ── Network ─────────────────────────────────────────
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Download failed for {url}: HTTP {status}")]
    DownloadFailed { url: String, status: u16 },

    #[error("Registry API error: {0}")]
    RegistryApi(String),

    // ── JSON ────────────────────────────────────────────
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // ── Profiles ────────────────────────────────────────
    #[error("Profile not found: {0}")]
    ProfileNotFound(String),

    #[error("Invalid profile name: {0:?}")]
    InvalidProfileName(String),

    // ── Settings ────────────────────────────────────────
    #[error("Unknown loader: {0}")]
    UnknownLoader(String),

    // ── Run control ─────────────────────────────────────
    #[error("download cancelled")]
    Cancelled,

    // ── Generic ─────────────────────────────────────────
    #[error("{0}")]
    Other(String),
}

/// Convenience alias used throughout the crate.
pub type PackerResult<T> = Result<T, PackerError>;

impl From<std::io::Error> for PackerError {
    fn from(source: std::io::Error) -> Self {
        PackerError::Io {
            path: PathBuf::new(),
            source,
        }
    }
}

impl PackerError {
    /// Wrap an IO error with the path it happened at.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        PackerError::Io {
            path: path.into(),
            source,
        }
    }
}
