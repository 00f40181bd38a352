// ─── Registry Wire Model ───
// Subset of the Modrinth v2 JSON the engine reads.

use serde::{Deserialize, Serialize};

/// `GET /search` response.
#[derive(Debug, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub hits: Vec<SearchHit>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchHit {
    pub project_id: String,
}

/// `GET /project/{id|slug}` response.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProjectMetadata {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub icon_url: Option<String>,
}

impl ProjectMetadata {
    /// A miss can come back as `{}` rather than a 404.
    pub fn is_empty(&self) -> bool {
        self.id.is_empty() && self.slug.is_empty()
    }
}

/// Maturity tag of a version, in selection priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReleaseChannel {
    Release,
    Beta,
    Alpha,
    #[default]
    #[serde(other)]
    Other,
}

impl ReleaseChannel {
    /// Channels scanned by version selection, highest priority first.
    pub const PRIORITY: [ReleaseChannel; 3] = [
        ReleaseChannel::Release,
        ReleaseChannel::Beta,
        ReleaseChannel::Alpha,
    ];
}

impl std::fmt::Display for ReleaseChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReleaseChannel::Release => write!(f, "release"),
            ReleaseChannel::Beta => write!(f, "beta"),
            ReleaseChannel::Alpha => write!(f, "alpha"),
            ReleaseChannel::Other => write!(f, "other"),
        }
    }
}

/// One element of `GET /project/{slug}/version`.
#[derive(Debug, Clone, Deserialize)]
pub struct VersionRecord {
    pub id: String,
    #[serde(default)]
    pub version_type: ReleaseChannel,
    #[serde(default)]
    pub files: Vec<VersionFile>,
    #[serde(default)]
    pub dependencies: Vec<DependencyDescriptor>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct VersionFile {
    pub url: String,
    pub filename: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DependencyKind {
    Required,
    Optional,
    Incompatible,
    Embedded,
    #[default]
    #[serde(other)]
    Other,
}

/// Edge from a version to another project.
///
/// Dependencies pinned only by `version_id` have no `project_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencyDescriptor {
    #[serde(default)]
    pub project_id: Option<String>,
    #[serde(default)]
    pub dependency_type: DependencyKind,
}

impl DependencyDescriptor {
    pub fn is_required(&self) -> bool {
        self.dependency_type == DependencyKind::Required
    }
}
