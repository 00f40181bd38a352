use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::core::error::PackerError;
use crate::core::registry::{DependencyDescriptor, ReleaseChannel};

/// Supported mod loaders — strongly typed, no magic strings.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum LoaderType {
    Fabric,
    Forge,
    NeoForge,
    Quilt,
}

impl LoaderType {
    pub const ALL: [LoaderType; 4] = [
        LoaderType::Fabric,
        LoaderType::Forge,
        LoaderType::NeoForge,
        LoaderType::Quilt,
    ];
}

impl std::fmt::Display for LoaderType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LoaderType::Fabric => write!(f, "fabric"),
            LoaderType::Forge => write!(f, "forge"),
            LoaderType::NeoForge => write!(f, "neoforge"),
            LoaderType::Quilt => write!(f, "quilt"),
        }
    }
}

impl FromStr for LoaderType {
    type Err = PackerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fabric" => Ok(LoaderType::Fabric),
            "forge" => Ok(LoaderType::Forge),
            "neoforge" => Ok(LoaderType::NeoForge),
            "quilt" => Ok(LoaderType::Quilt),
            other => Err(PackerError::UnknownLoader(other.to_string())),
        }
    }
}

/// The (loader, game version) pair every lookup in a run is made against.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModTarget {
    pub loader: LoaderType,
    pub game_version: String,
}

impl ModTarget {
    pub fn new(loader: LoaderType, game_version: impl Into<String>) -> Self {
        Self {
            loader,
            game_version: game_version.into(),
        }
    }
}

/// One acquirable artifact: a project pinned to a version and its first file.
///
/// `project_id` is the identity across a run; two values with the same id are
/// the same mod. Values are never mutated after construction, progress is
/// tracked by the session keyed on `project_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedMod {
    /// Raw input line that produced this item; empty for pure dependencies.
    pub original_query: String,
    pub display_name: String,
    pub project_id: String,
    pub version_id: String,
    pub download_url: String,
    pub filename: String,
    pub release_channel: ReleaseChannel,
    pub dependencies: Vec<DependencyDescriptor>,
    pub is_dependency: bool,
    /// Reserved; nothing in the engine sets it.
    pub update_available: bool,
}

impl ResolvedMod {
    /// Same item, attributed to the raw query that found it.
    pub fn with_query(self, query: impl Into<String>) -> Self {
        Self {
            original_query: query.into(),
            ..self
        }
    }

    /// Same item, marked as discovered through a dependency edge.
    pub fn as_dependency(self) -> Self {
        Self {
            original_query: String::new(),
            is_dependency: true,
            ..self
        }
    }

    /// Project ids of the dependencies that must be installed alongside.
    pub fn required_dependency_ids(&self) -> impl Iterator<Item = &str> {
        self.dependencies
            .iter()
            .filter(|dep| dep.is_required())
            .filter_map(|dep| dep.project_id.as_deref())
    }

    /// Key under which the session files this item: the raw query for
    /// searched items, the project id for dependencies.
    pub fn result_key(&self) -> &str {
        if self.original_query.is_empty() {
            &self.project_id
        } else {
            &self.original_query
        }
    }
}

/// How an item surfaced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FoundTag {
    /// Matched through free-text registry search.
    Found,
    /// Matched by guessing the slug from the sanitized name.
    Fallback,
    /// Pulled in as a required dependency of a selection.
    Dependency,
}

impl FoundTag {
    pub fn status(&self) -> &'static str {
        match self {
            FoundTag::Found => "Available (API)",
            FoundTag::Fallback => "Available (Slug)",
            FoundTag::Dependency => "Dependency",
        }
    }
}
