mod client;
mod lookup;
mod model;
mod select;

pub use client::{RegistryClient, MODRINTH_API_BASE};
pub use lookup::ModRegistry;
pub use model::{
    DependencyDescriptor, DependencyKind, ProjectMetadata, ReleaseChannel, SearchHit,
    SearchResponse, VersionFile, VersionRecord,
};
pub use select::select_version;

#[cfg(test)]
pub(crate) mod testing;
