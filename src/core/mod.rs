// ─── CraftPacker Core ───
// Engine for turning loose mod-name lists into downloaded jars.
//
// Architecture:
//   core/
//     mods/       — LoaderType, ModTarget, ResolvedMod, FoundTag
//     registry/   — Modrinth v2 client, wire model, version selection
//     resolver/   — Name sanitizing + lookup, dependency expansion
//     downloader/ — Streaming transfers with progress and cleanup
//     session/    — Coordinator owning results, events and completion
//     profile/    — Saved mod lists + import from a mods folder
//     state/      — Settings and data directory
//     pool        — Bounded worker pool
//     rate_limit  — Minimum spacing between registry calls

pub mod downloader;
pub mod error;
pub mod http;
pub mod mods;
pub mod pool;
pub mod profile;
pub mod rate_limit;
pub mod registry;
pub mod resolver;
pub mod session;
pub mod state;
