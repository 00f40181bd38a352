pub mod model;

pub use model::{FoundTag, LoaderType, ModTarget, ResolvedMod};
