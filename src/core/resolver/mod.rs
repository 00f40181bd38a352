mod dependencies;
mod name;

pub use dependencies::DependencyResolver;
pub use name::{
    resolve_name, sanitize_mod_name, slug_from_name, split_camel_case, trim_extension,
    NameOutcome, SEARCH_LIMIT,
};
