// ─── Name Resolver ───
// Turns one informal mod name into a registry match.

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, info};

use crate::core::mods::{FoundTag, ModTarget, ResolvedMod};
use crate::core::registry::ModRegistry;

/// Candidates requested from free-text search.
pub const SEARCH_LIMIT: usize = 5;

static NOISE_TOKENS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(fabric|forge|quilt|neoforge|\+1|mod)\b").expect("valid token regex")
});
static BRACKETS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[\[\]()]").expect("valid bracket regex"));
static VERSION_SUFFIX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)[-_]?(fabric|forge|quilt|neoforge)?[-_]?\d+(\.\d+)*([-_].*)?$")
        .expect("valid suffix regex")
});
static SEPARATORS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[-_]").expect("valid separator regex"));

/// Result of resolving one raw name.
#[derive(Debug, Clone)]
pub enum NameOutcome {
    Found { item: ResolvedMod, tag: FoundTag },
    NotFound { name: String },
}

/// Strip the `.jar`-style extension from a file name.
pub fn trim_extension(file_name: &str) -> &str {
    match file_name.rfind('.') {
        Some(idx) if idx > 0 => &file_name[..idx],
        _ => file_name,
    }
}

/// Reduce a raw name (often a jar file name) to the words that identify the mod.
///
/// `"JEI-1.20.1-forge-11.6.0.1018"` becomes `"JEI"`.
pub fn sanitize_mod_name(input: &str) -> String {
    let cleaned = NOISE_TOKENS.replace_all(input, "");
    let cleaned = BRACKETS.replace_all(&cleaned, "");
    let cleaned = VERSION_SUFFIX.replace_all(&cleaned, "");
    let cleaned = SEPARATORS.replace_all(&cleaned, " ");
    cleaned.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Insert spaces at camel-case word boundaries: `"AppleSkin"` -> `"Apple Skin"`,
/// `"JEIAddon"` -> `"JEI Addon"`. Digit runs never start a new word.
pub fn split_camel_case(input: &str) -> String {
    let chars: Vec<char> = input.chars().collect();
    let mut out = String::with_capacity(input.len() + 4);

    for (i, &c) in chars.iter().enumerate() {
        if i > 0 && c.is_ascii_uppercase() {
            let prev = chars[i - 1];
            let next_is_lower = chars.get(i + 1).is_some_and(|n| n.is_ascii_lowercase());
            if prev.is_ascii_lowercase() || (prev.is_ascii_uppercase() && next_is_lower) {
                out.push(' ');
            }
        }
        out.push(c);
    }

    out
}

/// Slug guess for the fallback lookup: lowercase, whitespace to dashes.
pub fn slug_from_name(clean_name: &str) -> String {
    clean_name
        .to_lowercase()
        .chars()
        .map(|c| if c.is_whitespace() { '-' } else { c })
        .collect()
}

/// Resolve one raw name: free-text search first, then a slug guess.
///
/// A failed search (no hits or a transport error) always falls through to
/// the slug guess.
pub async fn resolve_name(registry: &dyn ModRegistry, raw: &str, target: &ModTarget) -> NameOutcome {
    info!("Searching for: {}", raw);

    let clean_name = sanitize_mod_name(raw);
    if clean_name.is_empty() {
        debug!("Nothing left of {:?} after sanitizing", raw);
        return NameOutcome::NotFound {
            name: raw.to_string(),
        };
    }
    let spaced_name = split_camel_case(&clean_name);

    match registry.search_by_text(&spaced_name, SEARCH_LIMIT).await {
        Ok(candidates) => {
            for project_id in candidates {
                if let Some(item) = registry.get_mod_info(&project_id, target).await {
                    return NameOutcome::Found {
                        item: item.with_query(raw),
                        tag: FoundTag::Found,
                    };
                }
            }
        }
        Err(e) => debug!("Search for {:?} failed: {}", spaced_name, e),
    }

    let slug = slug_from_name(&clean_name);
    if let Some(item) = registry.get_mod_info(&slug, target).await {
        return NameOutcome::Found {
            item: item.with_query(raw),
            tag: FoundTag::Fallback,
        };
    }

    NameOutcome::NotFound {
        name: raw.to_string(),
    }
}
