use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::core::error::{PackerError, PackerResult};
use crate::core::resolver::{sanitize_mod_name, trim_extension};

/// Derive searchable mod names from the `*.jar` files under `dir`, recursively.
///
/// Returns the sorted, deduplicated names; jars whose name sanitizes to
/// nothing are dropped.
pub async fn import_from_folder(dir: &Path) -> PackerResult<Vec<String>> {
    let mut names = BTreeSet::new();

    for jar in collect_jars(dir).await? {
        let Some(file_name) = jar.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        let name = sanitize_mod_name(trim_extension(file_name));
        if name.is_empty() {
            debug!("Nothing usable in jar name {:?}", file_name);
            continue;
        }
        names.insert(name);
    }

    Ok(names.into_iter().collect())
}

async fn collect_jars(root: &Path) -> PackerResult<Vec<PathBuf>> {
    let mut jars = Vec::new();
    let mut pending = vec![root.to_path_buf()];

    while let Some(dir) = pending.pop() {
        let mut entries = tokio::fs::read_dir(&dir)
            .await
            .map_err(|e| PackerError::io(&dir, e))?;

        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| PackerError::io(&dir, e))?
        {
            let path = entry.path();
            let file_type = entry
                .file_type()
                .await
                .map_err(|e| PackerError::io(&path, e))?;

            if file_type.is_dir() {
                pending.push(path);
            } else if file_type.is_file() && is_jar(&path) {
                jars.push(path);
            }
        }
    }

    Ok(jars)
}

fn is_jar(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("jar"))
}
