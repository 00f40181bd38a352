mod import;

pub use import::import_from_folder;

use std::path::{Path, PathBuf};

use tracing::info;

use crate::core::error::{PackerError, PackerResult};

const PROFILE_EXTENSION: &str = "txt";

/// Named mod lists stored as one-name-per-line text files.
pub struct ProfileStore {
    profiles_dir: PathBuf,
}

impl ProfileStore {
    pub fn new(profiles_dir: PathBuf) -> Self {
        Self { profiles_dir }
    }

    pub fn dir(&self) -> &Path {
        &self.profiles_dir
    }

    fn profile_path(&self, name: &str) -> PackerResult<PathBuf> {
        validate_name(name)?;
        Ok(self
            .profiles_dir
            .join(format!("{}.{}", name.trim(), PROFILE_EXTENSION)))
    }

    /// Profile names, sorted.
    pub async fn list(&self) -> PackerResult<Vec<String>> {
        let mut names = Vec::new();

        if !self.profiles_dir.exists() {
            return Ok(names);
        }

        let mut entries = tokio::fs::read_dir(&self.profiles_dir)
            .await
            .map_err(|e| PackerError::io(&self.profiles_dir, e))?;

        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| PackerError::io(&self.profiles_dir, e))?
        {
            let path = entry.path();
            if !path.is_file() || path.extension().and_then(|e| e.to_str()) != Some(PROFILE_EXTENSION) {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                names.push(stem.to_string());
            }
        }

        names.sort();
        Ok(names)
    }

    /// The mod names of profile `name`: trimmed, blank lines dropped.
    pub async fn load(&self, name: &str) -> PackerResult<Vec<String>> {
        let path = self.profile_path(name)?;
        if !path.exists() {
            return Err(PackerError::ProfileNotFound(name.to_string()));
        }

        let raw = tokio::fs::read_to_string(&path)
            .await
            .map_err(|e| PackerError::io(&path, e))?;

        Ok(raw
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect())
    }

    /// Create or overwrite profile `name`.
    pub async fn save(&self, name: &str, mod_names: &[String]) -> PackerResult<()> {
        let path = self.profile_path(name)?;

        tokio::fs::create_dir_all(&self.profiles_dir)
            .await
            .map_err(|e| PackerError::io(&self.profiles_dir, e))?;

        let mut body = mod_names
            .iter()
            .map(|n| n.trim())
            .filter(|n| !n.is_empty())
            .collect::<Vec<_>>()
            .join("\n");
        body.push('\n');

        tokio::fs::write(&path, body)
            .await
            .map_err(|e| PackerError::io(&path, e))?;

        info!("Saved profile '{}' ({} mods)", name.trim(), mod_names.len());
        Ok(())
    }

    pub async fn delete(&self, name: &str) -> PackerResult<()> {
        let path = self.profile_path(name)?;
        if !path.exists() {
            return Err(PackerError::ProfileNotFound(name.to_string()));
        }

        tokio::fs::remove_file(&path)
            .await
            .map_err(|e| PackerError::io(&path, e))?;

        info!("Deleted profile {}", name.trim());
        Ok(())
    }
}

fn validate_name(name: &str) -> PackerResult<()> {
    let trimmed = name.trim();
    let bad = trimmed.is_empty()
        || trimmed == "."
        || trimmed == ".."
        || trimmed.contains(['/', '\\'])
        || trimmed.contains(std::path::MAIN_SEPARATOR);
    if bad {
        return Err(PackerError::InvalidProfileName(name.to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn store(dir: &Path) -> ProfileStore {
        ProfileStore::new(dir.join("profiles"))
    }

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn save_load_round_trip_drops_blank_lines() {
        let dir = tempdir().unwrap();
        let store = store(dir.path());

        store
            .save("survival", &names(&["Sodium", "  ", " AppleSkin "]))
            .await
            .unwrap();

        assert_eq!(
            store.load("survival").await.unwrap(),
            names(&["Sodium", "AppleSkin"])
        );
    }

    #[tokio::test]
    async fn list_is_sorted_and_ignores_other_files() {
        let dir = tempdir().unwrap();
        let store = store(dir.path());
        assert!(store.list().await.unwrap().is_empty());

        store.save("zeta", &names(&["a"])).await.unwrap();
        store.save("alpha", &names(&["b"])).await.unwrap();
        std::fs::write(store.dir().join("notes.md"), "x").unwrap();

        assert_eq!(store.list().await.unwrap(), names(&["alpha", "zeta"]));
    }

    #[tokio::test]
    async fn save_overwrites() {
        let dir = tempdir().unwrap();
        let store = store(dir.path());

        store.save("p", &names(&["old"])).await.unwrap();
        store.save("p", &names(&["new"])).await.unwrap();

        assert_eq!(store.load("p").await.unwrap(), names(&["new"]));
    }

    #[tokio::test]
    async fn missing_profile_is_reported() {
        let dir = tempdir().unwrap();
        let store = store(dir.path());

        assert!(matches!(
            store.load("ghost").await,
            Err(PackerError::ProfileNotFound(_))
        ));
        assert!(matches!(
            store.delete("ghost").await,
            Err(PackerError::ProfileNotFound(_))
        ));
    }

    #[tokio::test]
    async fn delete_removes_profile() {
        let dir = tempdir().unwrap();
        let store = store(dir.path());

        store.save("p", &names(&["x"])).await.unwrap();
        store.delete("p").await.unwrap();

        assert!(store.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn names_with_separators_are_rejected() {
        let dir = tempdir().unwrap();
        let store = store(dir.path());

        for bad in ["", "  ", "..", "a/b", "a\\b"] {
            assert!(
                matches!(
                    store.save(bad, &names(&["x"])).await,
                    Err(PackerError::InvalidProfileName(_))
                ),
                "{bad:?}"
            );
        }
    }
}
