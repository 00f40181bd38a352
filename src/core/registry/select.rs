use super::model::{ReleaseChannel, VersionFile, VersionRecord};

/// Pick the version to download from a project's compatible versions.
///
/// Channels are scanned release, beta, alpha; within a channel the registry's
/// order is kept. The first version with at least one file wins and its first
/// file is the download target.
pub fn select_version(versions: &[VersionRecord]) -> Option<(&VersionRecord, &VersionFile)> {
    ReleaseChannel::PRIORITY.iter().find_map(|channel| {
        versions
            .iter()
            .filter(|version| version.version_type == *channel)
            .find_map(|version| version.files.first().map(|file| (version, file)))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn version(id: &str, channel: ReleaseChannel, has_file: bool) -> VersionRecord {
        let files = if has_file {
            vec![VersionFile {
                url: format!("https://cdn.example/{id}.jar"),
                filename: format!("{id}.jar"),
            }]
        } else {
            vec![]
        };
        VersionRecord {
            id: id.to_string(),
            version_type: channel,
            files,
            dependencies: vec![],
        }
    }

    #[test]
    fn release_beats_earlier_alpha() {
        let versions = vec![
            version("a", ReleaseChannel::Alpha, true),
            version("r", ReleaseChannel::Release, true),
        ];
        let (picked, file) = select_version(&versions).unwrap();
        assert_eq!(picked.id, "r");
        assert_eq!(file.filename, "r.jar");
    }

    #[test]
    fn release_without_files_falls_through_to_beta() {
        let versions = vec![
            version("r", ReleaseChannel::Release, false),
            version("b", ReleaseChannel::Beta, true),
        ];
        assert_eq!(select_version(&versions).unwrap().0.id, "b");
    }

    #[test]
    fn registry_order_is_kept_within_a_channel() {
        let versions = vec![
            version("newest", ReleaseChannel::Release, true),
            version("older", ReleaseChannel::Release, true),
        ];
        assert_eq!(select_version(&versions).unwrap().0.id, "newest");
    }

    #[test]
    fn first_file_is_used() {
        let mut record = version("r", ReleaseChannel::Release, true);
        record.files.push(VersionFile {
            url: "https://cdn.example/sources.jar".into(),
            filename: "sources.jar".into(),
        });
        let versions = vec![record];
        assert_eq!(select_version(&versions).unwrap().1.filename, "r.jar");
    }

    #[test]
    fn nothing_selectable() {
        let versions = vec![
            version("r", ReleaseChannel::Release, false),
            version("o", ReleaseChannel::Other, true),
        ];
        assert!(select_version(&versions).is_none());
        assert!(select_version(&[]).is_none());
    }
}
