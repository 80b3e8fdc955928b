//! Directory mirroring into the asset store.
//!
//! Every file directly inside `local_dir` is stored as
//! `remote_dir/<file name>`. Symlinks are followed; subdirectories are not
//! descended into. The directory is listed in full before anything is
//! uploaded, so a name that cannot become a remote key stops the mirror
//! with nothing from that directory stored. Files are then uploaded one at
//! a time in file-name order and the first failure stops the whole mirror.

use super::PipelineError;
use crate::storage::{AssetStore, join_remote};
use crate::types::MirrorEntry;
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

/// A local file and the name it is stored under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalFile {
    pub name: String,
    pub path: PathBuf,
}

/// Mirror every entry in order. Returns the number of files stored.
pub fn mirror_dirs(
    storage: &dyn AssetStore,
    entries: &[MirrorEntry],
) -> Result<usize, PipelineError> {
    let mut stored = 0;
    for entry in entries {
        stored += mirror_dir(storage, entry)?;
    }
    Ok(stored)
}

pub fn mirror_dir(storage: &dyn AssetStore, entry: &MirrorEntry) -> Result<usize, PipelineError> {
    let files = list_files(&entry.local_dir)?;
    for file in &files {
        let remote = join_remote(&entry.remote_dir, &file.name);
        debug!("Saving {} to storage as {remote}", file.path.display());
        storage.put(&file.path, &remote)?;
    }
    Ok(files.len())
}

/// Files directly inside `dir`, sorted by name.
///
/// Names must be valid UTF-8: remote keys are strings and a lossy
/// conversion would store the file under a different name.
pub fn list_files(dir: &Path) -> Result<Vec<LocalFile>, PipelineError> {
    let mut files = Vec::new();
    for entry in WalkDir::new(dir)
        .follow_links(true)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
    {
        let entry = entry.map_err(|source| PipelineError::Listing {
            dir: dir.to_path_buf(),
            source,
        })?;
        if !entry.file_type().is_file() {
            continue;
        }
        let Some(name) = entry.file_name().to_str().map(str::to_string) else {
            return Err(PipelineError::InvalidFileName(entry.path().to_path_buf()));
        };
        files.push(LocalFile {
            name,
            path: entry.into_path(),
        });
    }
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{MockStore, StoreOp};
    use std::fs;
    use tempfile::TempDir;

    fn dir_with(tmp: &TempDir, name: &str, files: &[&str]) -> PathBuf {
        let dir = tmp.path().join(name);
        fs::create_dir_all(&dir).unwrap();
        for f in files {
            fs::write(dir.join(f), f).unwrap();
        }
        dir
    }

    #[test]
    fn every_file_lands_under_remote_dir() {
        let tmp = TempDir::new().unwrap();
        let local = dir_with(&tmp, "p", &["sprite_1_0.png", "preview.png", "sprite_0_0.png"]);
        let store = MockStore::new();

        let stored = mirror_dir(
            &store,
            &MirrorEntry {
                local_dir: local,
                remote_dir: "/puzzles/id1".into(),
            },
        )
        .unwrap();

        assert_eq!(stored, 3);
        assert_eq!(
            store.puts(),
            vec![
                "/puzzles/id1/preview.png",
                "/puzzles/id1/sprite_0_0.png",
                "/puzzles/id1/sprite_1_0.png",
            ]
        );
    }

    #[test]
    fn subdirectories_are_not_mirrored() {
        let tmp = TempDir::new().unwrap();
        let local = dir_with(&tmp, "p", &["a.png"]);
        fs::create_dir_all(local.join("nested")).unwrap();
        fs::write(local.join("nested/b.png"), "b").unwrap();

        let files = list_files(&local).unwrap();
        assert_eq!(
            files,
            vec![LocalFile {
                name: "a.png".into(),
                path: local.join("a.png"),
            }]
        );
    }

    #[cfg(unix)]
    #[test]
    fn symlinked_files_are_mirrored() {
        let tmp = TempDir::new().unwrap();
        let target = dir_with(&tmp, "elsewhere", &["shared.png"]).join("shared.png");
        let local = dir_with(&tmp, "p", &["a.png"]);
        std::os::unix::fs::symlink(&target, local.join("b.png")).unwrap();
        let store = MockStore::new();

        mirror_dir(
            &store,
            &MirrorEntry {
                local_dir: local,
                remote_dir: "/puzzles/id1".into(),
            },
        )
        .unwrap();

        assert_eq!(store.puts(), vec!["/puzzles/id1/a.png", "/puzzles/id1/b.png"]);
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn non_utf8_name_stops_before_any_put() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let tmp = TempDir::new().unwrap();
        let local = dir_with(&tmp, "p", &["a.png"]);
        let odd = local.join(OsStr::from_bytes(b"b\xff.png"));
        fs::write(&odd, "b").unwrap();
        let store = MockStore::new();

        let result = mirror_dir(
            &store,
            &MirrorEntry {
                local_dir: local,
                remote_dir: "/puzzles/id1".into(),
            },
        );

        assert!(matches!(result, Err(PipelineError::InvalidFileName(path)) if path == odd));
        assert!(store.puts().is_empty());
    }

    #[test]
    fn first_put_failure_stops_mirroring() {
        let tmp = TempDir::new().unwrap();
        let first = dir_with(&tmp, "one", &["a.png", "b.png", "c.png"]);
        let second = dir_with(&tmp, "two", &["d.png"]);
        let store = MockStore::new().failing_put_on("/one/b.png");

        let result = mirror_dirs(
            &store,
            &[
                MirrorEntry {
                    local_dir: first,
                    remote_dir: "/one".into(),
                },
                MirrorEntry {
                    local_dir: second,
                    remote_dir: "/two".into(),
                },
            ],
        );

        assert!(matches!(result, Err(PipelineError::Storage(_))));
        assert_eq!(store.puts(), vec!["/one/a.png", "/one/b.png"]);
    }

    #[test]
    fn missing_local_dir_is_listing_error() {
        let tmp = TempDir::new().unwrap();
        let result = list_files(&tmp.path().join("gone"));
        assert!(matches!(result, Err(PipelineError::Listing { .. })));
    }

    #[test]
    fn put_receives_local_file_path() {
        let tmp = TempDir::new().unwrap();
        let local = dir_with(&tmp, "p", &["frame.png"]);
        let store = MockStore::new();

        mirror_dir(
            &store,
            &MirrorEntry {
                local_dir: local.clone(),
                remote_dir: "/frames/20".into(),
            },
        )
        .unwrap();

        assert_eq!(
            store.get_operations(),
            vec![StoreOp::Put {
                local: local.join("frame.png"),
                remote: "/frames/20/frame.png".into(),
            }]
        );
    }
}
