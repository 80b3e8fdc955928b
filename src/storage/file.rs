//! Local-disk storage backend.
//!
//! Remote paths resolve under a root directory: `/covers/20/frame.png` with
//! root `/srv/webroot` lands at `/srv/webroot/covers/20/frame.png`. Paths with
//! `..` components are rejected so nothing is written outside the root.

use super::{AssetStore, StorageError};
use std::fs;
use std::path::{Component, Path, PathBuf};

#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    /// Open (and create if needed) a store rooted at `root`.
    pub fn open(root: &Path) -> Result<Self, StorageError> {
        fs::create_dir_all(root).map_err(|source| StorageError::Connect {
            location: root.to_path_buf(),
            source,
        })?;
        Ok(Self {
            root: root.to_path_buf(),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Map a remote path onto the local filesystem.
    pub fn resolve(&self, remote: &str) -> Result<PathBuf, StorageError> {
        let relative = Path::new(remote.trim_start_matches('/'));
        let mut resolved = self.root.clone();
        for component in relative.components() {
            match component {
                Component::Normal(part) => resolved.push(part),
                Component::CurDir => {}
                _ => return Err(StorageError::InvalidPath(remote.to_string())),
            }
        }
        if resolved == self.root {
            return Err(StorageError::InvalidPath(remote.to_string()));
        }
        Ok(resolved)
    }
}

impl AssetStore for FileStore {
    fn put(&self, local: &Path, remote: &str) -> Result<(), StorageError> {
        let dest = self.resolve(remote)?;
        let put_err = |source| StorageError::Put {
            local: local.to_path_buf(),
            remote: remote.to_string(),
            source,
        };
        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent).map_err(put_err)?;
        }
        fs::copy(local, &dest).map_err(put_err)?;
        Ok(())
    }

    fn exists(&self, remote: &str) -> Result<bool, StorageError> {
        let path = self.resolve(remote)?;
        path.try_exists().map_err(|source| StorageError::Exists {
            remote: remote.to_string(),
            source,
        })
    }
}
