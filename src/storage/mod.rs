//! Pluggable storage for published puzzle files.
//!
//! The pipeline only ever needs two operations from a backend:
//!
//! | Operation | Used by |
//! |---|---|
//! | [`AssetStore::put`] | mirroring local result directories |
//! | [`AssetStore::exists`] | shared-asset deduplication |
//!
//! Remote paths are `/`-separated and rooted (`/puzzles/<id>/sprite_0_0.png`);
//! each backend maps them onto its own namespace.
//!
//! The production implementation is [`FileStore`], which publishes into a
//! directory on local disk (typically a web root). Object storage is
//! configured through `storage.type = "s3"`, but its client lives outside
//! this crate; [`connect`] reports it as unsupported.

mod file;

pub use file::FileStore;

use crate::config::{StorageConfig, StorageKind};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Failed to open storage at {location}: {source}")]
    Connect {
        location: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to store {local} as {remote}: {source}")]
    Put {
        local: PathBuf,
        remote: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to check {remote}: {source}")]
    Exists {
        remote: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid remote path: {0}")]
    InvalidPath(String),
    #[error("Storage backend \"{0}\" is not available in this build")]
    UnsupportedBackend(String),
}

/// A destination for published files.
pub trait AssetStore {
    /// Copy the local file at `local` to `remote`, overwriting any existing object.
    fn put(&self, local: &Path, remote: &str) -> Result<(), StorageError>;

    /// Whether an object exists at `remote`.
    fn exists(&self, remote: &str) -> Result<bool, StorageError>;
}

/// Open the backend selected by `config`.
pub fn connect(config: &StorageConfig) -> Result<Box<dyn AssetStore>, StorageError> {
    match config.kind {
        StorageKind::File => Ok(Box::new(FileStore::open(&config.file.location)?)),
        StorageKind::S3 => Err(StorageError::UnsupportedBackend("s3".into())),
    }
}

/// Join a remote directory and a file name with exactly one `/`.
pub fn join_remote(dir: &str, name: &str) -> String {
    format!(
        "{}/{}",
        dir.trim_end_matches('/'),
        name.trim_start_matches('/')
    )
}
