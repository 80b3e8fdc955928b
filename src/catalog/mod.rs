//! Metadata store for committed puzzles.
//!
//! Every committed puzzle receives a queue index: its insertion rank among
//! all puzzles ever committed to the store. Indexes are strictly increasing
//! across runs, so the order in which puzzles were ingested can be recovered.
//!
//! The production implementation is [`FileCatalog`], a JSON document on local
//! disk. A MongoDB collection can be configured with `metadata.type =
//! "mongodb"`; its client lives outside this crate and [`connect`] reports it
//! as unsupported.

mod file;

pub use file::{CatalogEntry, FileCatalog};

use crate::config::{MetadataKind, PipelineConfig};
use crate::types::{PuzzleId, PuzzleRecord};
use std::path::PathBuf;
use thiserror::Error;

/// Insertion rank assigned by the store to a committed puzzle.
pub type QueueIndex = u64;

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Failed to read catalog {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to write catalog {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Catalog {path} is corrupt: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("Catalog {path} has format version {found}, expected {expected}")]
    VersionMismatch {
        path: PathBuf,
        found: u32,
        expected: u32,
    },
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Puzzle {0} is already in the catalog")]
    Duplicate(PuzzleId),
    #[error("Metadata backend \"{0}\" is not available in this build")]
    UnsupportedBackend(String),
}

/// Persistent store of puzzle records.
pub trait MetadataStore {
    /// A fresh identifier, unique within this store.
    fn generate_id(&mut self) -> PuzzleId;

    /// Persist a record and its piece map, returning the assigned queue index.
    fn add(
        &mut self,
        piece_map: &serde_json::Value,
        record: &PuzzleRecord,
    ) -> Result<QueueIndex, CatalogError>;
}

/// Open the metadata store selected by `config`.
pub fn connect(config: &PipelineConfig) -> Result<Box<dyn MetadataStore>, CatalogError> {
    match config.metadata.kind {
        MetadataKind::File => {
            let path = config
                .metadata
                .location
                .join(format!("{}.json", config.mongodb.database));
            Ok(Box::new(FileCatalog::open(&path)?))
        }
        MetadataKind::Mongodb => Err(CatalogError::UnsupportedBackend(format!(
            "mongodb://{}@{}/{}",
            config.mongodb.user, config.mongodb.host, config.mongodb.database
        ))),
    }
}
