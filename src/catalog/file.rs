//! JSON-document catalog on local disk.
//!
//! The whole catalog is one compact JSON file, shown here pretty-printed:
//!
//! ```json
//! {
//!   "version": 1,
//!   "next_queue_index": 3,
//!   "puzzles": [
//!     { "record": { "id": "…", "name": "Dunes", … }, "pieceMap": { … }, "queueIndex": 1 },
//!     { "record": { … }, "pieceMap": { … }, "queueIndex": 2 }
//!   ]
//! }
//! ```
//!
//! The document is rewritten after every `add`, so a run that aborts later
//! keeps the puzzles it already committed. Unlike a build cache, a corrupt
//! or foreign-version catalog is an error: silently starting empty would
//! lose records and reuse queue indexes.

use super::{CatalogError, MetadataStore, QueueIndex};
use crate::types::{PuzzleId, PuzzleRecord};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

/// Version of the catalog document format.
const CATALOG_VERSION: u32 = 1;

/// One committed puzzle as stored on disk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogEntry {
    pub record: PuzzleRecord,
    pub piece_map: serde_json::Value,
    pub queue_index: QueueIndex,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct CatalogDocument {
    version: u32,
    next_queue_index: QueueIndex,
    puzzles: Vec<CatalogEntry>,
}

impl CatalogDocument {
    fn empty() -> Self {
        Self {
            version: CATALOG_VERSION,
            next_queue_index: 1,
            puzzles: Vec::new(),
        }
    }
}

#[derive(Debug)]
pub struct FileCatalog {
    path: PathBuf,
    document: CatalogDocument,
    /// Ids of every committed puzzle.
    ids: HashSet<PuzzleId>,
}

impl FileCatalog {
    /// Load the catalog at `path`, starting empty if the file does not exist yet.
    pub fn open(path: &Path) -> Result<Self, CatalogError> {
        let document = match fs::read_to_string(path) {
            Ok(content) => {
                let document: CatalogDocument =
                    serde_json::from_str(&content).map_err(|source| CatalogError::Corrupt {
                        path: path.to_path_buf(),
                        source,
                    })?;
                if document.version != CATALOG_VERSION {
                    return Err(CatalogError::VersionMismatch {
                        path: path.to_path_buf(),
                        found: document.version,
                        expected: CATALOG_VERSION,
                    });
                }
                document
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => CatalogDocument::empty(),
            Err(source) => {
                return Err(CatalogError::Read {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };
        let ids = document
            .puzzles
            .iter()
            .map(|e| e.record.id.clone())
            .collect();
        Ok(Self {
            path: path.to_path_buf(),
            document,
            ids,
        })
    }

    /// Committed puzzles in queue order.
    pub fn entries(&self) -> &[CatalogEntry] {
        &self.document.puzzles
    }

    pub fn find(&self, id: &PuzzleId) -> Option<&CatalogEntry> {
        self.document.puzzles.iter().find(|e| &e.record.id == id)
    }

    fn save(&self) -> Result<(), CatalogError> {
        let write_err = |source| CatalogError::Write {
            path: self.path.clone(),
            source,
        };
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(write_err)?;
        }
        let json = serde_json::to_string(&self.document)?;
        // Write-then-rename keeps the previous document intact if we die mid-write.
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json).map_err(write_err)?;
        fs::rename(&tmp, &self.path).map_err(write_err)?;
        Ok(())
    }
}

impl MetadataStore for FileCatalog {
    fn generate_id(&mut self) -> PuzzleId {
        PuzzleId::new(uuid::Uuid::new_v4().simple().to_string())
    }

    fn add(
        &mut self,
        piece_map: &serde_json::Value,
        record: &PuzzleRecord,
    ) -> Result<QueueIndex, CatalogError> {
        if self.ids.contains(&record.id) {
            return Err(CatalogError::Duplicate(record.id.clone()));
        }

        let queue_index = self.document.next_queue_index;
        self.document.puzzles.push(CatalogEntry {
            record: record.clone(),
            piece_map: piece_map.clone(),
            queue_index,
        });
        self.document.next_queue_index += 1;

        if let Err(e) = self.save() {
            // Keep memory consistent with disk.
            self.document.puzzles.pop();
            self.document.next_queue_index -= 1;
            return Err(e);
        }
        self.ids.insert(record.id.clone());
        Ok(queue_index)
    }
}
