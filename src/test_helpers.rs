//! Shared test doubles for the pipeline stages.
//!
//! Each mock records the calls it receives so tests can assert on call
//! counts and ordering. They use `Mutex` (not `RefCell`) to match the
//! `&self` signatures of the traits they implement.
//!
//! ```rust
//! let tmp = TempDir::new().unwrap();
//! let generator = MockGenerator::new(tmp.path()).with_piece_size("a.jpg", 20);
//! let store = MockStore::new();
//! let mut catalog = MockCatalog::new();
//! ```

use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::catalog::{CatalogError, MetadataStore, QueueIndex};
use crate::generator::{GeneratorError, PuzzleGenerator};
use crate::storage::{AssetStore, StorageError};
use crate::types::{
    AssetKind, GeneratedPuzzle, GenerationOptions, PuzzleId, PuzzleRecord, SharedAsset,
};

/// Files every mock piece set contains, in listing order.
pub const MOCK_PIECE_FILES: &[&str] = &["preview.png", "sprite_0_0.png", "sprite_1_0.png"];

// =========================================================================
// Storage
// =========================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreOp {
    Put { local: PathBuf, remote: String },
    Exists(String),
}

/// In-memory store that records every call.
#[derive(Default)]
pub struct MockStore {
    pub operations: Mutex<Vec<StoreOp>>,
    existing: Mutex<HashSet<String>>,
    fail_put_on: Option<String>,
    fail_exists: bool,
}

impl MockStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Report `remote` as already present.
    pub fn with_existing(self, remote: &str) -> Self {
        self.existing.lock().unwrap().insert(remote.to_string());
        self
    }

    /// Fail the put whose remote path ends with `suffix`.
    pub fn failing_put_on(mut self, suffix: &str) -> Self {
        self.fail_put_on = Some(suffix.to_string());
        self
    }

    pub fn failing_exists(mut self) -> Self {
        self.fail_exists = true;
        self
    }

    pub fn get_operations(&self) -> Vec<StoreOp> {
        self.operations.lock().unwrap().clone()
    }

    pub fn puts(&self) -> Vec<String> {
        self.get_operations()
            .into_iter()
            .filter_map(|op| match op {
                StoreOp::Put { remote, .. } => Some(remote),
                StoreOp::Exists(_) => None,
            })
            .collect()
    }

    pub fn exists_checks(&self) -> Vec<String> {
        self.get_operations()
            .into_iter()
            .filter_map(|op| match op {
                StoreOp::Exists(remote) => Some(remote),
                StoreOp::Put { .. } => None,
            })
            .collect()
    }
}

impl AssetStore for MockStore {
    fn put(&self, local: &Path, remote: &str) -> Result<(), StorageError> {
        self.operations.lock().unwrap().push(StoreOp::Put {
            local: local.to_path_buf(),
            remote: remote.to_string(),
        });
        if let Some(suffix) = &self.fail_put_on
            && remote.ends_with(suffix.as_str())
        {
            return Err(StorageError::Put {
                local: local.to_path_buf(),
                remote: remote.to_string(),
                source: std::io::Error::other("mock put failure"),
            });
        }
        self.existing.lock().unwrap().insert(remote.to_string());
        Ok(())
    }

    fn exists(&self, remote: &str) -> Result<bool, StorageError> {
        self.operations
            .lock()
            .unwrap()
            .push(StoreOp::Exists(remote.to_string()));
        if self.fail_exists {
            return Err(StorageError::Exists {
                remote: remote.to_string(),
                source: std::io::Error::other("mock exists failure"),
            });
        }
        Ok(self.existing.lock().unwrap().contains(remote))
    }
}

// =========================================================================
// Catalog
// =========================================================================

/// Catalog that keeps records in memory and hands out sequential ids.
#[derive(Default)]
pub struct MockCatalog {
    pub added: Vec<(serde_json::Value, PuzzleRecord)>,
    pub issued_ids: Vec<PuzzleId>,
    fail_add_at: Option<usize>,
    next_queue_index: QueueIndex,
}

impl MockCatalog {
    pub fn new() -> Self {
        Self {
            next_queue_index: 1,
            ..Default::default()
        }
    }

    /// Fail the add call with this zero-based position.
    pub fn failing_add_at(mut self, position: usize) -> Self {
        self.fail_add_at = Some(position);
        self
    }

    /// Start queue indexes at `index`, as if earlier runs committed puzzles.
    pub fn starting_at(mut self, index: QueueIndex) -> Self {
        self.next_queue_index = index;
        self
    }
}

impl MetadataStore for MockCatalog {
    fn generate_id(&mut self) -> PuzzleId {
        let id = PuzzleId::new(format!("id{}", self.issued_ids.len() + 1));
        self.issued_ids.push(id.clone());
        id
    }

    fn add(
        &mut self,
        piece_map: &serde_json::Value,
        record: &PuzzleRecord,
    ) -> Result<QueueIndex, CatalogError> {
        if self.fail_add_at == Some(self.added.len()) {
            return Err(CatalogError::Write {
                path: PathBuf::from("mock://catalog"),
                source: std::io::Error::other("mock add failure"),
            });
        }
        self.added.push((piece_map.clone(), record.clone()));
        let index = self.next_queue_index;
        self.next_queue_index += 1;
        Ok(index)
    }
}

// =========================================================================
// Generator
// =========================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GeneratorOp {
    CreatePuzzle(PathBuf),
    CreateCovers(u32),
    CreateFrame(u32),
}

/// Generator that writes small placeholder files instead of slicing images.
///
/// Images are matched by file name. Unknown images get piece size 20;
/// images marked failing return an error.
pub struct MockGenerator {
    work_dir: PathBuf,
    piece_sizes: HashMap<String, u32>,
    failing: HashSet<String>,
    fail_shared: Option<AssetKind>,
    pub operations: Mutex<Vec<GeneratorOp>>,
}

impl MockGenerator {
    pub fn new(work_dir: &Path) -> Self {
        Self {
            work_dir: work_dir.to_path_buf(),
            piece_sizes: HashMap::new(),
            failing: HashSet::new(),
            fail_shared: None,
            operations: Mutex::new(Vec::new()),
        }
    }

    pub fn with_piece_size(mut self, image: &str, size: u32) -> Self {
        self.piece_sizes.insert(image.to_string(), size);
        self
    }

    pub fn failing_on(mut self, image: &str) -> Self {
        self.failing.insert(image.to_string());
        self
    }

    pub fn failing_shared(mut self, kind: AssetKind) -> Self {
        self.fail_shared = Some(kind);
        self
    }

    pub fn get_operations(&self) -> Vec<GeneratorOp> {
        self.operations.lock().unwrap().clone()
    }

    pub fn count(&self, op: &GeneratorOp) -> usize {
        self.get_operations().iter().filter(|o| *o == op).count()
    }

    fn write_files(dir: &Path, names: &[&str]) -> Result<(), GeneratorError> {
        fs::create_dir_all(dir)?;
        for name in names {
            fs::write(dir.join(name), name.as_bytes())?;
        }
        Ok(())
    }

    fn shared(&self, kind: AssetKind, size: u32) -> Result<SharedAsset, GeneratorError> {
        if self.fail_shared == Some(kind) {
            return Err(GeneratorError::Io(std::io::Error::other("mock render failure")));
        }
        let dir = self.work_dir.join(format!("{kind}-{size}"));
        Self::write_files(&dir, &[kind.marker_file()])?;
        Ok(SharedAsset {
            kind,
            size,
            result_dir: dir,
        })
    }
}

impl PuzzleGenerator for MockGenerator {
    fn create_puzzle(
        &self,
        image: &Path,
        options: &GenerationOptions,
    ) -> Result<GeneratedPuzzle, GeneratorError> {
        let call = {
            let mut ops = self.operations.lock().unwrap();
            ops.push(GeneratorOp::CreatePuzzle(image.to_path_buf()));
            ops.len()
        };
        let file_name = image
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        if self.failing.contains(&file_name) {
            return Err(GeneratorError::ImageTooSmall {
                width: 1,
                height: 1,
                piece_size: 20,
            });
        }

        let piece_size = options
            .piece_size
            .or_else(|| self.piece_sizes.get(&file_name).copied())
            .unwrap_or(20);
        let result_dir = self.work_dir.join(format!("puzzle-{call}"));
        Self::write_files(&result_dir, MOCK_PIECE_FILES)?;

        Ok(GeneratedPuzzle {
            name: options.name.clone().unwrap_or(file_name),
            private: options.private,
            piece_size,
            sprite_size: 5,
            h_length: 8,
            v_length: 6,
            piece_map: serde_json::json!({ "source": image.to_string_lossy() }),
            result_dir,
        })
    }

    fn create_covers(&self, size: u32) -> Result<SharedAsset, GeneratorError> {
        self.operations
            .lock()
            .unwrap()
            .push(GeneratorOp::CreateCovers(size));
        self.shared(AssetKind::Cover, size)
    }

    fn create_frame(&self, size: u32) -> Result<SharedAsset, GeneratorError> {
        self.operations
            .lock()
            .unwrap()
            .push(GeneratorOp::CreateFrame(size));
        self.shared(AssetKind::Frame, size)
    }
}
