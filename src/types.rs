//! Data shared between pipeline stages.
//!
//! A puzzle moves through two shapes during a run:
//!
//! ```text
//! GeneratedPuzzle   (generator output, no id yet)
//!       │  assign_ids
//!       ▼
//! PuzzleDescriptor  (id + generated puzzle: mirrorable and committable)
//! ```
//!
//! Storage placement and metadata commits only accept [`PuzzleDescriptor`],
//! so a puzzle without an id can never reach a remote path or the catalog.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Opaque puzzle identifier handed out by the metadata store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PuzzleId(String);

impl PuzzleId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PuzzleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Per-run options forwarded to the generator for every image.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenerationOptions {
    /// Display name. When absent the generator derives one from the filename.
    pub name: Option<String>,
    /// Edge length of one piece in pixels. When absent the generator default applies.
    pub piece_size: Option<u32>,
    /// Marks the puzzle as not publicly listed.
    pub private: bool,
}

/// Piece-set metadata produced by the generator for one image.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedPuzzle {
    pub name: String,
    pub private: bool,
    pub piece_size: u32,
    /// Pieces per edge of one sprite sheet.
    pub sprite_size: u32,
    /// Grid width in pieces.
    pub h_length: u32,
    /// Grid height in pieces.
    pub v_length: u32,
    /// Passed through to the metadata store untouched.
    pub piece_map: serde_json::Value,
    /// Local directory holding the generated files.
    pub result_dir: PathBuf,
}

/// A generated puzzle that has been assigned its id.
#[derive(Debug, Clone, PartialEq)]
pub struct PuzzleDescriptor {
    pub puzzle_id: PuzzleId,
    pub puzzle: GeneratedPuzzle,
}

impl PuzzleDescriptor {
    /// The envelope persisted next to the piece map.
    pub fn record(&self) -> PuzzleRecord {
        PuzzleRecord {
            id: self.puzzle_id.clone(),
            name: self.puzzle.name.clone(),
            private: self.puzzle.private,
            piece_size: self.puzzle.piece_size,
            sprite_size: self.puzzle.sprite_size,
            h_length: self.puzzle.h_length,
            v_length: self.puzzle.v_length,
        }
    }
}

/// Descriptor fields committed to the metadata store.
///
/// `result_dir` is deliberately absent: it is a local, transient path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PuzzleRecord {
    pub id: PuzzleId,
    pub name: String,
    pub private: bool,
    pub piece_size: u32,
    pub sprite_size: u32,
    pub h_length: u32,
    pub v_length: u32,
}

/// Shared overlay kinds generated once per piece size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssetKind {
    Cover,
    Frame,
}

impl AssetKind {
    /// Remote directory holding every size of this kind.
    pub fn remote_root(self) -> &'static str {
        match self {
            AssetKind::Cover => "/covers",
            AssetKind::Frame => "/frames",
        }
    }

    /// File whose presence means the asset for a size is already published.
    pub fn marker_file(self) -> &'static str {
        match self {
            AssetKind::Cover => "default_covers.png",
            AssetKind::Frame => "frame.png",
        }
    }
}

impl fmt::Display for AssetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssetKind::Cover => f.write_str("cover"),
            AssetKind::Frame => f.write_str("frame"),
        }
    }
}

/// A shared asset produced by the generator for one size.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SharedAsset {
    pub kind: AssetKind,
    pub size: u32,
    pub result_dir: PathBuf,
}

/// One directory-mirroring obligation: every file in `local_dir` goes under `remote_dir`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MirrorEntry {
    pub local_dir: PathBuf,
    pub remote_dir: String,
}

/// Remote directory for a puzzle's piece files.
pub fn puzzle_remote_dir(id: &PuzzleId) -> String {
    format!("/puzzles/{id}")
}

/// Remote directory for a shared asset of the given kind and size.
pub fn shared_remote_dir(kind: AssetKind, size: u32) -> String {
    format!("{}/{}", kind.remote_root(), size)
}

/// Remote path of the existence marker for a shared asset.
pub fn shared_marker_path(kind: AssetKind, size: u32) -> String {
    format!("{}/{}", shared_remote_dir(kind, size), kind.marker_file())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_descriptor() -> PuzzleDescriptor {
        PuzzleDescriptor {
            puzzle_id: PuzzleId::new("abc123"),
            puzzle: GeneratedPuzzle {
                name: "Harbour".into(),
                private: true,
                piece_size: 40,
                sprite_size: 5,
                h_length: 12,
                v_length: 8,
                piece_map: serde_json::json!({"pieces": []}),
                result_dir: PathBuf::from("/tmp/work/harbour"),
            },
        }
    }

    #[test]
    fn remote_paths_follow_storage_layout() {
        assert_eq!(puzzle_remote_dir(&PuzzleId::new("p1")), "/puzzles/p1");
        assert_eq!(shared_remote_dir(AssetKind::Cover, 20), "/covers/20");
        assert_eq!(shared_remote_dir(AssetKind::Frame, 20), "/frames/20");
        assert_eq!(
            shared_marker_path(AssetKind::Cover, 60),
            "/covers/60/default_covers.png"
        );
        assert_eq!(shared_marker_path(AssetKind::Frame, 60), "/frames/60/frame.png");
    }

    #[test]
    fn record_copies_generator_values_unchanged() {
        let descriptor = sample_descriptor();
        let record = descriptor.record();

        assert_eq!(record.id.as_str(), "abc123");
        assert_eq!(record.name, "Harbour");
        assert!(record.private);
        assert_eq!(record.piece_size, 40);
        assert_eq!(record.sprite_size, 5);
        assert_eq!(record.h_length, 12);
        assert_eq!(record.v_length, 8);
    }

    #[test]
    fn record_serializes_camel_case_without_result_dir() {
        let json = serde_json::to_value(sample_descriptor().record()).unwrap();
        assert_eq!(json["pieceSize"], 40);
        assert_eq!(json["hLength"], 12);
        assert_eq!(json["id"], "abc123");
        assert!(json.get("resultDir").is_none());
        assert!(json.get("result_dir").is_none());
    }
}
