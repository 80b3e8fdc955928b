//! Puzzle and shared-asset generation.
//!
//! The module is split into:
//! - **Calculations**: pure grid and sprite-sheet math (unit testable)
//! - **Trait**: [`PuzzleGenerator`], the contract the pipeline drives
//! - **Implementation**: [`RustGenerator`], built on the `image` crate
//!
//! | Operation | Output directory | Files |
//! |---|---|---|
//! | [`PuzzleGenerator::create_puzzle`] | `<work_dir>/puzzles/<scratch id>/` | `sprite_<sx>_<sy>.png`, `preview.png` |
//! | [`PuzzleGenerator::create_covers`] | `<work_dir>/covers/<size>/` | `default_covers.png`, `selected_covers.png` |
//! | [`PuzzleGenerator::create_frame`] | `<work_dir>/frames/<size>/` | `frame.png` |

mod calculations;
mod rust_generator;

pub use calculations::{PieceEntry, PieceMap, PuzzleGrid, SPRITE_SIZE, SpriteTile};
pub use rust_generator::RustGenerator;

use crate::types::{GeneratedPuzzle, GenerationOptions, SharedAsset};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GeneratorError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to decode {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("Failed to encode {path}: {source}")]
    Encode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("Piece size must be greater than 0")]
    ZeroPieceSize,
    #[error("Image {width}x{height} is smaller than one {piece_size}px piece")]
    ImageTooSmall {
        width: u32,
        height: u32,
        piece_size: u32,
    },
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Produces piece sets and shared overlays on local disk.
pub trait PuzzleGenerator {
    /// Slice one image into a piece set.
    fn create_puzzle(
        &self,
        image: &Path,
        options: &GenerationOptions,
    ) -> Result<GeneratedPuzzle, GeneratorError>;

    /// Render the cover overlays for pieces of `size` pixels.
    fn create_covers(&self, size: u32) -> Result<SharedAsset, GeneratorError>;

    /// Render the board frame for pieces of `size` pixels.
    fn create_frame(&self, size: u32) -> Result<SharedAsset, GeneratorError>;
}
