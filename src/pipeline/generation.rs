//! Stage 2: slice every input image into a piece set.
//!
//! Images are processed one at a time in input order. A failing image is
//! logged and skipped; it never aborts the batch.

use crate::generator::PuzzleGenerator;
use crate::types::{GeneratedPuzzle, GenerationOptions};
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};

/// An input image that produced no puzzle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedImage {
    pub path: PathBuf,
    pub reason: String,
}

#[derive(Debug, Default)]
pub struct GenerationOutcome {
    /// Successful puzzles, in input order.
    pub puzzles: Vec<GeneratedPuzzle>,
    pub skipped: Vec<SkippedImage>,
}

pub fn generate_puzzles(
    generator: &impl PuzzleGenerator,
    images: &[PathBuf],
    options: &GenerationOptions,
) -> GenerationOutcome {
    let mut outcome = GenerationOutcome::default();

    for image in images {
        info!("Generating puzzle for {}", image.display());
        match generator.create_puzzle(image, options) {
            Ok(puzzle) => {
                info!(
                    "Created {} ({}x{} pieces of {}px)",
                    puzzle.name, puzzle.h_length, puzzle.v_length, puzzle.piece_size
                );
                outcome.puzzles.push(puzzle);
            }
            Err(e) => {
                error!("Puzzle generation for {} failed: {e}", image.display());
                outcome.skipped.push(skipped(image, e.to_string()));
            }
        }
    }

    if outcome.puzzles.is_empty() {
        warn!("No puzzles were generated from {} image(s)", images.len());
    }
    outcome
}

fn skipped(path: &Path, reason: String) -> SkippedImage {
    SkippedImage {
        path: path.to_path_buf(),
        reason,
    }
}
