//! Batch ingestion: turn a list of images into published puzzles.
//!
//! A run executes these stages strictly in order, each one finishing before
//! the next begins:
//!
//! ```text
//! 1. connect        storage, then metadata store
//! 2. generation     create_puzzle per image; failures are skipped
//! 3. assign ids     one fresh id per generated puzzle
//! 4. mirror         piece files → /puzzles/<id>/
//! 5. commit         record + piece map → metadata store
//! 6. sizes          distinct piece sizes of the batch
//! 7. covers         missing /covers/<size> generated and stored
//! 8. frames         missing /frames/<size> generated and stored
//! ```
//!
//! Per-image generation failures are the only tolerated errors. Anything
//! that goes wrong from stage 3 on aborts the run with the work already
//! done left in place: files stored before a failed put remain, and records
//! committed before a failed add remain.

pub mod commit;
pub mod generation;
pub mod mirror;
pub mod shared_assets;

pub use commit::CommittedPuzzle;
pub use generation::SkippedImage;

use crate::catalog::{self, CatalogError, MetadataStore};
use crate::config::PipelineConfig;
use crate::generator::{GeneratorError, PuzzleGenerator};
use crate::storage::{self, AssetStore, StorageError};
use crate::types::{
    AssetKind, GeneratedPuzzle, GenerationOptions, MirrorEntry, PuzzleDescriptor,
    puzzle_remote_dir,
};
use std::path::PathBuf;
use thiserror::Error;
use tracing::info;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("No input images given")]
    NoImages,
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
    #[error("Metadata error: {0}")]
    Catalog(#[from] CatalogError),
    #[error("Failed to list {dir}: {source}")]
    Listing {
        dir: PathBuf,
        #[source]
        source: walkdir::Error,
    },
    #[error("File name {0} is not valid UTF-8")]
    InvalidFileName(PathBuf),
    #[error("Failed to generate {kind} for piece size {size}: {source}")]
    SharedAsset {
        kind: AssetKind,
        size: u32,
        #[source]
        source: GeneratorError,
    },
}

/// The two connected collaborators every stage after generation uses.
pub struct RunContext<'a> {
    pub storage: &'a dyn AssetStore,
    pub catalog: &'a mut dyn MetadataStore,
}

/// What a completed run did.
#[derive(Debug, Default)]
pub struct RunSummary {
    /// Committed puzzles with their queue indexes, in input order.
    pub committed: Vec<CommittedPuzzle>,
    pub skipped: Vec<SkippedImage>,
    /// Distinct piece sizes of the batch, first-seen order.
    pub piece_sizes: Vec<u32>,
    pub covers_generated: Vec<u32>,
    pub frames_generated: Vec<u32>,
    /// Number of piece files stored under `/puzzles`.
    pub files_stored: usize,
}

/// Connect the backends named in `config` and run the whole batch.
pub fn run(
    config: &PipelineConfig,
    generator: &impl PuzzleGenerator,
    images: &[PathBuf],
    options: &GenerationOptions,
) -> Result<RunSummary, PipelineError> {
    if images.is_empty() {
        return Err(PipelineError::NoImages);
    }

    let storage = storage::connect(&config.storage)?;
    info!("Connected to {:?} storage", config.storage.kind);
    let mut catalog = catalog::connect(config)?;
    info!("Connected to {:?} metadata store", config.metadata.kind);

    let mut ctx = RunContext {
        storage: storage.as_ref(),
        catalog: catalog.as_mut(),
    };
    run_with_context(&mut ctx, generator, images, options)
}

/// Stages 2-8 against already-connected collaborators.
pub fn run_with_context(
    ctx: &mut RunContext<'_>,
    generator: &impl PuzzleGenerator,
    images: &[PathBuf],
    options: &GenerationOptions,
) -> Result<RunSummary, PipelineError> {
    let outcome = generation::generate_puzzles(generator, images, options);
    let descriptors = assign_ids(ctx.catalog, outcome.puzzles);

    let files_stored = mirror::mirror_dirs(ctx.storage, &puzzle_mirror_entries(&descriptors))?;
    info!("All puzzle files are saved to storage ({files_stored} files)");

    let committed = commit::commit_puzzles(ctx.catalog, &descriptors)?;

    let piece_sizes = shared_assets::distinct_piece_sizes(&descriptors);
    let covers_generated = shared_assets::publish_shared_assets(
        ctx.storage,
        generator,
        AssetKind::Cover,
        &piece_sizes,
    )?;
    let frames_generated = shared_assets::publish_shared_assets(
        ctx.storage,
        generator,
        AssetKind::Frame,
        &piece_sizes,
    )?;

    Ok(RunSummary {
        committed,
        skipped: outcome.skipped,
        piece_sizes,
        covers_generated,
        frames_generated,
        files_stored,
    })
}

/// Pair each generated puzzle with a fresh id, preserving order.
pub fn assign_ids(
    catalog: &mut dyn MetadataStore,
    puzzles: Vec<GeneratedPuzzle>,
) -> Vec<PuzzleDescriptor> {
    puzzles
        .into_iter()
        .map(|puzzle| PuzzleDescriptor {
            puzzle_id: catalog.generate_id(),
            puzzle,
        })
        .collect()
}

fn puzzle_mirror_entries(descriptors: &[PuzzleDescriptor]) -> Vec<MirrorEntry> {
    descriptors
        .iter()
        .map(|d| MirrorEntry {
            local_dir: d.puzzle.result_dir.clone(),
            remote_dir: puzzle_remote_dir(&d.puzzle_id),
        })
        .collect()
}
