//! Stages 6-8: publish covers and frames once per piece size.
//!
//! Shared overlays depend only on the piece size, so one copy per size is
//! stored under `/covers/<size>` and `/frames/<size>`. A size counts as
//! published when its marker file exists remotely:
//!
//! | Kind | Marker |
//! |---|---|
//! | cover | `/covers/<size>/default_covers.png` |
//! | frame | `/frames/<size>/frame.png` |
//!
//! Covers and frames are checked independently; a size can have one
//! without the other.

use super::PipelineError;
use super::mirror::mirror_dirs;
use crate::generator::PuzzleGenerator;
use crate::storage::AssetStore;
use crate::types::{
    AssetKind, MirrorEntry, PuzzleDescriptor, SharedAsset, shared_marker_path, shared_remote_dir,
};
use tracing::{debug, info};

/// Piece sizes used in this batch, without duplicates, in first-seen order.
pub fn distinct_piece_sizes(descriptors: &[PuzzleDescriptor]) -> Vec<u32> {
    let mut sizes = Vec::new();
    for descriptor in descriptors {
        let size = descriptor.puzzle.piece_size;
        if !sizes.contains(&size) {
            sizes.push(size);
        }
    }
    sizes
}

/// Sizes whose marker for `kind` is not yet in storage. One check per size.
pub fn missing_sizes(
    storage: &dyn AssetStore,
    kind: AssetKind,
    sizes: &[u32],
) -> Result<Vec<u32>, PipelineError> {
    let mut missing = Vec::new();
    for &size in sizes {
        let marker = shared_marker_path(kind, size);
        if storage.exists(&marker)? {
            debug!("{kind} for size {size} already stored at {marker}");
        } else {
            missing.push(size);
        }
    }
    Ok(missing)
}

/// Render `kind` for each size, stopping at the first failure.
pub fn generate_shared_assets(
    generator: &impl PuzzleGenerator,
    kind: AssetKind,
    sizes: &[u32],
) -> Result<Vec<SharedAsset>, PipelineError> {
    sizes
        .iter()
        .map(|&size| {
            info!("Generating {kind} for piece size {size}");
            let result = match kind {
                AssetKind::Cover => generator.create_covers(size),
                AssetKind::Frame => generator.create_frame(size),
            };
            result.map_err(|source| PipelineError::SharedAsset { kind, size, source })
        })
        .collect()
}

/// Check, render and store whatever `kind` assets the batch is missing.
///
/// Returns the sizes that were generated.
pub fn publish_shared_assets(
    storage: &dyn AssetStore,
    generator: &impl PuzzleGenerator,
    kind: AssetKind,
    sizes: &[u32],
) -> Result<Vec<u32>, PipelineError> {
    let missing = missing_sizes(storage, kind, sizes)?;
    if missing.is_empty() {
        return Ok(missing);
    }

    let assets = generate_shared_assets(generator, kind, &missing)?;
    let entries: Vec<MirrorEntry> = assets
        .iter()
        .map(|asset| MirrorEntry {
            local_dir: asset.result_dir.clone(),
            remote_dir: shared_remote_dir(asset.kind, asset.size),
        })
        .collect();
    mirror_dirs(storage, &entries)?;
    info!("Stored {kind} for sizes {missing:?}");
    Ok(missing)
}
