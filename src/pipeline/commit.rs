//! Stage 5: persist each puzzle's record and piece map.

use crate::catalog::{CatalogError, MetadataStore, QueueIndex};
use crate::types::{PuzzleDescriptor, PuzzleId};
use tracing::info;

/// A puzzle that made it into the catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommittedPuzzle {
    pub puzzle_id: PuzzleId,
    pub name: String,
    pub piece_size: u32,
    pub queue_index: QueueIndex,
}

/// Add every descriptor in order, stopping at the first failure.
///
/// Records added before a failure stay in the catalog.
pub fn commit_puzzles(
    catalog: &mut dyn MetadataStore,
    descriptors: &[PuzzleDescriptor],
) -> Result<Vec<CommittedPuzzle>, CatalogError> {
    let mut committed = Vec::with_capacity(descriptors.len());
    for descriptor in descriptors {
        let queue_index = catalog.add(&descriptor.puzzle.piece_map, &descriptor.record())?;
        info!(
            "Puzzle {} committed with queue index {queue_index}",
            descriptor.puzzle_id
        );
        committed.push(CommittedPuzzle {
            puzzle_id: descriptor.puzzle_id.clone(),
            name: descriptor.puzzle.name.clone(),
            piece_size: descriptor.puzzle.piece_size,
            queue_index,
        });
    }
    Ok(committed)
}
