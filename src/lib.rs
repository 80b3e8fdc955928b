//! # Piecework
//!
//! Batch ingestion for a jigsaw puzzle site. Each input image is sliced into
//! a piece set, the files are published to storage under a fresh puzzle id,
//! the puzzle's record is committed to the metadata store, and the shared
//! cover and frame overlays for every piece size in the batch are published
//! once.
//!
//! # Architecture: One Sequential Run
//!
//! ```text
//! images ─▶ generator ─▶ ids ─▶ storage (/puzzles/<id>) ─▶ catalog
//!                                   │
//!                                   └─▶ /covers/<size>, /frames/<size>
//! ```
//!
//! Stages run strictly one after another (see [`pipeline`]). The three
//! collaborators sit behind traits so every stage can be exercised with
//! in-memory mocks:
//!
//! - [`generator::PuzzleGenerator`]: image slicing and overlay rendering
//! - [`storage::AssetStore`]: `put` and `exists` on remote paths
//! - [`catalog::MetadataStore`]: id issuing and record persistence
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`pipeline`] | Run orchestration: generation, ids, mirroring, commit, shared assets |
//! | [`generator`] | Grid math and the `image`-based piece-set renderer |
//! | [`storage`] | Asset store trait and the local-directory backend |
//! | [`catalog`] | Metadata store trait and the JSON-document backend |
//! | [`config`] | Layered configuration: defaults, environment, override files |
//! | [`types`] | Data passed between stages and the remote path layout |
//! | [`naming`] | `NNN-name` filename convention for default puzzle names |
//! | [`output`] | CLI summary formatting |
//!
//! # Design Decisions
//!
//! ## Sequential by Default
//!
//! Every stage finishes before the next starts and every file is stored one
//! at a time. A failure therefore has a precise position: files before it are
//! stored, files after it were never attempted, and no record is committed
//! for a puzzle whose files did not all reach storage.
//!
//! ## Ids Before Placement
//!
//! A [`types::GeneratedPuzzle`] has no id and cannot be mirrored or
//! committed. Only a [`types::PuzzleDescriptor`] can, so a remote path can
//! never be built from a missing id.
//!
//! ## Shared Assets Keyed by Size
//!
//! Covers and frames depend only on the piece size. The existence of a
//! marker file under `/covers/<size>` or `/frames/<size>` means that size is
//! published, and it is never regenerated.

pub mod catalog;
pub mod config;
pub mod generator;
pub mod naming;
pub mod output;
pub mod pipeline;
pub mod storage;
pub mod types;

#[cfg(test)]
pub(crate) mod test_helpers;
