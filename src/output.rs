//! CLI output formatting for a finished run.
//!
//! Output is **information-centric**: each puzzle leads with its positional
//! index and display name, with its id and queue position as indented
//! context lines. Log messages (tracing, stderr) narrate the run as it
//! happens; this module prints the inventory once it is over (stdout).
//!
//! # Output Format
//!
//! ```text
//! Puzzles
//! 001 Dunes → queue 17
//!     Id: 3f2a9c0d41e84b7f9a6c2d5e8b1f0a47
//!     Pieces: 20px
//! 002 Harbour → queue 18
//!     Id: 9b0e7d2c5a3f4e1d8c6b2a0f9e7d5c3b
//!     Pieces: 40px
//!
//! Skipped
//! 001 broken.jpg
//!     Reason: Failed to decode broken.jpg: …
//!
//! Shared assets
//!     Covers: 20px generated, 40px stored
//!     Frames: 20px stored, 40px stored
//!
//! Committed 2 puzzles, skipped 1 image
//! ```
//!
//! # Architecture
//!
//! [`format_run_summary`] returns `Vec<String>` for testability and
//! [`print_run_summary`] writes it to stdout.

use crate::pipeline::RunSummary;

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

fn plural(n: usize, word: &str) -> String {
    if n == 1 {
        format!("{n} {word}")
    } else {
        format!("{n} {word}s")
    }
}

/// One line per shared-asset kind: each size marked generated or stored.
fn asset_line(label: &str, sizes: &[u32], generated: &[u32]) -> String {
    let parts: Vec<String> = sizes
        .iter()
        .map(|size| {
            let status = if generated.contains(size) {
                "generated"
            } else {
                "stored"
            };
            format!("{size}px {status}")
        })
        .collect();
    format!("{}{}: {}", indent(1), label, parts.join(", "))
}

pub fn format_run_summary(summary: &RunSummary) -> Vec<String> {
    let mut lines = Vec::new();

    if !summary.committed.is_empty() {
        lines.push("Puzzles".to_string());
        for (i, puzzle) in summary.committed.iter().enumerate() {
            lines.push(format!(
                "{} {} \u{2192} queue {}",
                format_index(i + 1),
                puzzle.name,
                puzzle.queue_index
            ));
            lines.push(format!("{}Id: {}", indent(1), puzzle.puzzle_id));
            lines.push(format!("{}Pieces: {}px", indent(1), puzzle.piece_size));
        }
    }

    if !summary.skipped.is_empty() {
        if !lines.is_empty() {
            lines.push(String::new());
        }
        lines.push("Skipped".to_string());
        for (i, skipped) in summary.skipped.iter().enumerate() {
            let filename = skipped
                .path
                .file_name()
                .map(|f| f.to_string_lossy().into_owned())
                .unwrap_or_else(|| skipped.path.display().to_string());
            lines.push(format!("{} {}", format_index(i + 1), filename));
            lines.push(format!("{}Reason: {}", indent(1), skipped.reason));
        }
    }

    if !summary.piece_sizes.is_empty() {
        lines.push(String::new());
        lines.push("Shared assets".to_string());
        lines.push(asset_line(
            "Covers",
            &summary.piece_sizes,
            &summary.covers_generated,
        ));
        lines.push(asset_line(
            "Frames",
            &summary.piece_sizes,
            &summary.frames_generated,
        ));
    }

    if !lines.is_empty() {
        lines.push(String::new());
    }
    lines.push(format!(
        "Committed {}, skipped {}",
        plural(summary.committed.len(), "puzzle"),
        plural(summary.skipped.len(), "image")
    ));
    lines
}

/// Print the run summary to stdout.
pub fn print_run_summary(summary: &RunSummary) {
    for line in format_run_summary(summary) {
        println!("{}", line);
    }
}
