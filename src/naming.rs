//! Default puzzle names derived from image filenames.
//!
//! Source images commonly carry an ordering prefix (`NNN-`) and use dashes or
//! underscores as word separators. The prefix is dropped and separators become
//! spaces:
//!
//! - `010-Sunny-Beach.jpg` → "Sunny Beach"
//! - `old_harbour.png` → "old harbour"
//! - `007.jpg` → "007" (a bare number is kept rather than producing an empty name)

use std::path::Path;

/// Name used when nothing usable can be derived from the path.
const FALLBACK_NAME: &str = "Untitled";

/// Split an optional numeric `NNN-` prefix from a file stem.
///
/// Returns the number (if any) and the remainder, separators preserved.
pub fn split_number_prefix(stem: &str) -> (Option<u32>, &str) {
    if let Some((prefix, rest)) = stem.split_once('-')
        && let Ok(num) = prefix.parse::<u32>()
    {
        return (Some(num), rest);
    }
    (None, stem)
}

/// Display name for a puzzle generated from `path`.
pub fn puzzle_name_from_path(path: &Path) -> String {
    let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
        return FALLBACK_NAME.to_string();
    };

    let (_, rest) = split_number_prefix(stem);
    let title = rest
        .split(['-', '_'])
        .filter(|word| !word.is_empty())
        .collect::<Vec<_>>()
        .join(" ");

    if !title.is_empty() {
        title
    } else if !stem.is_empty() {
        stem.to_string()
    } else {
        FALLBACK_NAME.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numbered_multi_word_name() {
        assert_eq!(
            puzzle_name_from_path(Path::new("photos/010-Sunny-Beach.jpg")),
            "Sunny Beach"
        );
    }

    #[test]
    fn unnumbered_underscores_become_spaces() {
        assert_eq!(
            puzzle_name_from_path(Path::new("old_harbour.png")),
            "old harbour"
        );
    }

    #[test]
    fn repeated_separators_collapse() {
        assert_eq!(
            puzzle_name_from_path(Path::new("001-red--barn__at_dusk.jpg")),
            "red barn at dusk"
        );
    }

    #[test]
    fn number_only_keeps_stem() {
        assert_eq!(puzzle_name_from_path(Path::new("007.jpg")), "007");
        assert_eq!(puzzle_name_from_path(Path::new("007-.jpg")), "007-");
    }

    #[test]
    fn dashed_word_without_number_is_not_a_prefix() {
        let (number, rest) = split_number_prefix("wip-drafts");
        assert_eq!(number, None);
        assert_eq!(rest, "wip-drafts");
    }

    #[test]
    fn numeric_prefix_is_parsed() {
        assert_eq!(split_number_prefix("040-who-am-i"), (Some(40), "who-am-i"));
        assert_eq!(split_number_prefix("000-First"), (Some(0), "First"));
    }

    #[test]
    fn path_without_file_name_falls_back() {
        assert_eq!(puzzle_name_from_path(Path::new("/")), FALLBACK_NAME);
    }
}
