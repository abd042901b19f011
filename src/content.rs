//! Input resolution for the session.
//!
//! Zero, one or two note files on the command line select the session
//! shape: no files starts a conversational interview, one file reviews a
//! single day, two files compare yesterday's notes against today's.
//! Unreadable files degrade rather than error.

use std::fs;
use std::path::{Path, PathBuf};

/// The three-variant input consumed at intake.
#[derive(Debug, Clone, PartialEq)]
pub enum ContentKind {
    /// No usable notes; the session opens with an interview.
    Conversational,
    /// Today's notes only.
    SingleText { text: String },
    /// Yesterday's notes plus today's, for comparison.
    DualText { prior_text: String, text: String },
}

/// Resolve CLI note paths into a `ContentKind`.
///
/// Two or more paths always produce `DualText`, with each unreadable file
/// degrading to empty text. A single unreadable path falls back to
/// `Conversational` so the session can still proceed by asking.
pub fn resolve(paths: &[PathBuf]) -> ContentKind {
    match paths {
        [] => ContentKind::Conversational,
        [single] => match fs::read_to_string(single) {
            Ok(text) => ContentKind::SingleText { text },
            Err(_) => ContentKind::Conversational,
        },
        [prior, current, ..] => ContentKind::DualText {
            prior_text: read_or_empty(prior),
            text: read_or_empty(current),
        },
    }
}

fn read_or_empty(path: &Path) -> String {
    fs::read_to_string(path).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn no_paths_is_conversational() {
        assert_eq!(resolve(&[]), ContentKind::Conversational);
    }

    #[test]
    fn single_readable_path_is_single_text() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("today.md");
        fs::write(&path, "- shipped the report").unwrap();

        match resolve(&[path]) {
            ContentKind::SingleText { text } => assert_eq!(text, "- shipped the report"),
            other => panic!("Expected SingleText, got {:?}", other),
        }
    }

    #[test]
    fn single_missing_path_falls_back_to_conversational() {
        let missing = PathBuf::from("/nonexistent/today.md");
        assert_eq!(resolve(&[missing]), ContentKind::Conversational);
    }

    #[test]
    fn two_paths_are_dual_text() {
        let dir = tempdir().unwrap();
        let prior = dir.path().join("yesterday.md");
        let current = dir.path().join("today.md");
        fs::write(&prior, "- plan the report").unwrap();
        fs::write(&current, "- report done").unwrap();

        match resolve(&[prior, current]) {
            ContentKind::DualText { prior_text, text } => {
                assert_eq!(prior_text, "- plan the report");
                assert_eq!(text, "- report done");
            }
            other => panic!("Expected DualText, got {:?}", other),
        }
    }

    #[test]
    fn missing_dual_files_degrade_to_empty() {
        let dir = tempdir().unwrap();
        let current = dir.path().join("today.md");
        fs::write(&current, "- report done").unwrap();

        match resolve(&[PathBuf::from("/nonexistent/y.md"), current]) {
            ContentKind::DualText { prior_text, text } => {
                assert!(prior_text.is_empty());
                assert_eq!(text, "- report done");
            }
            other => panic!("Expected DualText, got {:?}", other),
        }
    }

    #[test]
    fn extra_paths_beyond_two_are_ignored() {
        let dir = tempdir().unwrap();
        let a = dir.path().join("a.md");
        let b = dir.path().join("b.md");
        let c = dir.path().join("c.md");
        for p in [&a, &b, &c] {
            fs::write(p, "x").unwrap();
        }

        assert!(matches!(
            resolve(&[a, b, c]),
            ContentKind::DualText { .. }
        ));
    }
}
