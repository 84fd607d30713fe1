use std::path::Path;

use tracing::{info, warn};

use crate::config::LineEnding;
use crate::error::{CorpusError, Result};

/// Read the canonical English sentence list.
///
/// Lines are split on the configured delimiter only and kept byte-for-byte,
/// because the checksum of each line is its identity. Empty lines (including
/// the one left by a trailing delimiter) are skipped.
pub fn read_sentences<P: AsRef<Path>>(path: P, line_ending: LineEnding) -> Result<Vec<String>> {
    let path = path.as_ref();
    if !path.is_file() {
        return Err(CorpusError::FileNotFound(path.display().to_string()));
    }

    let content = std::fs::read_to_string(path)?;
    let sentences = split_sentences(&content, line_ending);
    for sentence in sentences.iter().filter(|s| s.contains('\n')) {
        warn!("Sentence contains a bare line break and cannot be batch translated: {:?}", sentence);
    }
    info!("Read {} canonical sentences from {}", sentences.len(), path.display());
    Ok(sentences)
}

pub fn split_sentences(content: &str, line_ending: LineEnding) -> Vec<String> {
    content
        .split(line_ending.delimiter())
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_fs::prelude::*;

    #[test]
    fn test_crlf_split_keeps_lines_verbatim() {
        let sentences = split_sentences("Hello world\r\n Good morning \r\n\r\n", LineEnding::Crlf);
        assert_eq!(sentences, vec!["Hello world", " Good morning "]);
    }

    #[test]
    fn test_lf_split_does_not_strip_carriage_returns() {
        let sentences = split_sentences("Hello world\r\nGood morning\n", LineEnding::Lf);
        assert_eq!(sentences, vec!["Hello world\r", "Good morning"]);
    }

    #[test]
    fn test_crlf_split_keeps_bare_line_feed() {
        let sentences = split_sentences("Hello\nworld\r\nGood morning", LineEnding::Crlf);
        assert_eq!(sentences, vec!["Hello\nworld", "Good morning"]);
    }

    #[test]
    fn test_read_missing_file() {
        let temp = assert_fs::TempDir::new().unwrap();
        let err = read_sentences(temp.child("sentences.txt").path(), LineEnding::Crlf).unwrap_err();
        assert!(matches!(err, CorpusError::FileNotFound(_)));
    }

    #[test]
    fn test_read_file() {
        let temp = assert_fs::TempDir::new().unwrap();
        let file = temp.child("sentences.txt");
        file.write_str("Hello world\r\nGood morning").unwrap();

        let sentences = read_sentences(file.path(), LineEnding::Crlf).unwrap();
        assert_eq!(sentences, vec!["Hello world", "Good morning"]);
    }
}
