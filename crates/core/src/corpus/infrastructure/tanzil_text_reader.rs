use std::fs;
use std::path::{Path, PathBuf};

use crate::corpus::domain::corpus_error::CorpusLoadError;
use crate::corpus::domain::corpus_source::CorpusSource;
use crate::corpus::domain::raw_corpus::RawCorpus;

const BOM: char = '\u{FEFF}';

/// Reads the Tanzil pipe-delimited export: `chapter|verse|text` per line.
///
/// Blank lines and `#` comment lines (Tanzil appends its license that way)
/// are skipped. A repeated `chapter|verse` is rejected.
pub struct TanzilTextReader {
    path: PathBuf,
}

impl TanzilTextReader {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Parses file contents; `path` is only used in error messages.
    pub fn parse(path: &Path, contents: &str) -> Result<RawCorpus, CorpusLoadError> {
        let mut corpus = RawCorpus::new();
        let contents = contents.strip_prefix(BOM).unwrap_or(contents);

        for (i, line) in contents.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let malformed = |reason: String| CorpusLoadError::MalformedLine {
                path: path.to_path_buf(),
                line: i + 1,
                reason,
            };

            let mut fields = line.splitn(3, '|');
            let (Some(chapter), Some(verse), Some(text)) = (fields.next(), fields.next(), fields.next())
            else {
                return Err(malformed("expected chapter|verse|text".to_string()));
            };
            let chapter: u16 = chapter
                .trim()
                .parse()
                .map_err(|_| malformed(format!("invalid chapter number '{}'", chapter.trim())))?;
            let verse: u16 = verse
                .trim()
                .parse()
                .map_err(|_| malformed(format!("invalid verse number '{}'", verse.trim())))?;

            if !corpus.insert_verse_text(chapter, verse, text) {
                return Err(malformed(format!("duplicate verse {chapter}:{verse}")));
            }
        }

        Ok(corpus)
    }
}

impl CorpusSource for TanzilTextReader {
    fn load(&self) -> Result<RawCorpus, CorpusLoadError> {
        let contents = fs::read_to_string(&self.path).map_err(|e| CorpusLoadError::Io {
            path: self.path.clone(),
            source: e,
        })?;
        Self::parse(&self.path, &contents)
    }
}
