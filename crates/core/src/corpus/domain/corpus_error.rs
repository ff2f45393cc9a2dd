use std::path::PathBuf;

use thiserror::Error;

/// The reference text cannot be turned into a valid index.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CorpusError {
    #[error("corpus contains no verses")]
    Empty,
    #[error("chapter {chapter} is missing (chapters must be numbered contiguously from 1)")]
    MissingChapter { chapter: u16 },
    #[error("chapter {chapter} is outside 1..={max}")]
    ChapterOutOfRange { chapter: u16, max: u16 },
    #[error("chapter {chapter}: expected verse {expected}, found verse {found}")]
    NonContiguousVerse {
        chapter: u16,
        expected: u16,
        found: u16,
    },
    #[error("verse {chapter}:{verse} has no text")]
    EmptyVerse { chapter: u16, verse: u16 },
    #[error("verse {chapter}:{verse} appears more than once")]
    DuplicateVerse { chapter: u16, verse: u16 },
}

/// A requested chapter/verse is outside the corpus.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("verse {chapter}:{verse} not found")]
pub struct VerseNotFound {
    pub chapter: u16,
    pub verse: u16,
}

/// A corpus file could not be read or parsed.
#[derive(Error, Debug)]
pub enum CorpusLoadError {
    #[error("failed to read corpus {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse corpus {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("{path}:{line}: {reason}")]
    MalformedLine {
        path: PathBuf,
        line: usize,
        reason: String,
    },
    #[error("{path}: invalid XML near byte {position}: {reason}")]
    Xml {
        path: PathBuf,
        position: u64,
        reason: String,
    },
}
