use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::corpus::domain::corpus_error::CorpusLoadError;
use crate::corpus::domain::corpus_source::CorpusSource;
use crate::corpus::domain::raw_corpus::RawCorpus;

#[derive(Deserialize)]
struct CorpusFile {
    chapters: Vec<ChapterEntry>,
}

#[derive(Deserialize)]
struct ChapterEntry {
    number: u16,
    #[serde(default)]
    name: Option<String>,
    verses: Vec<VerseEntry>,
}

#[derive(Deserialize)]
struct VerseEntry {
    number: u16,
    text: String,
}

/// Reads a JSON corpus:
/// `{"chapters": [{"number": 1, "name": "…", "verses": [{"number": 1, "text": "…"}]}]}`
pub struct JsonCorpusReader {
    path: PathBuf,
}

impl JsonCorpusReader {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn parse(path: &Path, contents: &str) -> Result<RawCorpus, CorpusLoadError> {
        let file: CorpusFile =
            serde_json::from_str(contents).map_err(|e| CorpusLoadError::Json {
                path: path.to_path_buf(),
                source: e,
            })?;

        let mut corpus = RawCorpus::new();
        for chapter in file.chapters {
            if let Some(name) = chapter.name {
                corpus.set_chapter_name(chapter.number, name);
            }
            for verse in chapter.verses {
                corpus.insert_verse_text(chapter.number, verse.number, &verse.text);
            }
        }
        Ok(corpus)
    }
}

impl CorpusSource for JsonCorpusReader {
    fn load(&self) -> Result<RawCorpus, CorpusLoadError> {
        let contents = fs::read_to_string(&self.path).map_err(|e| CorpusLoadError::Io {
            path: self.path.clone(),
            source: e,
        })?;
        Self::parse(&self.path, &contents)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::domain::corpus_error::CorpusError;
    use crate::corpus::domain::verse_index::VerseIndex;
    use tempfile::TempDir;

    const SAMPLE: &str = r#"{
        "chapters": [
            {
                "number": 1,
                "name": "Al-Fatiha",
                "verses": [
                    {"number": 1, "text": "بسم الله الرحمن الرحيم"},
                    {"number": 2, "text": "الحمد لله رب العالمين"}
                ]
            },
            {
                "number": 2,
                "verses": [{"number": 1, "text": "الم"}]
            }
        ]
    }"#;

    #[test]
    fn test_parses_chapters_and_names() {
        let corpus = JsonCorpusReader::parse(Path::new("q.json"), SAMPLE).unwrap();
        assert_eq!(corpus.verses().len(), 3);
        assert_eq!(corpus.chapter_names().get(&1).map(String::as_str), Some("Al-Fatiha"));
        assert!(corpus.chapter_names().get(&2).is_none());
        assert_eq!(corpus.words(1, 1).unwrap().len(), 4);
    }

    #[test]
    fn test_repeated_verse_fails_index_build() {
        let contents = r#"{"chapters": [{"number": 1, "verses": [
            {"number": 1, "text": "a b c"},
            {"number": 1, "text": "x"}
        ]}]}"#;
        let corpus = JsonCorpusReader::parse(Path::new("q.json"), contents).unwrap();
        assert_eq!(
            VerseIndex::build(&corpus).unwrap_err(),
            CorpusError::DuplicateVerse {
                chapter: 1,
                verse: 1
            }
        );
    }

    #[test]
    fn test_invalid_json_is_json_error() {
        let err = JsonCorpusReader::parse(Path::new("q.json"), r#"{"chapters": [{"number": 1}]}"#)
            .unwrap_err();
        assert!(matches!(err, CorpusLoadError::Json { .. }));
    }

    #[test]
    fn test_load_reads_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("quran.json");
        fs::write(&path, SAMPLE).unwrap();
        let corpus = JsonCorpusReader::new(&path).load().unwrap();
        assert_eq!(corpus.words(2, 1).unwrap(), &["الم"]);
    }
}
