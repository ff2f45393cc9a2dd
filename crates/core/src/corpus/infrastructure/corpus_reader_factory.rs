use std::path::Path;

use crate::corpus::domain::corpus_source::CorpusSource;

use super::json_corpus_reader::JsonCorpusReader;
use super::tanzil_text_reader::TanzilTextReader;
use super::tanzil_xml_reader::TanzilXmlReader;

/// Picks a reader by file extension: `.json` is the JSON layout, `.xml` is
/// Tanzil XML, anything else is treated as Tanzil pipe-delimited text.
pub fn create_reader(path: &Path) -> Box<dyn CorpusSource> {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase);
    match extension.as_deref() {
        Some("json") => {
            log::debug!("Reading JSON corpus {}", path.display());
            Box::new(JsonCorpusReader::new(path))
        }
        Some("xml") => {
            log::debug!("Reading Tanzil XML corpus {}", path.display());
            Box::new(TanzilXmlReader::new(path))
        }
        _ => {
            log::debug!("Reading Tanzil text corpus {}", path.display());
            Box::new(TanzilTextReader::new(path))
        }
    }
}
