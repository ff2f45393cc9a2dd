use std::fs;
use std::path::{Path, PathBuf};

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::corpus::domain::corpus_error::CorpusLoadError;
use crate::corpus::domain::corpus_source::CorpusSource;
use crate::corpus::domain::raw_corpus::RawCorpus;

const BOM: char = '\u{FEFF}';

/// Reads Tanzil XML exports.
///
/// Two layouts are understood:
///
/// ```text
/// <Chapter ChapterID="1" ChapterName="الفاتحة"><Verse VerseID="1">…</Verse></Chapter>
/// <sura index="1" name="الفاتحة"><aya index="1" text="…"/></sura>
/// ```
///
/// Chapter names are carried into the corpus. Any other element is ignored.
pub struct TanzilXmlReader {
    path: PathBuf,
}

impl TanzilXmlReader {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Parses file contents; `path` is only used in error messages.
    pub fn parse(path: &Path, contents: &str) -> Result<RawCorpus, CorpusLoadError> {
        let contents = contents.strip_prefix(BOM).unwrap_or(contents);
        let mut reader = Reader::from_str(contents);
        reader.config_mut().trim_text(true);

        let mut builder = XmlCorpusBuilder::default();
        loop {
            let step = match reader.read_event() {
                Err(e) => Err(e.to_string()),
                Ok(Event::Eof) => break,
                Ok(Event::Start(e)) => builder.open(&e, false),
                Ok(Event::Empty(e)) => builder.open(&e, true),
                Ok(Event::Text(t)) => t
                    .unescape()
                    .map_err(|e| e.to_string())
                    .map(|text| builder.text(&text)),
                Ok(Event::End(e)) => builder.close(e.name().as_ref()),
                Ok(_) => Ok(()),
            };
            step.map_err(|reason| CorpusLoadError::Xml {
                path: path.to_path_buf(),
                position: reader.buffer_position() as u64,
                reason,
            })?;
        }

        Ok(builder.corpus)
    }
}

impl CorpusSource for TanzilXmlReader {
    fn load(&self) -> Result<RawCorpus, CorpusLoadError> {
        let contents = fs::read_to_string(&self.path).map_err(|e| CorpusLoadError::Io {
            path: self.path.clone(),
            source: e,
        })?;
        Self::parse(&self.path, &contents)
    }
}

/// Verse whose closing tag has not been seen yet.
struct OpenVerse {
    chapter: u16,
    verse: u16,
    text: String,
}

#[derive(Default)]
struct XmlCorpusBuilder {
    corpus: RawCorpus,
    chapter: Option<u16>,
    verse: Option<OpenVerse>,
}

impl XmlCorpusBuilder {
    fn open(&mut self, element: &BytesStart, empty: bool) -> Result<(), String> {
        match element.name().as_ref() {
            b"Chapter" | b"sura" => {
                let number = number_attr(element, &["ChapterID", "index"])?;
                if let Some(name) = text_attr(element, &["ChapterName", "name"])? {
                    self.corpus.set_chapter_name(number, name);
                }
                if !empty {
                    self.chapter = Some(number);
                }
            }
            b"Verse" | b"aya" => {
                let chapter = self
                    .chapter
                    .ok_or_else(|| "verse outside a chapter".to_string())?;
                let verse = number_attr(element, &["VerseID", "index"])?;
                let text = text_attr(element, &["text"])?.unwrap_or_default();
                self.verse = Some(OpenVerse {
                    chapter,
                    verse,
                    text,
                });
                if empty {
                    self.finish_verse()?;
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn text(&mut self, text: &str) {
        if let Some(open) = self.verse.as_mut() {
            open.text.push_str(text);
        }
    }

    fn close(&mut self, name: &[u8]) -> Result<(), String> {
        match name {
            b"Verse" | b"aya" => self.finish_verse(),
            b"Chapter" | b"sura" => {
                self.chapter = None;
                Ok(())
            }
            _ => Ok(()),
        }
    }

    fn finish_verse(&mut self) -> Result<(), String> {
        let Some(OpenVerse {
            chapter,
            verse,
            text,
        }) = self.verse.take()
        else {
            return Ok(());
        };
        if self.corpus.insert_verse_text(chapter, verse, &text) {
            Ok(())
        } else {
            Err(format!("duplicate verse {chapter}:{verse}"))
        }
    }
}

/// First attribute present among `names`, unescaped.
fn text_attr(element: &BytesStart, names: &[&str]) -> Result<Option<String>, String> {
    for name in names {
        let attr = element.try_get_attribute(*name).map_err(|e| e.to_string())?;
        if let Some(attr) = attr {
            let value = attr.unescape_value().map_err(|e| e.to_string())?;
            return Ok(Some(value.trim().to_string()));
        }
    }
    Ok(None)
}

fn number_attr(element: &BytesStart, names: &[&str]) -> Result<u16, String> {
    let element_name = String::from_utf8_lossy(element.name().as_ref()).into_owned();
    let value = text_attr(element, names)?
        .ok_or_else(|| format!("<{element_name}> is missing {}", names[0]))?;
    value
        .parse()
        .map_err(|_| format!("<{element_name}> has invalid number '{value}'"))
}
