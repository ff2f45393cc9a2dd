use super::corpus_error::CorpusLoadError;
use super::raw_corpus::RawCorpus;

/// Domain interface for the reference-text data source.
///
/// Implementations read a concrete format and hand back unvalidated verse
/// word lists; validation happens when the index is built.
pub trait CorpusSource: Send + Sync {
    fn load(&self) -> Result<RawCorpus, CorpusLoadError>;
}
