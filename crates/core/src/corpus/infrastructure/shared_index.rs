use std::sync::{Arc, Mutex, OnceLock};

use thiserror::Error;

use crate::corpus::domain::corpus_error::{CorpusError, CorpusLoadError};
use crate::corpus::domain::corpus_source::CorpusSource;
use crate::corpus::domain::verse_index::VerseIndex;

#[derive(Error, Debug)]
pub enum IndexInitError {
    #[error(transparent)]
    Load(#[from] CorpusLoadError),
    #[error(transparent)]
    Corpus(#[from] CorpusError),
}

/// A lazily built, read-only [`VerseIndex`] shared by every caller.
///
/// The first successful [`get_or_init`](Self::get_or_init) builds the index;
/// concurrent first callers wait on the guard and then see the same `Arc`.
/// A failed build leaves the slot empty so a later call can retry.
pub struct SharedIndex {
    slot: OnceLock<Arc<VerseIndex>>,
    guard: Mutex<()>,
}

impl SharedIndex {
    pub const fn new() -> Self {
        Self {
            slot: OnceLock::new(),
            guard: Mutex::new(()),
        }
    }

    pub fn get_or_init(&self, source: &dyn CorpusSource) -> Result<Arc<VerseIndex>, IndexInitError> {
        if let Some(index) = self.slot.get() {
            return Ok(Arc::clone(index));
        }

        // A poisoned guard only means another builder panicked; the slot is still consistent.
        let _lock = self.guard.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(index) = self.slot.get() {
            return Ok(Arc::clone(index));
        }

        let raw = source.load()?;
        let index = Arc::new(VerseIndex::build(&raw)?);
        Ok(Arc::clone(self.slot.get_or_init(|| index)))
    }

    pub fn get(&self) -> Option<Arc<VerseIndex>> {
        self.slot.get().cloned()
    }
}

impl Default for SharedIndex {
    fn default() -> Self {
        Self::new()
    }
}

static GLOBAL: SharedIndex = SharedIndex::new();

/// Returns the process-wide index, building it from `source` on first use.
pub fn get_or_init(source: &dyn CorpusSource) -> Result<Arc<VerseIndex>, IndexInitError> {
    GLOBAL.get_or_init(source)
}
