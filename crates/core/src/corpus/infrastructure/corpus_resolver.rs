use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::shared::constants::{APP_DIR_NAME, CORPUS_DIR_NAME, CORPUS_FILE_NAME};

#[derive(Error, Debug)]
pub enum CorpusResolveError {
    #[error("corpus file not found; looked in: {}", format_tried(.tried))]
    NotFound { tried: Vec<PathBuf> },
}

fn format_tried(tried: &[PathBuf]) -> String {
    tried
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Resolve the reference-text file, checking known locations in order.
///
/// Resolution order:
/// 1. Explicit path (CLI flag or settings)
/// 2. User data directory (platform-specific)
/// 3. Bundled path (for development / pre-packaged installs)
pub fn resolve(explicit: Option<&Path>, bundled_dir: Option<&Path>) -> Result<PathBuf, CorpusResolveError> {
    let mut tried = Vec::new();

    // 1. Explicit path must exist; no fallback if the user named a file
    if let Some(path) = explicit {
        if path.is_file() {
            return Ok(path.to_path_buf());
        }
        return Err(CorpusResolveError::NotFound {
            tried: vec![path.to_path_buf()],
        });
    }

    // 2. User data directory
    if let Some(dir) = corpus_data_dir() {
        let path = dir.join(CORPUS_FILE_NAME);
        if path.is_file() {
            return Ok(path);
        }
        tried.push(path);
    }

    // 3. Bundled path
    if let Some(dir) = bundled_dir {
        let path = dir.join(CORPUS_FILE_NAME);
        if path.is_file() {
            return Ok(path);
        }
        tried.push(path);
    }

    Err(CorpusResolveError::NotFound { tried })
}

/// Platform-specific corpus directory.
///
/// - macOS: `~/Library/Application Support/Iqra/corpus/`
/// - Linux: `$XDG_DATA_HOME/Iqra/corpus/` or `~/.local/share/Iqra/corpus/`
/// - Windows: `%APPDATA%/Iqra/corpus/`
pub fn corpus_data_dir() -> Option<PathBuf> {
    dirs::data_dir().map(|d| d.join(APP_DIR_NAME).join(CORPUS_DIR_NAME))
}
