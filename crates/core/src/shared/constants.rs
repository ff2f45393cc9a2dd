/// Number of chapters in the full book.
pub const CHAPTER_COUNT: u16 = 114;

/// Minimum token-overlap ratio for an open search to name a verse.
pub const DEFAULT_MIN_OVERLAP: f64 = 0.6;
/// Search window lengths range over `transcript_len ± tolerance`.
pub const DEFAULT_WINDOW_TOLERANCE: usize = 1;
/// Candidates that survive the overlap ranking and get an edit distance.
pub const DEFAULT_TOP_K: usize = 5;

pub const APP_DIR_NAME: &str = "Iqra";
pub const CORPUS_DIR_NAME: &str = "corpus";
/// Tanzil "simple" text export, `chapter|verse|text` per line.
pub const CORPUS_FILE_NAME: &str = "quran-simple.txt";
pub const SETTINGS_FILE_NAME: &str = "settings.json";

pub const TRANSCRIPT_EXTENSIONS: &[&str] = &["txt"];
pub const BATCH_RESULTS_FILE_NAME: &str = "batch_results.json";
