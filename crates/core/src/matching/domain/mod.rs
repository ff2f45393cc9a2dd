pub mod alignment_engine;
pub mod match_report;
pub mod mistake_classifier;
pub mod verse_locator;
