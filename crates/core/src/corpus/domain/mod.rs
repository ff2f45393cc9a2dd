pub mod corpus_error;
pub mod corpus_source;
pub mod raw_corpus;
pub mod verse_index;
pub mod verse_record;
