pub mod corpus_reader_factory;
pub mod corpus_resolver;
pub mod json_corpus_reader;
pub mod shared_index;
pub mod tanzil_text_reader;
pub mod tanzil_xml_reader;
