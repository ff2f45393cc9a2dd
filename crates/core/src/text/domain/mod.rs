pub mod text_normalizer;
pub mod token;
pub mod transcript;
