pub mod corpus;
pub mod matching;
pub mod pipeline;
pub mod shared;
pub mod text;
