//! Text processing: tokenization and frequency extraction.

pub mod extract;
pub mod tokenizer;
