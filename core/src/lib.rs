//! In-memory inverted index over a fixed corpus of lyric documents.

pub mod error;
pub mod index;
pub mod tokenizer;

pub use error::{IndexError, Result};
pub use index::*;
pub use tokenizer::{tokenize, Analyzer, AnalyzerConfig};
