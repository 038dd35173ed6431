//! Ranked, boolean and phrase retrieval over a [`lyrics_core::InvertedIndex`].

pub mod boolean;
pub mod engine;
pub mod error;

pub use boolean::BooleanQuery;
pub use engine::{query, QueryEngine, Scoring, SearchHit};
pub use error::{QueryError, Result};
