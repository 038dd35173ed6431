use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IndexError {
    #[error("cannot build an index from an empty corpus")]
    EmptyCorpus,
    #[error("duplicate document id: {0}")]
    DuplicateDocument(String),
}

pub type Result<T> = std::result::Result<T, IndexError>;
