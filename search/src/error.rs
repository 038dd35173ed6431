use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    /// The query text analyzed to no terms at all.
    #[error("query {0:?} has no searchable terms")]
    InvalidQuery(String),
    #[error("malformed boolean query: {0}")]
    MalformedBoolean(String),
}

pub type Result<T> = std::result::Result<T, QueryError>;
