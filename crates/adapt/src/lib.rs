pub mod dataset;
pub mod mql;
pub mod store;

pub use dataset::{load_dataset, parse_dataset};
pub use store::MemoryContentStore;

use serve::StoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid filter: {0}")]
    InvalidFilter(String),

    #[error("invalid operator: {0}")]
    InvalidOperator(String),

    #[error("invalid sort spec: {0}")]
    InvalidSort(String),

    /// A `$name` placeholder had no matching parameter.
    #[error("unbound query parameter: ${0}")]
    UnboundParam(String),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("dataset line {line}: {source}")]
    Dataset {
        line: usize,
        #[source]
        source: Box<Error>,
    },

    #[error("invalid document: {0}")]
    Document(String),
}

impl Error {
    #[inline]
    pub fn invalid_filter(msg: impl Into<String>) -> Self {
        Error::InvalidFilter(msg.into())
    }

    #[inline]
    pub fn document(msg: impl Into<String>) -> Self {
        Error::Document(msg.into())
    }

    #[inline]
    pub fn at_line(line: usize, source: Error) -> Self {
        Error::Dataset {
            line,
            source: Box::new(source),
        }
    }
}

// Query problems are the caller's fault; everything else is the backing
// store misbehaving.
impl From<Error> for StoreError {
    fn from(err: Error) -> Self {
        match err {
            Error::InvalidFilter(_)
            | Error::InvalidOperator(_)
            | Error::InvalidSort(_)
            | Error::UnboundParam(_) => StoreError::Query(err.to_string()),
            Error::Json(e) => StoreError::Decode(e),
            other => StoreError::Transport(other.to_string()),
        }
    }
}
