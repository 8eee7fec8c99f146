use std::{io, path::PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Config error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("dataset {}: {source}", .path.display())]
    Dataset {
        path: PathBuf,
        #[source]
        source: adapt::Error,
    },

    #[error("encode error: {0}")]
    Encode(#[from] serde_json::Error),
}
