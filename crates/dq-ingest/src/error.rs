use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("data directory not found: {path}")]
    DirectoryNotFound { path: PathBuf },

    #[error("failed to read data directory {path}")]
    DirectoryRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("unknown source {name:?}; available: {}", available.join(", "))]
    UnknownSource { name: String, available: Vec<String> },

    #[error("failed to read {path}")]
    CsvRead {
        path: PathBuf,
        #[source]
        source: polars::error::PolarsError,
    },
}

pub type Result<T> = std::result::Result<T, IngestError>;
