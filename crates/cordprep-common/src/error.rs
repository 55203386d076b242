use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CordPrepError {
    #[error("kind must be one of {legal:?}, got {got:?}")]
    InvalidSelector {
        got: String,
        legal: Vec<&'static str>,
    },

    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error("JSON parse error in {}: {source}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Metadata table has no {0:?} column")]
    MissingColumn(String),

    #[error("Metadata record {row} has {width} fields, header has {expected}")]
    RecordTooWide {
        row: usize,
        width: usize,
        expected: usize,
    },

    #[error("Paper {0} is flagged as full text but has no file path")]
    MissingPath(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl CordPrepError {
    /// Attach the offending path to an I/O failure.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io { path: path.into(), source }
    }

    pub fn json(path: impl Into<PathBuf>, source: serde_json::Error) -> Self {
        Self::Json { path: path.into(), source }
    }
}

pub type Result<T> = std::result::Result<T, CordPrepError>;
