use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("snapshot not found: {artifact} at {} (run `hitparade {stage}` first)", .path.display())]
    SnapshotMissing {
        artifact: &'static str,
        stage: &'static str,
        path: PathBuf,
    },
}

pub type Result<T> = std::result::Result<T, Error>;
