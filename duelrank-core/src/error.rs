use thiserror::Error;

use crate::types::Vote;

#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid vote {0:?}: both sides need distinct, non-empty item ids")]
    InvalidVote(Vote),

    #[error("number of buckets must be at least 1, got {0}")]
    InvalidBucketCount(usize),

    #[error("malformed snapshot: {0}")]
    MalformedSnapshot(String),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("snapshot sink failed: {0}")]
    Sink(String),
}

pub type Result<T> = std::result::Result<T, Error>;
