use thiserror::Error;

#[derive(Error, Debug)]
pub enum BroadcasterError {
    #[error("connection limit of {limit} clients reached")]
    ConnectionRejected { limit: usize },

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, BroadcasterError>;
