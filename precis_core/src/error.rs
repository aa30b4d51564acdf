use thiserror::Error;

use crate::task::dto::TaskId;

/// Rejection of a request before it reaches the pipeline.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Text cannot be empty")]
    EmptyText,
    #[error("Text must be at least {min} characters, got {actual}")]
    TextTooShort { min: usize, actual: usize },
    #[error("Text must be at most {max} characters, got {actual}")]
    TextTooLong { max: usize, actual: usize },
    #[error("max_words must be between {min} and {max}, got {actual}")]
    MaxWordsOutOfRange { min: u32, max: u32, actual: u32 },
}

/// Failure of the summarization itself. Always surfaced to the caller.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ExecutorError {
    #[error("Failed to generate summary: {0}")]
    Generation(String),
    #[error("Failed to generate summary: model returned an empty summary")]
    EmptyOutput,
    #[error("Task exceeded time limit of {0} seconds")]
    TimedOut(u64),
}

/// Backing key/value store failure.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),
    #[error("Sled error: {0}")]
    Sled(#[from] sled::Error),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

#[derive(Debug, Error)]
pub enum TaskError {
    #[error("Task not found: {0}")]
    UnknownTask(TaskId),
    #[error("Task {0} already reached a terminal state")]
    Terminal(TaskId),
    #[error("Task store error: {0}")]
    Store(#[from] StoreError),
    #[error("Task queue error: {0}")]
    Queue(String),
}

impl From<serde_json::Error> for TaskError {
    fn from(err: serde_json::Error) -> Self {
        TaskError::Store(StoreError::Serialization(err))
    }
}

impl From<sled::Error> for TaskError {
    fn from(err: sled::Error) -> Self {
        TaskError::Store(StoreError::Sled(err))
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} environment variable not set")]
    Missing(&'static str),
    #[error("{name} has an invalid value: {value}")]
    Invalid { name: &'static str, value: String },
}
