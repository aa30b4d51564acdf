use precis_core::error::{ConfigError, TaskError};
use redis::RedisError;
use std::fmt;

#[derive(Debug)]
pub enum ConsumerError {
    Redis(RedisError),
    Config(ConfigError),
    Task(TaskError),
    ConnectionFailed(String),
}

impl fmt::Display for ConsumerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConsumerError::Redis(err) => write!(f, "Redis error: {}", err),
            ConsumerError::Config(err) => write!(f, "Configuration error: {}", err),
            ConsumerError::Task(err) => write!(f, "Task error: {}", err),
            ConsumerError::ConnectionFailed(msg) => write!(f, "Connection failed: {}", msg),
        }
    }
}

impl std::error::Error for ConsumerError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConsumerError::Redis(err) => Some(err),
            ConsumerError::Config(err) => Some(err),
            ConsumerError::Task(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RedisError> for ConsumerError {
    fn from(err: RedisError) -> Self {
        ConsumerError::Redis(err)
    }
}

impl From<ConfigError> for ConsumerError {
    fn from(err: ConfigError) -> Self {
        ConsumerError::Config(err)
    }
}

impl From<TaskError> for ConsumerError {
    fn from(err: TaskError) -> Self {
        ConsumerError::Task(err)
    }
}

pub type ConsumerResult<T> = Result<T, ConsumerError>;
