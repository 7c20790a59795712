use thiserror::Error;

#[derive(Debug, Error)]
pub enum PrefError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("invalid topic data: {0}")]
    Topics(String),

    #[error("config error: {0}")]
    Config(String),
}

pub type PrefResult<T> = Result<T, PrefError>;
