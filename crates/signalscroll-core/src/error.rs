use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid easing: {0}")]
    InvalidEasing(String),

    #[error("Invalid color: {0}")]
    InvalidColor(String),

    #[error("Invalid scroll anchor: {0}")]
    InvalidAnchor(String),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, Error>;
