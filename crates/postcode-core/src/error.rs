use thiserror::Error;

#[derive(Error, Debug)]
pub enum PostcodeError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid value for option '{key}': {reason}")]
    InvalidOption { key: String, reason: String },

    #[error("Unknown option: {0}")]
    UnknownOption(String),

    #[error("Postcode pool error: {0}")]
    Pool(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, PostcodeError>;
