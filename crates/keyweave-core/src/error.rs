use thiserror::Error;

#[derive(Error, Debug)]
pub enum KeyweaveError {
    #[error("IO Error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON Parsing Error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV Parsing Error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Invalid Keymap: {0}")]
    InvalidKeymap(String),

    #[error("Backend Error: {0}")]
    Backend(String),

    #[error("Configuration Error: {0}")]
    Config(String),
}

pub type KwResult<T> = Result<T, KeyweaveError>;
