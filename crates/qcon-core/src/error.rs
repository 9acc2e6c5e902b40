use thiserror::Error;

/// Errors produced by the console protocol layer.
#[derive(Debug, Error)]
pub enum ConsoleError {
    #[error("codec error: {0}")]
    Codec(String),

    #[error("transport error: {0}")]
    Transport(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<serde_json::Error> for ConsoleError {
    fn from(e: serde_json::Error) -> Self {
        ConsoleError::Codec(e.to_string())
    }
}

pub type ConsoleResult<T> = Result<T, ConsoleError>;
