use thiserror::Error;

pub type Result<T> = std::result::Result<T, CoreError>;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Invalid private API URL: {url} ({reason})")]
    InvalidApiUrl { url: String, reason: &'static str },

    #[error("Missing stack output: {0}")]
    MissingStackOutput(String),

    #[error("Destination path contains a null byte: {0:?}")]
    UnsafeDestinationPath(String),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("I/O error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}
