// Takeout Embed error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum TakeoutEmbedError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Malformed metadata: {0}")]
    MalformedMetadata(String),

    #[error("ExifTool error: {0}")]
    ExifTool(String),

    #[error("FFmpeg error: {0}")]
    FFmpeg(String),

    #[error("File date error: {0}")]
    FileDate(String),

    #[error("Invalid path: {0}")]
    InvalidPath(String),
}

pub type Result<T> = std::result::Result<T, TakeoutEmbedError>;
