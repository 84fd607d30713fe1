use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CorpusError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("Invalid language code: '{0}'")]
    InvalidLanguageCode(String),

    #[error("Stored data at {path} is corrupt: {reason}")]
    StorageCorrupt { path: PathBuf, reason: String },

    #[error("Translation provider failed for '{language}': {message}")]
    TranslationProvider { language: String, message: String },

    #[error("Translation for '{language}' returned {received} lines, expected {expected}")]
    TranslationAlignment {
        language: String,
        expected: usize,
        received: usize,
    },

    #[error("Training error: {0}")]
    Training(String),

    #[error("Prediction error: {0}")]
    Prediction(String),
}

impl CorpusError {
    /// Process exit code for this error kind
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Config(_) | Self::Toml(_) | Self::InvalidLanguageCode(_) => 2,
            Self::StorageCorrupt { .. } | Self::Json(_) => 3,
            Self::Io(_) | Self::FileNotFound(_) => 4,
            Self::Prediction(_) => 5,
            _ => 1,
        }
    }
}

pub type Result<T> = std::result::Result<T, CorpusError>;
