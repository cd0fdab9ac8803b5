use thiserror::Error;

#[derive(Error, Debug)]
pub enum DreamError {
    #[error("Dream not found: #{0}")]
    DreamNotFound(u64),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Store error: {0}")]
    Store(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Analysis failed: {0}")]
    Analysis(String),

    #[error("Image generation failed: {0}")]
    ImageGeneration(String),

    #[error("Api Error: {0}")]
    Api(String),
}

pub type Result<T> = std::result::Result<T, DreamError>;
