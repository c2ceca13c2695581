//! Error types for Tally

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Config error: {0}")]
    Config(#[from] toml::de::Error),

    #[error("Invalid period: {0}")]
    InvalidPeriod(String),

    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("Text generation error: {0}")]
    Generation(String),
}

pub type Result<T> = std::result::Result<T, Error>;
