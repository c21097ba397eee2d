// src/error.rs
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(Box<reqwest::Error>),

    #[error("Watch error: {0}")]
    Watch(Box<notify::Error>),

    #[error("Page error: {0}")]
    Page(String),
}

impl From<reqwest::Error> for Error {
    fn from(error: reqwest::Error) -> Self {
        Error::Http(Box::new(error))
    }
}

impl From<notify::Error> for Error {
    fn from(error: notify::Error) -> Self {
        Error::Watch(Box::new(error))
    }
}

pub type Result<T> = std::result::Result<T, Error>;
