use thiserror::Error;

pub type BrowserResult<T> = std::result::Result<T, BrowserError>;

#[derive(Debug, Error)]
pub enum BrowserError {
    #[error("chromium error: {0}")]
    Chromium(String),

    #[error("navigation to {url} failed: {message}")]
    Navigation { url: String, message: String },

    #[error("element error: {0}")]
    Element(String),

    #[error("script error: {0}")]
    Script(String),

    #[error("session closed")]
    Closed,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
