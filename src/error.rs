use thiserror::Error;

pub type Result<T> = std::result::Result<T, GhactError>;

#[derive(Error, Debug)]
pub enum GhactError {
    #[error("HTTP error: {0}")]
    Http(#[from] Box<reqwest::Error>),
    #[error("API errors: {0}")]
    Api(String),
    #[error("User not found: {0}")]
    UserNotFound(String),
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),
    #[error("Cache error: {0}")]
    Cache(String),
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid date: {0}")]
    InvalidDate(String),
    #[error("GitHub token required. Provide via -t/--token or GITHUB_TOKEN environment variable.")]
    MissingToken,
    #[error("{0}")]
    NoData(String),
    #[error("Clipboard error: {0}")]
    Clipboard(String),
    #[error("Other: {0}")]
    Other(String),
}

// reqwest::Error is large; keep the enum small by boxing it
impl From<reqwest::Error> for GhactError {
    fn from(err: reqwest::Error) -> Self {
        GhactError::Http(Box::new(err))
    }
}
