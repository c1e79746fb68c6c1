use thiserror::Error;

/// A page could not be retrieved.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("building http client: {0}")]
    Client(String),
    #[error("GET {url}: {message}")]
    Transport { url: String, message: String },
    #[error("GET {url}: HTTP {status}")]
    Status { url: String, status: u16 },
}

impl FetchError {
    pub fn url(&self) -> Option<&str> {
        match self {
            FetchError::Client(_) => None,
            FetchError::Transport { url, .. } | FetchError::Status { url, .. } => Some(url),
        }
    }
}

/// Why a candidate row matched the pattern but still produced no record.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseSkip {
    #[error("{field}: '{raw}' is not a count")]
    Count { field: &'static str, raw: String },
    #[error("{field}: '{raw}' is not a percentage")]
    Percent { field: &'static str, raw: String },
    #[error("empty deck name")]
    EmptyName,
}
