use thiserror::Error;

pub const CREATE_INDEX_UNSUPPORTED: &str =
    "OpenSearch indexes are created automatically upon adding objects.";

#[derive(Debug, Error)]
pub enum SearchError {
    /// Non-200 answer from the cluster. The message is the envelope's
    /// `error.reason`, or the status reason phrase when that is missing.
    #[error("{reason}")]
    Cluster { status: u16, reason: String },

    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("url parse error: {0}")]
    Url(#[from] url::ParseError),

    #[error("serialize error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("invalid cluster config: {0}")]
    Config(String),

    #[error("{0}")]
    Unsupported(&'static str),

    /// Index names and ids the URL parser would collapse (`""`, `.`, `..`).
    #[error("invalid path segment: {0:?}")]
    PathSegment(String),
}

impl SearchError {
    pub fn status(&self) -> Option<u16> {
        match self {
            SearchError::Cluster { status, .. } => Some(*status),
            SearchError::Http(error) => error.status().map(|status| status.as_u16()),
            _ => None,
        }
    }
}

pub type Result<T, E = SearchError> = std::result::Result<T, E>;
