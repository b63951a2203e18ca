use crate::error::SearchError;
use serde::{Deserialize, Serialize};
use url::Url;

pub const DEFAULT_CLUSTER_URL: &str = "http://localhost:9200";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ClusterConfig {
    pub url: String,
    pub basic_auth: bool,
    pub username: Option<String>,
    pub password: Option<String>,
    pub soft_delete: bool,
}

impl Default for ClusterConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_CLUSTER_URL.to_string(),
            basic_auth: true,
            username: None,
            password: None,
            soft_delete: false,
        }
    }
}

impl ClusterConfig {
    pub fn anonymous(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            basic_auth: false,
            ..Self::default()
        }
    }

    pub fn with_credentials(
        url: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            url: url.into(),
            basic_auth: true,
            username: Some(username.into()),
            password: Some(password.into()),
            soft_delete: false,
        }
    }

    pub fn base_url(&self) -> Result<Url, SearchError> {
        let url = Url::parse(&self.url)?;
        if url.cannot_be_a_base() {
            return Err(SearchError::Config(format!(
                "cluster url {} cannot carry path segments",
                self.url
            )));
        }
        Ok(url)
    }

    pub fn transport(&self) -> Result<Transport, SearchError> {
        if !self.basic_auth {
            return Ok(Transport::Anonymous);
        }

        match self.username.as_deref().filter(|name| !name.is_empty()) {
            Some(username) => Ok(Transport::Basic {
                username: username.to_string(),
                password: self.password.clone(),
            }),
            None => Err(SearchError::Config(
                "basic auth is enabled but no username is configured".to_string(),
            )),
        }
    }
}

/// Credentials attached to every request, decided once per engine.
#[derive(Clone, PartialEq, Eq)]
pub enum Transport {
    Anonymous,
    Basic {
        username: String,
        password: Option<String>,
    },
}

impl Transport {
    pub fn apply(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match self {
            Transport::Anonymous => request,
            Transport::Basic { username, password } => {
                request.basic_auth(username, password.as_ref())
            }
        }
    }
}

impl std::fmt::Debug for Transport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Transport::Anonymous => f.write_str("Anonymous"),
            Transport::Basic { username, .. } => f
                .debug_struct("Basic")
                .field("username", username)
                .field("password", &"<redacted>")
                .finish(),
        }
    }
}
