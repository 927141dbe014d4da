use reqwest::StatusCode;
use std::path::PathBuf;
use url::Url;

#[derive(thiserror::Error, Debug)]
pub enum ClientError {
    #[error("{0} cannot be used as a base URL")]
    InvalidBaseUrl(Url),
    #[error("failed to read CA certificates from {path:?}: {source}")]
    ReadCertificates { path: PathBuf, source: std::io::Error },
    #[error("failed to parse CA certificates from {path:?}: {source}")]
    ParseCertificates { path: PathBuf, source: reqwest::Error },
    #[error("failed to build the HTTP client: {0}")]
    Build(reqwest::Error),
    #[error("request to {url} failed: {source}")]
    Transport { url: Url, source: reqwest::Error },
    #[error("{url} responded with {status}: {body}")]
    Status { url: Url, status: StatusCode, body: String },
    #[error("cannot decode response from {url}: {source}")]
    Decode { url: Url, source: serde_json::Error },
    #[error("login as '{username}' was rejected with {status}")]
    Login { username: String, status: StatusCode },
}

impl ClientError {
    /// HTTP status of the upstream response, if one was received.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ClientError::Status { status, .. } | ClientError::Login { status, .. } => Some(*status),
            _ => None,
        }
    }
}
