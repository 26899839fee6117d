// src/error.rs

use reqwest::StatusCode;
use thiserror::Error;

/// Everything the box score pipeline can hand back to its caller.
#[derive(Debug, Error)]
pub enum BoxesError {
    #[error("fetch failed: {0}")]
    Fetch(#[from] FetchError),
    #[error("parse failed: {0}")]
    Parse(String),
    #[error("{0}")]
    Validation(String),
}

/// Transport-level failures raised while retrieving a page body.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("invalid URL: {0}")]
    Url(#[from] url::ParseError),
    #[error("could not build HTTP client: {0}")]
    Build(#[source] reqwest::Error),
    #[error("network error for {url}: {source}")]
    Network {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("server returned {status} for {url}")]
    Status { url: String, status: StatusCode },
    #[error("response from {url} is not valid UTF-8: {source}")]
    Decode {
        url: String,
        #[source]
        source: std::string::FromUtf8Error,
    },
    #[error("empty response body from {url}")]
    EmptyBody { url: String },
}

impl BoxesError {
    pub(crate) fn validation(msg: impl Into<String>) -> Self {
        BoxesError::Validation(msg.into())
    }

    pub(crate) fn parse(msg: impl Into<String>) -> Self {
        BoxesError::Parse(msg.into())
    }
}
