//! Blocking HTTP client shared by both feeds.

use std::fs;
use std::time::Duration;

use reqwest::blocking::Client;

use super::{SourceInput, SourceKind};
use crate::error::{AppError, FetchError};

const USER_AGENT: &str = concat!("gpu-compare/", env!("CARGO_PKG_VERSION"));

pub struct FeedClient {
    client: Client,
    timeout: Duration,
}

impl FeedClient {
    /// Build a client whose every request is bounded by `timeout`.
    pub fn new(timeout: Duration) -> Result<Self, AppError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| AppError::usage(format!("Failed to build HTTP client: {e}")))?;
        Ok(Self { client, timeout })
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Read a feed body from its URL or saved file.
    pub fn read_body(&self, kind: SourceKind, input: &SourceInput) -> Result<String, FetchError> {
        match input {
            SourceInput::Url(url) => self.get_text(kind, url),
            SourceInput::File(path) => fs::read_to_string(path).map_err(|e| FetchError::Network {
                source_kind: kind,
                message: format!("failed to read '{}': {e}", path.display()),
            }),
        }
    }

    fn get_text(&self, kind: SourceKind, url: &str) -> Result<String, FetchError> {
        tracing::debug!(source = %kind, url, "requesting feed");

        let resp = self
            .client
            .get(url)
            .send()
            .map_err(|e| self.classify(kind, e))?;

        if !resp.status().is_success() {
            return Err(FetchError::Network {
                source_kind: kind,
                message: format!("{url} answered with status {}", resp.status()),
            });
        }

        resp.text().map_err(|e| self.classify(kind, e))
    }

    fn classify(&self, kind: SourceKind, err: reqwest::Error) -> FetchError {
        if err.is_timeout() {
            FetchError::Timeout {
                source_kind: kind,
                timeout_secs: self.timeout.as_secs(),
            }
        } else {
            FetchError::Network {
                source_kind: kind,
                message: err.to_string(),
            }
        }
    }
}
