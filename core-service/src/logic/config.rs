//! Client Configuration
//!
//! Where the API lives, how long to wait for it, and where the credential is kept.

use std::path::PathBuf;

use crate::constants;

/// PhishGuard client configuration
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// API base URL, without trailing slash
    pub api_base_url: String,

    /// Per-request timeout in seconds
    pub timeout_seconds: u64,

    /// Token file; `None` keeps the credential in memory only
    pub token_path: Option<PathBuf>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base_url: constants::get_api_url(),
            timeout_seconds: constants::get_timeout_secs(),
            token_path: Some(constants::get_token_path()),
        }
    }
}

impl ClientConfig {
    /// Config pointing at `base_url` with an in-memory credential
    pub fn for_base_url(base_url: impl Into<String>) -> Self {
        Self {
            api_base_url: base_url.into(),
            timeout_seconds: constants::DEFAULT_TIMEOUT_SECS,
            token_path: None,
        }
    }

    pub fn with_api_url(mut self, url: Option<String>) -> Self {
        if let Some(url) = url {
            self.api_base_url = url;
        }
        self
    }

    pub fn with_token_path(mut self, path: Option<PathBuf>) -> Self {
        if path.is_some() {
            self.token_path = path;
        }
        self
    }

    /// Join the base URL and an endpoint path
    pub fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.api_base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}
