//! Central Configuration Constants
//!
//! Single source of truth for all configuration defaults.
//! To change the default API server, only edit this file.

use std::path::PathBuf;

/// Default PhishGuard API URL
///
/// This is the fallback URL when no environment variable is set.
/// For development: http://localhost:5000
pub const DEFAULT_API_URL: &str = "http://localhost:5000";

/// Default request timeout (seconds)
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Storage key under which the bearer credential is persisted
pub const TOKEN_STORAGE_KEY: &str = "phishguard_token";

/// Token file name inside the app data directory
pub const TOKEN_FILE_NAME: &str = "session.json";

/// App version
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// App name
pub const APP_NAME: &str = "PhishGuard";

// ============================================
// Helper functions to read from env with fallback
// ============================================

/// Get API base URL from environment or use default
pub fn get_api_url() -> String {
    std::env::var("PHISHGUARD_API_URL")
        .unwrap_or_else(|_| DEFAULT_API_URL.to_string())
}

/// Get request timeout from environment or use default
pub fn get_timeout_secs() -> u64 {
    std::env::var("PHISHGUARD_TIMEOUT")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(DEFAULT_TIMEOUT_SECS)
}

/// Get token file path from environment or use the local data directory
pub fn get_token_path() -> PathBuf {
    if let Ok(path) = std::env::var("PHISHGUARD_TOKEN_FILE") {
        return PathBuf::from(path);
    }

    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("phishguard")
        .join(TOKEN_FILE_NAME)
}
