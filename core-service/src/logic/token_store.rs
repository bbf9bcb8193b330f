//! Token Storage
//!
//! Holds the single bearer credential for the client:
//! - One slot, last write wins
//! - Mirrored to a JSON file so a restart keeps the user signed in
//! - No local expiry; a 401 from the API is the only expiry signal

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Stored token file format
#[derive(Debug, Serialize, Deserialize)]
struct TokenFile {
    #[serde(rename = "phishguard_token")]
    token: String,
}

/// Credential store
pub struct TokenStore {
    file_path: Option<PathBuf>,
    slot: RwLock<Option<String>>,
}

impl TokenStore {
    /// Store backed by `path`, loading any credential already persisted there
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let file_path = path.into();
        let token = load_token(&file_path);

        if token.is_some() {
            log::debug!("Credential loaded from {}", file_path.display());
        }

        Self {
            file_path: Some(file_path),
            slot: RwLock::new(token),
        }
    }

    /// Store that lives only as long as the process
    pub fn in_memory() -> Self {
        Self {
            file_path: None,
            slot: RwLock::new(None),
        }
    }

    pub fn get(&self) -> Option<String> {
        self.slot.read().clone()
    }

    pub fn is_present(&self) -> bool {
        self.slot.read().is_some()
    }

    /// Replace the stored credential
    pub fn set(&self, token: impl Into<String>) {
        let token = token.into();
        self.persist(Some(&token));
        *self.slot.write() = Some(token);
    }

    /// Drop the stored credential. Clearing an empty store is a no-op.
    pub fn clear(&self) {
        let mut slot = self.slot.write();
        if slot.take().is_some() {
            log::info!("Credential cleared");
        }
        drop(slot);
        self.persist(None);
    }

    /// Clear only if the slot still holds `sent`, the credential a failing
    /// request carried. Returns whether anything was cleared.
    pub fn revoke(&self, sent: Option<&str>) -> bool {
        let mut slot = self.slot.write();
        if slot.is_none() || slot.as_deref() != sent {
            return false;
        }
        *slot = None;
        drop(slot);

        self.persist(None);
        log::info!("Credential revoked after 401");
        true
    }

    pub fn file_path(&self) -> Option<&Path> {
        self.file_path.as_deref()
    }

    fn persist(&self, token: Option<&str>) {
        let Some(path) = &self.file_path else {
            return;
        };

        let result = match token {
            Some(token) => write_token(path, token),
            None if path.exists() => fs::remove_file(path),
            None => Ok(()),
        };

        if let Err(e) = result {
            log::warn!("Failed to persist credential at {}: {}", path.display(), e);
        }
    }
}

fn load_token(path: &Path) -> Option<String> {
    let content = fs::read_to_string(path).ok()?;

    match serde_json::from_str::<TokenFile>(&content) {
        Ok(file) if !file.token.is_empty() => Some(file.token),
        Ok(_) => None,
        Err(e) => {
            log::warn!("Ignoring unreadable token file {}: {}", path.display(), e);
            None
        }
    }
}

fn write_token(path: &Path, token: &str) -> std::io::Result<()> {
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir)?;
    }

    let file = TokenFile {
        token: token.to_string(),
    };
    let content = serde_json::to_string_pretty(&file)?;

    let mut options = fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }

    let mut handle = options.open(path)?;
    // mode only applies on create; tighten files left by older builds
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        handle.set_permissions(fs::Permissions::from_mode(0o600))?;
    }
    handle.write_all(content.as_bytes())
}
