//! Logic Module - Session & Detection Core
//!
//! Leaves first:
//! - `token_store` - the single bearer credential
//! - `gateway` - authenticated HTTP calls and error classification
//! - `session` - authenticated identity state machine
//! - `detection` - submit URL → verdict workflow
//! - `history` - past scans and local filtering

pub mod config;
pub mod models;
pub mod token_store;
pub mod gateway;
pub mod session;
pub mod detection;
pub mod history;

use std::sync::Arc;

use config::ClientConfig;
use detection::DetectionWorkflow;
use gateway::{ApiError, RequestGateway};
use history::HistoryQuery;
use session::SessionManager;
use token_store::TokenStore;

/// Everything a page needs, wired once at startup
pub struct ClientContext {
    pub gateway: Arc<RequestGateway>,
    pub session: Arc<SessionManager>,
}

impl ClientContext {
    pub fn new(config: ClientConfig) -> Result<Self, ApiError> {
        let tokens = match &config.token_path {
            Some(path) => TokenStore::open(path),
            None => TokenStore::in_memory(),
        };

        let gateway = Arc::new(RequestGateway::new(config, Arc::new(tokens))?);
        let session = Arc::new(SessionManager::new(gateway.clone()));

        Ok(Self { gateway, session })
    }

    /// Fresh detection state for one page visit
    pub fn detection(&self) -> DetectionWorkflow {
        DetectionWorkflow::new(self.gateway.clone(), self.session.clone())
    }

    pub fn history(&self) -> HistoryQuery {
        HistoryQuery::new(self.gateway.clone(), self.session.clone())
    }
}
