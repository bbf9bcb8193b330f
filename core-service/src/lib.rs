//! PhishGuard Client Core
//!
//! Session lifecycle and URL detection workflow for the PhishGuard
//! phishing-detection API. The prediction engine itself is remote; this
//! crate owns the credential, the authenticated identity, and the
//! submit-then-verdict cycle built on top of them.

pub mod api;
pub mod cli;
pub mod constants;
pub mod logic;

pub use logic::config::ClientConfig;
pub use logic::ClientContext;
pub use logic::detection::{DetectionPhase, DetectionWorkflow, Severity, SubmitOutcome};
pub use logic::gateway::{ApiError, ErrorInfo, ErrorKind, RequestGateway};
pub use logic::history::{HistoryQuery, VerdictFilter};
pub use logic::models::{DetectionResult, Prediction, ScanRecord, User, Verdict};
pub use logic::session::{SessionManager, SessionStatus};
pub use logic::token_store::TokenStore;
