//! Detection Workflow
//!
//! One "submit URL → show verdict" cycle per page visit:
//!
//! ```text
//! idle ──► submitting ──► resolved(result)
//!  ▲           ▲     └──► failed(error)
//!  └─ reset ───┴── new submission from any phase
//! ```
//!
//! Submissions may overlap. Each one takes the next sequence number and only
//! writes its outcome if it is still the latest; older responses are dropped.

use parking_lot::Mutex;
use serde::Serialize;
use std::sync::Arc;

use super::severity::Severity;
use crate::logic::gateway::{ErrorInfo, RequestGateway};
use crate::logic::models::{DetectionResult, FeatureValue, PredictRequest, Prediction};
use crate::logic::session::SessionManager;

/// Where the current submission stands
#[derive(Debug, Clone, PartialEq)]
pub enum DetectionPhase {
    Idle,
    Submitting { url: String },
    Resolved(DetectionResult),
    Failed(ErrorInfo),
}

impl DetectionPhase {
    pub fn is_idle(&self) -> bool {
        matches!(self, DetectionPhase::Idle)
    }

    pub fn result(&self) -> Option<&DetectionResult> {
        match self {
            DetectionPhase::Resolved(result) => Some(result),
            _ => None,
        }
    }

    pub fn severity(&self) -> Option<Severity> {
        self.result().map(|r| Severity::from_prediction(&r.prediction))
    }
}

/// Why `submit` refused to start
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Rejection {
    EmptyUrl,
    /// Caller should send the user to sign in
    NotAuthenticated,
}

/// What happened to one `submit` call
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    /// Nothing changed and no request went out
    Rejected(Rejection),
    /// A newer submission (or a reset) replaced this one before it finished
    Superseded,
    /// This submission's outcome is now the current phase
    Settled(DetectionPhase),
}

struct DetectionState {
    sequence: u64,
    phase: DetectionPhase,
}

/// URL detection state machine
pub struct DetectionWorkflow {
    gateway: Arc<RequestGateway>,
    session: Arc<SessionManager>,
    state: Mutex<DetectionState>,
}

impl DetectionWorkflow {
    pub fn new(gateway: Arc<RequestGateway>, session: Arc<SessionManager>) -> Self {
        Self {
            gateway,
            session,
            state: Mutex::new(DetectionState {
                sequence: 0,
                phase: DetectionPhase::Idle,
            }),
        }
    }

    /// Current phase snapshot
    pub fn state(&self) -> DetectionPhase {
        self.state.lock().phase.clone()
    }

    /// Sequence number of the latest submission
    pub fn sequence(&self) -> u64 {
        self.state.lock().sequence
    }

    /// Back to idle. Any submission still in flight will be discarded.
    pub fn reset(&self) {
        let mut state = self.state.lock();
        state.sequence += 1;
        state.phase = DetectionPhase::Idle;
    }

    /// Send `url` for analysis
    pub async fn submit(&self, url: &str) -> SubmitOutcome {
        let url = url.trim();
        if url.is_empty() {
            return SubmitOutcome::Rejected(Rejection::EmptyUrl);
        }
        if !self.session.is_authenticated() {
            log::debug!("Detection refused: session not authenticated");
            return SubmitOutcome::Rejected(Rejection::NotAuthenticated);
        }

        let sequence = {
            let mut state = self.state.lock();
            state.sequence += 1;
            state.phase = DetectionPhase::Submitting {
                url: url.to_string(),
            };
            state.sequence
        };

        log::info!("Analyzing URL #{}: {}", sequence, url);

        let mut guard = SubmissionGuard {
            state: &self.state,
            sequence,
            armed: true,
        };

        let outcome = self
            .gateway
            .post_json::<_, DetectionResult>("/predict", &PredictRequest { url })
            .await
            .and_then(DetectionResult::validate);

        guard.armed = false;

        if let Err(e) = &outcome {
            if e.is_unauthorized() {
                self.session.expire();
            }
        }

        let phase = match outcome {
            Ok(mut result) => {
                if result.url.is_empty() {
                    result.url = url.to_string();
                }
                DetectionPhase::Resolved(result)
            }
            Err(e) => {
                log::warn!("Analysis #{} failed: {}", sequence, e);
                DetectionPhase::Failed(e.info())
            }
        };

        let mut state = self.state.lock();
        if state.sequence != sequence {
            log::debug!("Dropping stale result #{} (current #{})", sequence, state.sequence);
            return SubmitOutcome::Superseded;
        }

        if let DetectionPhase::Resolved(result) = &phase {
            if let Prediction::Unrecognized(raw) = &result.prediction {
                log::warn!("Unrecognized prediction {:?} for URL #{}, shown as low severity", raw, sequence);
            }
            log::info!(
                "URL #{} classified {} ({})",
                sequence,
                result.prediction,
                result.confidence_percent()
            );
        }

        state.phase = phase.clone();
        SubmitOutcome::Settled(phase)
    }
}

/// Returns an abandoned submission to idle if it is still the current one
struct SubmissionGuard<'a> {
    state: &'a Mutex<DetectionState>,
    sequence: u64,
    armed: bool,
}

impl Drop for SubmissionGuard<'_> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        let mut state = self.state.lock();
        if state.sequence == self.sequence {
            state.phase = DetectionPhase::Idle;
        }
    }
}

/// Features of a result sorted by name, for display
pub fn signals(result: &DetectionResult) -> Vec<(&str, &FeatureValue)> {
    result
        .features
        .iter()
        .map(|(name, value)| (name.as_str(), value))
        .collect()
}
