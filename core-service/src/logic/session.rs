//! Session Manager
//!
//! Owns the authenticated identity and derives it from the stored credential:
//!
//! ```text
//! unknown ──► resolving ──► authenticated(User)
//!                 │
//!                 └───────► anonymous
//! ```
//!
//! Only one resolution runs at a time. `refresh()` during `resolving` joins
//! the running one. `logout()` and `expire()` bump an epoch so a resolution
//! that was in flight when they ran can never write its result back.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::watch;

use super::gateway::{ApiError, RequestGateway};
use super::models::{RegisterRequest, RegisterResponse, TokenGrant, User};

/// Client-side view of who is signed in
#[derive(Debug, Clone, PartialEq)]
pub enum SessionStatus {
    /// Not yet initialized
    Unknown,
    /// Profile fetch in flight
    Resolving,
    Authenticated(User),
    Anonymous,
}

impl SessionStatus {
    /// True once a page may render a decision
    pub fn is_settled(&self) -> bool {
        matches!(self, SessionStatus::Authenticated(_) | SessionStatus::Anonymous)
    }

    pub fn is_resolving(&self) -> bool {
        matches!(self, SessionStatus::Resolving)
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self, SessionStatus::Authenticated(_))
    }

    pub fn user(&self) -> Option<&User> {
        match self {
            SessionStatus::Authenticated(user) => Some(user),
            _ => None,
        }
    }
}

/// Session state machine
pub struct SessionManager {
    gateway: Arc<RequestGateway>,
    status: watch::Sender<SessionStatus>,
    epoch: AtomicU64,
}

impl SessionManager {
    /// Create new session manager in the `Unknown` state
    pub fn new(gateway: Arc<RequestGateway>) -> Self {
        let (status, _) = watch::channel(SessionStatus::Unknown);

        Self {
            gateway,
            status,
            epoch: AtomicU64::new(0),
        }
    }

    pub fn gateway(&self) -> &Arc<RequestGateway> {
        &self.gateway
    }

    /// Current status snapshot
    pub fn current(&self) -> SessionStatus {
        self.status.borrow().clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.status.borrow().is_authenticated()
    }

    /// Receiver that observes every status change
    pub fn subscribe(&self) -> watch::Receiver<SessionStatus> {
        self.status.subscribe()
    }

    /// Wait until the status is `Authenticated` or `Anonymous`.
    ///
    /// Does not start a resolution; call `initialize()` first.
    pub async fn settled(&self) -> SessionStatus {
        let mut rx = self.status.subscribe();
        let result = rx.wait_for(SessionStatus::is_settled).await.map(|s| s.clone());
        match result {
            Ok(status) => status,
            // sender lives in self, so the channel cannot close while we wait
            Err(_) => self.current(),
        }
    }

    /// Resolve the session from the stored credential at process start
    pub async fn initialize(&self) -> SessionStatus {
        log::info!("Initializing session...");
        self.resolve(false).await
    }

    /// Re-fetch the profile, joining a resolution already in flight
    pub async fn refresh(&self) -> SessionStatus {
        self.resolve(false).await
    }

    /// Exchange username and password for a credential, then resolve.
    ///
    /// On failure the session is left as it was and the classified error
    /// is returned.
    pub async fn login(&self, username: &str, password: &str) -> Result<SessionStatus, ApiError> {
        log::info!("Signing in as {}", username);

        let grant: TokenGrant = self
            .gateway
            .post_form_anonymous("/login", &[("username", username), ("password", password)])
            .await?;

        if grant.access_token.is_empty() {
            return Err(ApiError::Unknown("login returned an empty access token".to_string()));
        }

        self.gateway.tokens().set(grant.access_token);

        // A resolution in flight belongs to the previous credential.
        Ok(self.resolve(true).await)
    }

    /// Create an account. Does not sign in.
    pub async fn register(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<String, ApiError> {
        let request = RegisterRequest {
            username,
            email,
            password,
        };

        let response: RegisterResponse = self
            .gateway
            .post_json_anonymous("/register", &request)
            .await?;

        log::info!("Account created: {}", username);
        Ok(response.message)
    }

    /// Forget the credential and the user. Never fails.
    pub fn logout(&self) {
        self.gateway.tokens().clear();
        self.status.send_modify(|status| {
            self.epoch.fetch_add(1, Ordering::SeqCst);
            *status = SessionStatus::Anonymous;
        });
        log::info!("Signed out");
    }

    /// Demote to `Anonymous` after the API rejected the credential.
    ///
    /// The gateway revokes the credential that failed only if it is still
    /// the stored one. A credential still present belongs to a newer login,
    /// so the session is left alone. Returns whether the session was demoted.
    pub fn expire(&self) -> bool {
        if self.gateway.tokens().is_present() {
            log::debug!("Ignoring 401 for a replaced credential");
            return false;
        }

        let mut was_signed_in = false;
        self.status.send_modify(|status| {
            self.epoch.fetch_add(1, Ordering::SeqCst);
            was_signed_in = status.is_authenticated() || status.is_resolving();
            *status = SessionStatus::Anonymous;
        });
        if was_signed_in {
            log::warn!("Session expired, signed out");
        }
        true
    }

    async fn resolve(&self, force: bool) -> SessionStatus {
        let token = self.gateway.tokens().get();
        let mut epoch = None;

        // Epoch reads and bumps happen under the status lock so logout,
        // expire and resolution results are totally ordered.
        self.status.send_if_modified(|status| {
            if status.is_resolving() && !force {
                return false;
            }
            if token.is_some() {
                epoch = Some(self.epoch.fetch_add(1, Ordering::SeqCst) + 1);
                *status = SessionStatus::Resolving;
            } else {
                *status = SessionStatus::Anonymous;
            }
            true
        });

        let Some(epoch) = epoch else {
            return self.settled().await;
        };

        let mut guard = ResolutionGuard {
            manager: self,
            epoch,
            armed: true,
        };

        let outcome = self
            .gateway
            .get::<User>("/me")
            .await
            .and_then(User::validate);

        guard.armed = false;

        let next = match &outcome {
            Ok(user) => SessionStatus::Authenticated(user.clone()),
            Err(_) => SessionStatus::Anonymous,
        };

        let mut applied = false;
        self.status.send_if_modified(|status| {
            if self.epoch.load(Ordering::SeqCst) != epoch {
                return false;
            }
            *status = next.clone();
            applied = true;
            true
        });

        if !applied {
            log::debug!("Discarding superseded session resolution");
            return self.settled().await;
        }

        match outcome {
            Ok(user) => log::info!("Session resolved: {}", user.username),
            Err(e) => {
                log::warn!("Session resolution failed: {}", e);
                self.gateway.tokens().revoke(token.as_deref());
            }
        }

        next
    }
}

/// Settles a resolution whose future was dropped mid-flight, so coalesced
/// waiters are never left in `Resolving`.
struct ResolutionGuard<'a> {
    manager: &'a SessionManager,
    epoch: u64,
    armed: bool,
}

impl Drop for ResolutionGuard<'_> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        let epoch = self.epoch;
        let manager = self.manager;
        manager.status.send_if_modified(|status| {
            if manager.epoch.load(Ordering::SeqCst) != epoch || !status.is_resolving() {
                return false;
            }
            log::warn!("Session resolution abandoned");
            *status = SessionStatus::Anonymous;
            true
        });
    }
}
