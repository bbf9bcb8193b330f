//! In-process stub of the PhishGuard backend for integration tests.
//!
//! Users: alice/correct and bob/hunter2. URL keywords steer `/predict`:
//! `evil` → phishing 0.97, `odd` → suspicious, `weird` → unrecognized
//! verdict, `down` → 503, `broken` → malformed body, `slow` → waits for
//! `release_slow`, `late401` → waits for `release_slow` then answers 401.

#![allow(dead_code)]

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Form, Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

use phishguard_core::{ClientConfig, ClientContext};

#[derive(Default)]
pub struct StubState {
    pub me_calls: AtomicUsize,
    pub predict_calls: AtomicUsize,
    pub history_calls: AtomicUsize,
    /// Every bearer credential is rejected while set
    pub revoked: AtomicBool,
    pub release_slow: Notify,
    scans: Mutex<Vec<(String, Value)>>,
}

impl StubState {
    pub fn me_calls(&self) -> usize {
        self.me_calls.load(Ordering::SeqCst)
    }

    pub fn predict_calls(&self) -> usize {
        self.predict_calls.load(Ordering::SeqCst)
    }

    pub fn revoke_all(&self) {
        self.revoked.store(true, Ordering::SeqCst);
    }
}

pub struct Backend {
    pub base_url: String,
    pub state: Arc<StubState>,
}

impl Backend {
    pub async fn spawn() -> Self {
        let state = Arc::new(StubState::default());

        let app = Router::new()
            .route("/health", get(health))
            .route("/login", post(login))
            .route("/register", post(register))
            .route("/me", get(me))
            .route("/predict", post(predict))
            .route("/history", get(history))
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url: format!("http://{}", addr),
            state,
        }
    }

    pub fn config(&self) -> ClientConfig {
        ClientConfig::for_base_url(&self.base_url)
    }

    pub fn context(&self) -> ClientContext {
        ClientContext::new(self.config()).unwrap()
    }
}

/// Context already signed in as alice
pub async fn signed_in(backend: &Backend) -> ClientContext {
    let ctx = backend.context();
    ctx.session.initialize().await;
    ctx.session.login("alice", "correct").await.unwrap();
    assert!(ctx.session.is_authenticated());
    ctx
}

// ============================================================================
// HANDLERS
// ============================================================================

const USERS: [(&str, &str, &str); 2] = [
    ("alice", "correct", "token-alice"),
    ("bob", "hunter2", "token-bob"),
];

#[derive(Deserialize)]
struct LoginForm {
    username: String,
    password: String,
}

#[derive(Deserialize)]
struct RegisterBody {
    username: String,
    email: String,
    password: String,
}

#[derive(Deserialize)]
struct PredictBody {
    url: String,
}

fn detail(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "detail": message }))).into_response()
}

fn authorize(state: &StubState, headers: &HeaderMap) -> Result<&'static str, Response> {
    let unauthorized = || detail(StatusCode::UNAUTHORIZED, "Invalid token");

    if state.revoked.load(Ordering::SeqCst) {
        return Err(unauthorized());
    }

    let token = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .ok_or_else(unauthorized)?;

    USERS
        .iter()
        .find(|(_, _, t)| *t == token)
        .map(|(name, _, _)| *name)
        .ok_or_else(unauthorized)
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "healthy", "database": "connected" }))
}

async fn login(Form(form): Form<LoginForm>) -> Response {
    match USERS
        .iter()
        .find(|(name, password, _)| *name == form.username && *password == form.password)
    {
        Some((_, _, token)) => {
            Json(json!({ "access_token": token, "token_type": "bearer" })).into_response()
        }
        None => detail(StatusCode::UNAUTHORIZED, "Incorrect identifier or password"),
    }
}

async fn register(Json(body): Json<RegisterBody>) -> Response {
    if body.password.is_empty() {
        return (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({ "detail": [{ "loc": ["body", "password"], "msg": "field required" }] })),
        )
            .into_response();
    }
    if USERS.iter().any(|(name, _, _)| *name == body.username) {
        return detail(StatusCode::BAD_REQUEST, "Username already registered");
    }
    if body.email.ends_with("@taken.example") {
        return detail(StatusCode::BAD_REQUEST, "Email already registered");
    }
    Json(json!({ "message": "User created successfully" })).into_response()
}

async fn me(State(state): State<Arc<StubState>>, headers: HeaderMap) -> Response {
    let username = match authorize(&state, &headers) {
        Ok(name) => name,
        Err(response) => return response,
    };
    state.me_calls.fetch_add(1, Ordering::SeqCst);

    let total_scans = state
        .scans
        .lock()
        .unwrap()
        .iter()
        .filter(|(owner, _)| owner == username)
        .count();

    Json(json!({
        "username": username,
        "email": format!("{}@example.com", username),
        "created_at": "2025-01-15T09:30:00.000001",
        "total_scans": total_scans,
    }))
    .into_response()
}

async fn predict(
    State(state): State<Arc<StubState>>,
    headers: HeaderMap,
    Json(body): Json<PredictBody>,
) -> Response {
    let username = match authorize(&state, &headers) {
        Ok(name) => name,
        Err(response) => return response,
    };
    state.predict_calls.fetch_add(1, Ordering::SeqCst);

    let url = body.url;
    if url.contains("late401") {
        // credential is rejected only after the client has moved on
        state.release_slow.notified().await;
        return detail(StatusCode::UNAUTHORIZED, "Invalid token");
    }
    if url.contains("slow") {
        state.release_slow.notified().await;
    }
    if url.contains("down") {
        return detail(StatusCode::SERVICE_UNAVAILABLE, "Model unavailable. System is initializing.");
    }
    if url.contains("broken") {
        return Json(json!({ "oops": true })).into_response();
    }

    let (prediction, risk_level, confidence) = if url.contains("evil") {
        ("phishing", "high", 0.97)
    } else if url.contains("odd") {
        ("suspicious", "medium", 0.5)
    } else if url.contains("weird") {
        ("malware", "unknown", 0.8)
    } else {
        ("legitimate", "low", 0.05)
    };

    let timestamp = format!("2025-02-01T10:00:{:02}.000000", state.scans.lock().unwrap().len());
    state.scans.lock().unwrap().push((
        username.to_string(),
        json!({
            "url": url,
            "prediction": prediction,
            "risk_level": risk_level,
            "confidence": confidence,
            "timestamp": timestamp,
        }),
    ));

    Json(json!({
        "url": url,
        "prediction": prediction,
        "risk_level": risk_level,
        "confidence": confidence,
        "policy_note": "Risk tier determined by calibrated behavioral analysis.",
        "features": { "url_length": url.len(), "has_ip": false, "tld": "example" },
    }))
    .into_response()
}

async fn history(State(state): State<Arc<StubState>>, headers: HeaderMap) -> Response {
    let username = match authorize(&state, &headers) {
        Ok(name) => name,
        Err(response) => return response,
    };
    state.history_calls.fetch_add(1, Ordering::SeqCst);

    let records: Vec<Value> = state
        .scans
        .lock()
        .unwrap()
        .iter()
        .rev()
        .filter(|(owner, _)| owner == username)
        .map(|(_, record)| record.clone())
        .collect();

    Json(records).into_response()
}
