//! PhishGuard API Client
//!
//! HTTP gateway in front of every backend call. Attaches the stored
//! credential, decodes success bodies into explicit schemas, and turns
//! every failure into an `ApiError`.

use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;

use super::error::ApiError;
use crate::logic::config::ClientConfig;
use crate::logic::models::HealthResponse;
use crate::logic::token_store::TokenStore;

/// Request body
enum Payload<'a> {
    Empty,
    Json(serde_json::Value),
    Form(&'a [(&'a str, &'a str)]),
}

/// Whether the stored credential goes out with the request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Auth {
    Bearer,
    Anonymous,
}

/// Authenticated API gateway
pub struct RequestGateway {
    config: ClientConfig,
    tokens: Arc<TokenStore>,
    http_client: reqwest::Client,
}

impl RequestGateway {
    /// Create new gateway
    pub fn new(config: ClientConfig, tokens: Arc<TokenStore>) -> Result<Self, ApiError> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| ApiError::Unknown(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self {
            config,
            tokens,
            http_client,
        })
    }

    pub fn tokens(&self) -> &TokenStore {
        &self.tokens
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Authenticated GET
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.dispatch(Method::GET, path, Payload::Empty, Auth::Bearer).await
    }

    /// Authenticated JSON POST
    pub async fn post_json<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let body = to_json(body)?;
        self.dispatch(Method::POST, path, Payload::Json(body), Auth::Bearer).await
    }

    /// JSON POST without the credential (account creation)
    pub async fn post_json_anonymous<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let body = to_json(body)?;
        self.dispatch(Method::POST, path, Payload::Json(body), Auth::Anonymous).await
    }

    /// Form-encoded POST without the credential (credential exchange)
    pub async fn post_form_anonymous<T: DeserializeOwned>(
        &self,
        path: &str,
        fields: &[(&str, &str)],
    ) -> Result<T, ApiError> {
        self.dispatch(Method::POST, path, Payload::Form(fields), Auth::Anonymous).await
    }

    /// Check server health
    pub async fn health(&self) -> Result<HealthResponse, ApiError> {
        self.dispatch(Method::GET, "/health", Payload::Empty, Auth::Anonymous).await
    }

    async fn dispatch<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        payload: Payload<'_>,
        auth: Auth,
    ) -> Result<T, ApiError> {
        let url = self.config.endpoint(path);
        let sent_token = match auth {
            Auth::Bearer => self.tokens.get(),
            Auth::Anonymous => None,
        };

        let mut request = self.http_client.request(method.clone(), &url);
        if let Some(token) = &sent_token {
            request = request.header("Authorization", format!("Bearer {}", token));
        }
        request = match payload {
            Payload::Empty => request,
            Payload::Json(body) => request.json(&body),
            Payload::Form(fields) => request.form(fields),
        };

        log::debug!("{} {} (auth: {})", method, path, sent_token.is_some());

        let response = request.send().await.map_err(|e| {
            log::warn!("{} {} failed: {}", method, path, e);
            ApiError::from_transport(e)
        })?;

        let status = response.status();
        if status.is_success() {
            let bytes = response.bytes().await.map_err(ApiError::from_transport)?;
            return serde_json::from_slice(&bytes).map_err(|e| {
                log::warn!("{} {} returned an unexpected shape: {}", method, path, e);
                ApiError::Unknown(format!("unexpected response shape: {}", e))
            });
        }

        let body = response.text().await.unwrap_or_default();
        let err = ApiError::classify(status, &body);
        log::warn!("{} {} -> {} ({:?})", method, path, status.as_u16(), err.kind());

        if err.is_unauthorized() && auth == Auth::Bearer {
            self.tokens.revoke(sent_token.as_deref());
        }

        Err(err)
    }
}

fn to_json<B: Serialize + ?Sized>(body: &B) -> Result<serde_json::Value, ApiError> {
    serde_json::to_value(body).map_err(|e| ApiError::Unknown(format!("unserializable body: {}", e)))
}
