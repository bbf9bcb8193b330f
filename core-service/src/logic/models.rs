//! API Models
//!
//! Explicit schemas for everything the PhishGuard API returns.
//! Shapes that decode but make no sense (confidence outside [0, 1],
//! empty username) are rejected as `ApiError::Unknown`.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;

use super::gateway::ApiError;

// ============================================================================
// VERDICT
// ============================================================================

/// Backend classification of a URL
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    Legitimate,
    Suspicious,
    Phishing,
}

impl Verdict {
    pub const ALL: [Verdict; 3] = [Verdict::Legitimate, Verdict::Suspicious, Verdict::Phishing];

    pub fn as_str(&self) -> &'static str {
        match self {
            Verdict::Legitimate => "legitimate",
            Verdict::Suspicious => "suspicious",
            Verdict::Phishing => "phishing",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|v| v.as_str() == value)
    }
}

impl std::fmt::Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Verdict as it arrived on the wire.
///
/// Unrecognized strings are kept verbatim instead of failing the whole
/// response, so callers can still show the result (as low severity).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Prediction {
    Known(Verdict),
    Unrecognized(String),
}

impl Prediction {
    pub fn verdict(&self) -> Option<Verdict> {
        match self {
            Prediction::Known(v) => Some(*v),
            Prediction::Unrecognized(_) => None,
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Prediction::Known(v) => v.as_str(),
            Prediction::Unrecognized(raw) => raw,
        }
    }
}

impl From<Verdict> for Prediction {
    fn from(v: Verdict) -> Self {
        Prediction::Known(v)
    }
}

impl From<&str> for Prediction {
    fn from(raw: &str) -> Self {
        match Verdict::parse(raw) {
            Some(v) => Prediction::Known(v),
            None => Prediction::Unrecognized(raw.to_string()),
        }
    }
}

impl std::fmt::Display for Prediction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl Serialize for Prediction {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Prediction {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Prediction::from(raw.as_str()))
    }
}

// ============================================================================
// FEATURES
// ============================================================================

/// One extracted URL feature as reported by the backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FeatureValue {
    Bool(bool),
    Number(f64),
    Text(String),
}

impl std::fmt::Display for FeatureValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FeatureValue::Bool(b) => write!(f, "{}", b),
            FeatureValue::Number(n) => write!(f, "{}", n),
            FeatureValue::Text(s) => write!(f, "{}", s),
        }
    }
}

pub type Features = BTreeMap<String, FeatureValue>;

// ============================================================================
// USER
// ============================================================================

/// Profile returned by `GET /me`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    /// Not every backend build returns the id
    #[serde(default)]
    pub id: Option<i64>,

    pub username: String,

    pub email: String,

    #[serde(default, deserialize_with = "timestamp::deserialize_opt")]
    pub created_at: Option<DateTime<Utc>>,

    #[serde(default)]
    pub total_scans: u64,
}

impl User {
    pub fn validate(self) -> Result<Self, ApiError> {
        if self.username.trim().is_empty() {
            return Err(ApiError::Unknown("profile has an empty username".to_string()));
        }
        Ok(self)
    }
}

// ============================================================================
// DETECTION
// ============================================================================

/// Response of `POST /predict`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectionResult {
    #[serde(default)]
    pub url: String,

    pub prediction: Prediction,

    pub confidence: f64,

    #[serde(default)]
    pub features: Features,

    #[serde(default)]
    pub risk_level: Option<String>,

    #[serde(default)]
    pub policy_note: Option<String>,
}

impl DetectionResult {
    pub fn validate(self) -> Result<Self, ApiError> {
        check_confidence(self.confidence)?;
        Ok(self)
    }

    /// Confidence as a percentage with one decimal, e.g. `97.0%`
    pub fn confidence_percent(&self) -> String {
        format_percent(self.confidence)
    }
}

// ============================================================================
// HISTORY
// ============================================================================

/// One entry of `GET /history`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanRecord {
    pub url: String,

    #[serde(deserialize_with = "timestamp::deserialize")]
    pub timestamp: DateTime<Utc>,

    pub prediction: Prediction,

    pub confidence: f64,

    #[serde(default)]
    pub features: Features,

    #[serde(default)]
    pub risk_level: Option<String>,
}

impl ScanRecord {
    pub fn validate(self) -> Result<Self, ApiError> {
        check_confidence(self.confidence)?;
        Ok(self)
    }

    pub fn confidence_percent(&self) -> String {
        format_percent(self.confidence)
    }
}

// ============================================================================
// REQUESTS / SMALL RESPONSES
// ============================================================================

#[derive(Debug, Serialize)]
pub struct PredictRequest<'a> {
    pub url: &'a str,
}

#[derive(Debug, Serialize)]
pub struct RegisterRequest<'a> {
    pub username: &'a str,
    pub email: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct RegisterResponse {
    #[serde(default)]
    pub message: String,
}

/// Response of the credential exchange
#[derive(Debug, Deserialize)]
pub struct TokenGrant {
    pub access_token: String,
    #[serde(default)]
    pub token_type: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    #[serde(default)]
    pub database: Option<String>,
}

fn check_confidence(confidence: f64) -> Result<(), ApiError> {
    if !confidence.is_finite() || !(0.0..=1.0).contains(&confidence) {
        return Err(ApiError::Unknown(format!(
            "confidence {} outside [0, 1]",
            confidence
        )));
    }
    Ok(())
}

fn format_percent(confidence: f64) -> String {
    format!("{:.1}%", confidence * 100.0)
}

/// ISO-8601 timestamps with or without an offset; naive values are UTC.
mod timestamp {
    use super::*;

    pub fn parse(raw: &str) -> Option<DateTime<Utc>> {
        if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
            return Some(dt.with_timezone(&Utc));
        }
        NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
            .ok()
            .map(|naive| naive.and_utc())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(d)?;
        parse(&raw).ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp: {}", raw)))
    }

    pub fn deserialize_opt<'de, D: Deserializer<'de>>(
        d: D,
    ) -> Result<Option<DateTime<Utc>>, D::Error> {
        match Option::<String>::deserialize(d)? {
            Some(raw) => parse(&raw)
                .map(Some)
                .ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp: {}", raw))),
            None => Ok(None),
        }
    }
}
