//! Severity Mapping
//!
//! Verdict → UI severity. Pure and total: unknown predictions fall back to
//! `Low` so a result is always displayable. The workflow logs them once when
//! the result arrives.

use serde::Serialize;

use crate::logic::models::{Prediction, Verdict};

/// How loudly a result should be presented
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
}

impl Severity {
    pub fn from_verdict(verdict: Verdict) -> Self {
        match verdict {
            Verdict::Phishing => Severity::High,
            Verdict::Suspicious => Severity::Medium,
            Verdict::Legitimate => Severity::Low,
        }
    }

    pub fn from_prediction(prediction: &Prediction) -> Self {
        match prediction {
            Prediction::Known(verdict) => Self::from_verdict(*verdict),
            Prediction::Unrecognized(_) => Severity::Low,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Severity::High => "MALICIOUS SITE BLOCKED",
            Severity::Medium => "SUSPICIOUS ACTIVITY DETECTED",
            Severity::Low => "CLEAN SCAN RESULT",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Severity::High => {
                "Predicted phishing intent. URL matches verified malicious behavioral clusters."
            }
            Severity::Medium => {
                "Ambiguous patterns detected. Neural analysis flagged low-credibility signals."
            }
            Severity::Low => "No known malicious patterns identified by our security policy engine.",
        }
    }

    pub fn guidance(&self) -> &'static str {
        match self {
            Severity::High => {
                "HIGH RISK DETECTED. This site shows strong indicators of phishing. Close this page \
                 immediately and do not proceed with any interaction."
            }
            Severity::Medium => {
                "Our neural model detected unusual patterns. We recommend avoiding entering any \
                 sensitive information or credentials on this site."
            }
            Severity::Low => {
                "This URL appears to be safe. You can proceed with confidence, but always stay \
                 vigilant for subtle changes in site behavior."
            }
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
