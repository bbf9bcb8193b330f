//! Scan History
//!
//! Fetches the user's past scans and filters them locally. Filtering never
//! touches the network; it projects over the last fetched list.

use parking_lot::RwLock;
use serde::Serialize;
use std::str::FromStr;
use std::sync::Arc;

use super::gateway::{ApiError, RequestGateway};
use super::models::{ScanRecord, Verdict};
use super::session::SessionManager;

/// History filter: everything, or one verdict
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VerdictFilter {
    #[default]
    All,
    Only(Verdict),
}

impl VerdictFilter {
    pub fn matches(&self, record: &ScanRecord) -> bool {
        match self {
            VerdictFilter::All => true,
            VerdictFilter::Only(verdict) => record.prediction.verdict() == Some(*verdict),
        }
    }
}

impl FromStr for VerdictFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().to_ascii_lowercase();
        if s == "all" {
            return Ok(VerdictFilter::All);
        }
        Verdict::parse(&s)
            .map(VerdictFilter::Only)
            .ok_or_else(|| format!("unknown filter '{}', expected all, legitimate, suspicious or phishing", s))
    }
}

/// Filtered records plus the size of the unfiltered list
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryView {
    pub records: Vec<ScanRecord>,
    pub total: usize,
}

impl HistoryView {
    /// The user has never scanned anything
    pub fn is_empty_history(&self) -> bool {
        self.total == 0
    }

    /// There are scans, just none matching the filter
    pub fn has_no_matches(&self) -> bool {
        self.total > 0 && self.records.is_empty()
    }
}

/// Per-verdict tallies
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct VerdictCounts {
    pub legitimate: usize,
    pub suspicious: usize,
    pub phishing: usize,
    pub unrecognized: usize,
}

impl VerdictCounts {
    pub fn total(&self) -> usize {
        self.legitimate + self.suspicious + self.phishing + self.unrecognized
    }
}

/// History query with a local cache of the last fetch
pub struct HistoryQuery {
    gateway: Arc<RequestGateway>,
    session: Arc<SessionManager>,
    records: RwLock<Vec<ScanRecord>>,
}

impl HistoryQuery {
    pub fn new(gateway: Arc<RequestGateway>, session: Arc<SessionManager>) -> Self {
        Self {
            gateway,
            session,
            records: RwLock::new(Vec::new()),
        }
    }

    /// Fetch the user's scans in server order (newest first by convention)
    pub async fn fetch_all(&self) -> Result<Vec<ScanRecord>, ApiError> {
        if !self.session.is_authenticated() {
            return Err(ApiError::Unauthorized("Sign in to view your scan history.".to_string()));
        }

        let fetched = self
            .gateway
            .get::<Vec<ScanRecord>>("/history")
            .await
            .and_then(|records| {
                records
                    .into_iter()
                    .map(ScanRecord::validate)
                    .collect::<Result<Vec<_>, _>>()
            });

        let records = match fetched {
            Ok(records) => records,
            Err(e) => {
                if e.is_unauthorized() {
                    self.records.write().clear();
                    self.session.expire();
                }
                log::warn!("History fetch failed: {}", e);
                return Err(e);
            }
        };

        log::info!("Fetched {} scan records", records.len());
        *self.records.write() = records.clone();
        Ok(records)
    }

    /// Last fetched list, unfiltered
    pub fn records(&self) -> Vec<ScanRecord> {
        self.records.read().clone()
    }

    /// Records matching `filter`, in fetched order
    pub fn filter_by(&self, filter: VerdictFilter) -> Vec<ScanRecord> {
        self.records
            .read()
            .iter()
            .filter(|record| filter.matches(record))
            .cloned()
            .collect()
    }

    pub fn view(&self, filter: VerdictFilter) -> HistoryView {
        let records = self.records.read();
        HistoryView {
            records: records.iter().filter(|r| filter.matches(r)).cloned().collect(),
            total: records.len(),
        }
    }

    pub fn counts(&self) -> VerdictCounts {
        let mut counts = VerdictCounts::default();
        for record in self.records.read().iter() {
            match record.prediction.verdict() {
                Some(Verdict::Legitimate) => counts.legitimate += 1,
                Some(Verdict::Suspicious) => counts.suspicious += 1,
                Some(Verdict::Phishing) => counts.phishing += 1,
                None => counts.unrecognized += 1,
            }
        }
        counts
    }

    #[cfg(test)]
    fn load(&self, records: Vec<ScanRecord>) {
        *self.records.write() = records;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::config::ClientConfig;
    use crate::logic::models::Prediction;
    use crate::logic::token_store::TokenStore;
    use chrono::Utc;

    fn query() -> HistoryQuery {
        let config = ClientConfig::for_base_url("http://127.0.0.1:9");
        let gateway = Arc::new(RequestGateway::new(config, Arc::new(TokenStore::in_memory())).unwrap());
        let session = Arc::new(SessionManager::new(gateway.clone()));
        HistoryQuery::new(gateway, session)
    }

    fn record(url: &str, prediction: &str) -> ScanRecord {
        ScanRecord {
            url: url.to_string(),
            timestamp: Utc::now(),
            prediction: Prediction::from(prediction),
            confidence: 0.5,
            features: Default::default(),
            risk_level: None,
        }
    }

    #[test]
    fn test_filter_parsing() {
        assert_eq!("all".parse::<VerdictFilter>().unwrap(), VerdictFilter::All);
        assert_eq!(
            " Phishing ".parse::<VerdictFilter>().unwrap(),
            VerdictFilter::Only(Verdict::Phishing)
        );
        assert!("malware".parse::<VerdictFilter>().is_err());
    }

    #[test]
    fn test_filter_by_verdict() {
        let q = query();
        q.load(vec![
            record("https://a.example", "phishing"),
            record("https://b.example", "legitimate"),
            record("https://c.example", "phishing"),
            record("https://d.example", "weird"),
        ]);

        assert_eq!(q.filter_by(VerdictFilter::All).len(), 4);

        let phishing = q.filter_by(VerdictFilter::Only(Verdict::Phishing));
        let urls: Vec<_> = phishing.iter().map(|r| r.url.as_str()).collect();
        assert_eq!(urls, ["https://a.example", "https://c.example"]);

        assert!(q.filter_by(VerdictFilter::Only(Verdict::Suspicious)).is_empty());

        // filtering never mutates the cache
        assert_eq!(q.records().len(), 4);
    }

    #[test]
    fn test_empty_states_are_distinguishable() {
        let q = query();
        let view = q.view(VerdictFilter::All);
        assert!(view.is_empty_history());
        assert!(!view.has_no_matches());

        q.load(vec![record("https://a.example", "legitimate")]);
        let view = q.view(VerdictFilter::Only(Verdict::Phishing));
        assert!(!view.is_empty_history());
        assert!(view.has_no_matches());
    }

    #[test]
    fn test_counts() {
        let q = query();
        q.load(vec![
            record("https://a.example", "phishing"),
            record("https://b.example", "suspicious"),
            record("https://c.example", "legitimate"),
            record("https://d.example", "legitimate"),
            record("https://e.example", "??"),
        ]);

        let counts = q.counts();
        assert_eq!(counts.legitimate, 2);
        assert_eq!(counts.suspicious, 1);
        assert_eq!(counts.phishing, 1);
        assert_eq!(counts.unrecognized, 1);
        assert_eq!(counts.total(), 5);
    }

    #[tokio::test]
    async fn test_fetch_requires_session() {
        let q = query();
        let err = q.fetch_all().await.unwrap_err();
        assert!(err.is_unauthorized());
    }
}
