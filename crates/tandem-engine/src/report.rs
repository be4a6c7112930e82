//! Report sink — store-and-forget moderation records.
//!
//! No coupling back into matching: the engine only supplies the
//! reporter's identity and current partner. Records live in memory and
//! are read out through the ops API.

use std::sync::Arc;

use dashmap::DashMap;
use serde::Serialize;

use crate::engine::now_millis;

/// One stored report.
#[derive(Debug, Clone, Serialize)]
pub struct ReportRecord {
    pub reporter: String,
    /// The reporter's partner at report time, if they had one.
    pub reported: Option<String>,
    /// Client-supplied reason/details, stored verbatim.
    pub payload: serde_json::Value,
    /// Unix millis.
    pub timestamp: u64,
}

/// In-memory report store, keyed by reporter.
#[derive(Clone, Default)]
pub struct ReportStore {
    reports: Arc<DashMap<String, Vec<ReportRecord>>>,
}

impl ReportStore {
    pub fn new() -> Self {
        Self {
            reports: Arc::new(DashMap::new()),
        }
    }

    /// Record a report. Stamps the timestamp on the way in.
    pub fn add(&self, reporter: String, reported: Option<String>, payload: serde_json::Value) {
        let record = ReportRecord {
            reporter: reporter.clone(),
            reported,
            payload,
            timestamp: now_millis(),
        };
        self.reports.entry(reporter).or_default().push(record);
    }

    /// Every stored report, newest last per reporter.
    pub fn all(&self) -> Vec<ReportRecord> {
        self.reports
            .iter()
            .flat_map(|e| e.value().clone())
            .collect()
    }

    pub fn count(&self) -> usize {
        self.reports.iter().map(|e| e.value().len()).sum()
    }

    pub fn clear(&self) {
        self.reports.clear();
    }
}
