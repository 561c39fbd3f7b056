use chrono::{DateTime, Utc};
use std::collections::VecDeque;

use super::types::Report;

/// Most recent scans kept per session.
pub const HISTORY_LIMIT: usize = 20;

#[derive(Debug, Clone, PartialEq)]
pub struct HistoryEntry {
    pub report: Report,
    pub raw: serde_json::Value,
    pub captured_at: DateTime<Utc>,
}

impl HistoryEntry {
    pub fn asset(&self) -> Option<&str> {
        self.report.asset.as_deref()
    }
}

/// Recent scan results, newest first, one entry per asset name.
#[derive(Debug, Clone)]
pub struct ScanHistory {
    entries: VecDeque<HistoryEntry>,
    limit: usize,
}

impl ScanHistory {
    pub fn new() -> Self {
        Self::with_limit(HISTORY_LIMIT)
    }

    pub fn with_limit(limit: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(limit),
            limit,
        }
    }

    /// Drop any entry for the same asset, prepend, truncate.
    pub fn record(&mut self, report: Report, raw: serde_json::Value, captured_at: DateTime<Utc>) {
        let asset = report.asset.clone();
        self.entries.retain(|e| e.report.asset != asset);
        self.entries.push_front(HistoryEntry {
            report,
            raw,
            captured_at,
        });
        self.entries.truncate(self.limit);
    }

    pub fn get(&self, index: usize) -> Option<&HistoryEntry> {
        self.entries.get(index)
    }

    pub fn recent(&self, n: usize) -> impl Iterator<Item = &HistoryEntry> {
        self.entries.iter().take(n)
    }

    pub fn iter(&self) -> impl Iterator<Item = &HistoryEntry> {
        self.entries.iter()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for ScanHistory {
    fn default() -> Self {
        Self::new()
    }
}
