use serde::{Serialize, Serializer};

use super::types::Report;

/// Heat column of a watched asset.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum WatchHeat {
    #[default]
    Unscanned,
    Reading(f64),
    /// Last refresh failed.
    Failed,
}

impl WatchHeat {
    pub fn reading(self) -> Option<f64> {
        match self {
            WatchHeat::Reading(v) => Some(v),
            _ => None,
        }
    }
}

/// `null` before the first scan, `-1` after a failed one.
impl Serialize for WatchHeat {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            WatchHeat::Unscanned => serializer.serialize_none(),
            WatchHeat::Reading(v) => serializer.serialize_f64(*v),
            WatchHeat::Failed => serializer.serialize_i64(-1),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WatchEntry {
    pub asset: String,
    pub category: String,
    pub heat: WatchHeat,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trend: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(skip)]
    pub data: Option<Report>,
    #[serde(skip)]
    pub raw: Option<serde_json::Value>,
}

impl WatchEntry {
    pub fn new(asset: impl Into<String>, category: impl Into<String>) -> Self {
        Self {
            asset: asset.into(),
            category: category.into(),
            heat: WatchHeat::Unscanned,
            label: None,
            trend: None,
            summary: None,
            data: None,
            raw: None,
        }
    }

    /// Copy the headline fields of a fresh report onto the row.
    pub fn apply_report(&mut self, report: Report, raw: serde_json::Value) {
        self.heat = report
            .heat_index
            .map(WatchHeat::Reading)
            .unwrap_or(WatchHeat::Unscanned);
        self.label = report.heat_label.clone();
        self.trend = report.trend_direction.clone();
        self.summary = report.summary().map(str::to_string);
        self.data = Some(report);
        self.raw = Some(raw);
    }

    /// Keeps the last good data; only the heat column flips.
    pub fn mark_failed(&mut self) {
        self.heat = WatchHeat::Failed;
    }
}

/// Watched assets in insertion order, unique by asset name.
#[derive(Debug, Clone, Default)]
pub struct Watchlist {
    entries: Vec<WatchEntry>,
}

impl Watchlist {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns false when the asset was already watched.
    pub fn add(&mut self, asset: &str, category: &str) -> bool {
        if self.contains(asset) {
            return false;
        }
        self.entries.push(WatchEntry::new(asset, category));
        true
    }

    pub fn remove(&mut self, asset: &str) -> Option<WatchEntry> {
        let idx = self.entries.iter().position(|e| e.asset == asset)?;
        Some(self.entries.remove(idx))
    }

    pub fn contains(&self, asset: &str) -> bool {
        self.entries.iter().any(|e| e.asset == asset)
    }

    pub fn get(&self, asset: &str) -> Option<&WatchEntry> {
        self.entries.iter().find(|e| e.asset == asset)
    }

    pub fn get_mut(&mut self, asset: &str) -> Option<&mut WatchEntry> {
        self.entries.iter_mut().find(|e| e.asset == asset)
    }

    pub fn entries(&self) -> &[WatchEntry] {
        &self.entries
    }

    /// `(asset, category)` pairs in list order, for a refresh pass.
    pub fn targets(&self) -> Vec<(String, String)> {
        self.entries
            .iter()
            .map(|e| (e.asset.clone(), e.category.clone()))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
