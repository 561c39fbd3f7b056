use chrono::{DateTime, Utc};
use serde_json::Value;
use tracing::{debug, info, warn};

use super::catalog::{Category, LAST_PHASE};
use super::client::{ApiReply, ClientError};
use super::query::{parse_query, Query};
use crate::report::{CompareReport, Report, ScanHistory, WatchEntry, Watchlist};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Home,
    Scanning,
    Results,
    Compare,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanRequest {
    Scan { asset: String, category: String },
    Compare { a1: String, a2: String, category: String },
}

/// A request the caller must now send; `id` ties the reply back to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanTicket {
    pub id: u64,
    pub request: ScanRequest,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanProgress {
    pub id: u64,
    pub phase: usize,
}

/// The report on screen in the results view.
#[derive(Debug, Clone, PartialEq)]
pub struct CurrentReport {
    pub report: Report,
    pub raw: Value,
    pub debug: Option<Value>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CurrentCompare {
    pub report: CompareReport,
    pub raw: Value,
}

/// All client state, mutated only through the transition methods below.
#[derive(Debug, Clone, Default)]
pub struct Dashboard {
    view: ViewState,
    category: Category,
    query: String,
    error: Option<String>,
    current: Option<CurrentReport>,
    compare: Option<CurrentCompare>,
    history: ScanHistory,
    watchlist: Watchlist,
    refreshing: bool,
    show_watchlist: bool,
    show_debug: bool,
    next_id: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
enum ViewState {
    #[default]
    Home,
    Scanning(ScanProgress),
    Results,
    Compare,
}

impl Dashboard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn view(&self) -> View {
        match self.view {
            ViewState::Home => View::Home,
            ViewState::Scanning(_) => View::Scanning,
            ViewState::Results => View::Results,
            ViewState::Compare => View::Compare,
        }
    }

    pub fn progress(&self) -> Option<&ScanProgress> {
        match &self.view {
            ViewState::Scanning(progress) => Some(progress),
            _ => None,
        }
    }

    pub fn category(&self) -> Category {
        self.category
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn current(&self) -> Option<&CurrentReport> {
        self.current.as_ref()
    }

    pub fn current_compare(&self) -> Option<&CurrentCompare> {
        self.compare.as_ref()
    }

    pub fn history(&self) -> &ScanHistory {
        &self.history
    }

    pub fn watchlist(&self) -> &Watchlist {
        &self.watchlist
    }

    pub fn is_refreshing(&self) -> bool {
        self.refreshing
    }

    pub fn show_watchlist(&self) -> bool {
        self.show_watchlist
    }

    pub fn show_debug(&self) -> bool {
        self.show_debug
    }

    pub fn set_category(&mut self, category: Category) {
        self.category = category;
    }

    pub fn set_query(&mut self, query: &str) {
        self.query = query.to_string();
    }

    pub fn toggle_watchlist(&mut self) {
        self.show_watchlist = !self.show_watchlist;
    }

    pub fn toggle_debug(&mut self) {
        self.show_debug = !self.show_debug;
    }

    pub fn dismiss_error(&mut self) {
        self.error = None;
    }

    /// Submit search-box text under the selected category. Blank input is a
    /// no-op; "A vs B" starts a comparison.
    pub fn submit(&mut self, input: &str) -> Option<ScanTicket> {
        let category = self.category.id().to_string();
        self.query = input.trim().to_string();

        match parse_query(input)? {
            Query::Single(asset) => Some(self.begin_scan(asset, category)),
            Query::Compare { left, right } => Some(self.begin_compare(left, right, category)),
        }
    }

    /// Scan a specific asset (quick pick, rescan, unscanned watch entry).
    /// A known category tag also becomes the selected one.
    pub fn scan_asset(&mut self, asset: &str, category: &str) -> Option<ScanTicket> {
        let asset = asset.trim();
        if asset.is_empty() {
            return None;
        }
        self.query = asset.to_string();
        if let Ok(known) = category.parse::<Category>() {
            self.category = known;
        }
        Some(self.begin_scan(asset.to_string(), category.to_string()))
    }

    /// Scan the report on screen again.
    pub fn rescan(&mut self) -> Option<ScanTicket> {
        let (asset, category) = self.current_target()?;
        self.scan_asset(&asset, &category)
    }

    fn begin_scan(&mut self, asset: String, category: String) -> ScanTicket {
        self.start_scanning();
        self.show_debug = false;
        info!(%asset, %category, "scan started");
        ScanTicket {
            id: self.next_id,
            request: ScanRequest::Scan { asset, category },
        }
    }

    fn begin_compare(&mut self, a1: String, a2: String, category: String) -> ScanTicket {
        self.start_scanning();
        self.compare = None;
        info!(%a1, %a2, %category, "compare started");
        ScanTicket {
            id: self.next_id,
            request: ScanRequest::Compare { a1, a2, category },
        }
    }

    fn start_scanning(&mut self) {
        self.next_id += 1;
        self.error = None;
        self.view = ViewState::Scanning(ScanProgress {
            id: self.next_id,
            phase: 0,
        });
    }

    fn is_active(&self, id: u64) -> bool {
        matches!(&self.view, ViewState::Scanning(p) if p.id == id)
    }

    /// Cosmetic progress tick. Returns false once `id` is no longer the
    /// active scan, which tells the ticker to stop.
    pub fn advance_phase(&mut self, id: u64) -> bool {
        match &mut self.view {
            ViewState::Scanning(progress) if progress.id == id => {
                progress.phase = (progress.phase + 1).min(LAST_PHASE);
                true
            }
            _ => false,
        }
    }

    /// Apply a single-scan reply. Stale replies are dropped and return false.
    pub fn scan_succeeded(&mut self, id: u64, reply: ApiReply, now: DateTime<Utc>) -> bool {
        if !self.is_active(id) {
            debug!(id, "discarding stale scan result");
            return false;
        }

        let report = Report::from_value(&reply.result);
        self.history.record(report.clone(), reply.result.clone(), now);
        self.current = Some(CurrentReport {
            report,
            raw: reply.result,
            debug: reply.debug,
        });
        self.view = ViewState::Results;
        true
    }

    pub fn compare_succeeded(&mut self, id: u64, reply: ApiReply) -> bool {
        if !self.is_active(id) {
            debug!(id, "discarding stale compare result");
            return false;
        }

        self.compare = Some(CurrentCompare {
            report: CompareReport::from_value(&reply.result),
            raw: reply.result,
        });
        self.view = ViewState::Compare;
        true
    }

    pub fn request_failed(&mut self, id: u64, error: &ClientError) -> bool {
        if !self.is_active(id) {
            debug!(id, "discarding stale failure");
            return false;
        }

        warn!("Request failed: {}", error);
        self.error = Some(error.to_string());
        self.view = ViewState::Home;
        true
    }

    /// Back to home from anywhere. An in-flight scan keeps running but its
    /// result will be discarded.
    pub fn back(&mut self) {
        self.view = ViewState::Home;
    }

    pub fn open_history(&mut self, index: usize) -> bool {
        let Some(entry) = self.history.get(index) else {
            return false;
        };
        self.current = Some(CurrentReport {
            report: entry.report.clone(),
            raw: entry.raw.clone(),
            debug: None,
        });
        self.view = ViewState::Results;
        true
    }

    /// Show a watched asset: its last report if it has one, else scan it.
    pub fn open_watch(&mut self, asset: &str) -> Option<ScanTicket> {
        let entry = self.watchlist.get(asset)?.clone();
        match (entry.data, entry.raw) {
            (Some(report), Some(raw)) => {
                self.current = Some(CurrentReport {
                    report,
                    raw,
                    debug: None,
                });
                self.view = ViewState::Results;
                None
            }
            _ => self.scan_asset(&entry.asset, &entry.category),
        }
    }

    fn current_target(&self) -> Option<(String, String)> {
        let current = self.current.as_ref()?;
        let asset = current
            .report
            .asset
            .clone()
            .or_else(|| Some(self.query.clone()).filter(|q| !q.is_empty()))?;
        let category = current
            .report
            .category
            .clone()
            .unwrap_or_else(|| self.category.id().to_string());
        Some((asset, category))
    }

    /// Watch the report on screen.
    pub fn watch_current(&mut self) -> bool {
        match self.current_target() {
            Some((asset, category)) => self.watchlist.add(&asset, &category),
            None => false,
        }
    }

    pub fn add_watch(&mut self, asset: &str, category: &str) -> bool {
        self.watchlist.add(asset, category)
    }

    pub fn remove_watch(&mut self, asset: &str) -> bool {
        self.watchlist.remove(asset).is_some()
    }

    pub fn is_watched(&self, asset: &str) -> bool {
        self.watchlist.contains(asset)
    }

    /// Start a bulk refresh. `None` when one is already running or there is
    /// nothing to refresh.
    pub fn begin_refresh(&mut self) -> Option<Vec<(String, String)>> {
        if self.refreshing || self.watchlist.is_empty() {
            return None;
        }
        self.refreshing = true;
        Some(self.watchlist.targets())
    }

    /// Record one refresh reply. Returns the updated row, or `None` if the
    /// asset was unwatched meanwhile.
    pub fn refresh_row(
        &mut self,
        asset: &str,
        result: Result<ApiReply, ClientError>,
    ) -> Option<&WatchEntry> {
        let entry = self.watchlist.get_mut(asset)?;
        match result {
            Ok(reply) => entry.apply_report(Report::from_value(&reply.result), reply.result),
            Err(e) => {
                warn!("Watchlist refresh failed for {}: {}", asset, e);
                entry.mark_failed();
            }
        }
        Some(&*entry)
    }

    pub fn end_refresh(&mut self) {
        self.refreshing = false;
    }
}
