use chrono::Utc;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tracing::{debug, info};

use super::client::ReportApi;
use super::state::{Dashboard, ScanRequest, ScanTicket};
use crate::config::ClientConfig;
use crate::report::WatchEntry;

/// Tick periods of the cosmetic phase counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhaseTiming {
    pub scan: Duration,
    pub compare: Duration,
}

impl PhaseTiming {
    pub fn from_config(config: &ClientConfig) -> Self {
        Self {
            scan: Duration::from_millis(config.scan_phase_ms),
            compare: Duration::from_millis(config.compare_phase_ms),
        }
    }

    fn for_request(&self, request: &ScanRequest) -> Duration {
        match request {
            ScanRequest::Scan { .. } => self.scan,
            ScanRequest::Compare { .. } => self.compare,
        }
    }
}

impl Default for PhaseTiming {
    fn default() -> Self {
        Self::from_config(&ClientConfig::default())
    }
}

/// Drives a [`Dashboard`] against a [`ReportApi`].
#[derive(Clone)]
pub struct Session {
    state: Arc<Mutex<Dashboard>>,
    api: Arc<dyn ReportApi>,
    timing: PhaseTiming,
}

impl Session {
    pub fn new(api: Arc<dyn ReportApi>, timing: PhaseTiming) -> Self {
        Self {
            state: Arc::new(Mutex::new(Dashboard::new())),
            api,
            timing,
        }
    }

    /// Lock the dashboard. The lock is never held across an await.
    pub fn dashboard(&self) -> MutexGuard<'_, Dashboard> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Submit search-box text and wait for the outcome. Returns whether a
    /// result was applied to the view.
    pub async fn submit(&self, input: &str) -> bool {
        let ticket = self.dashboard().submit(input);
        match ticket {
            Some(ticket) => self.run(ticket).await,
            None => false,
        }
    }

    /// Send a ticket's request while a ticker advances the phase counter.
    /// The ticker is aborted as soon as the request settles, whichever way.
    pub async fn run(&self, ticket: ScanTicket) -> bool {
        let period = self.timing.for_request(&ticket.request);
        let ticker = tokio::spawn(tick_phases(self.state.clone(), ticket.id, period));

        let outcome = match &ticket.request {
            ScanRequest::Scan { asset, category } => self.api.scan(asset, category).await,
            ScanRequest::Compare { a1, a2, category } => {
                self.api.compare(a1, a2, category).await
            }
        };
        ticker.abort();

        let mut dashboard = self.dashboard();
        match (ticket.request, outcome) {
            (ScanRequest::Scan { .. }, Ok(reply)) => {
                dashboard.scan_succeeded(ticket.id, reply, Utc::now())
            }
            (ScanRequest::Compare { .. }, Ok(reply)) => {
                dashboard.compare_succeeded(ticket.id, reply)
            }
            (_, Err(e)) => dashboard.request_failed(ticket.id, &e),
        }
    }

    /// Re-scan every watched asset one at a time, in list order. `on_row`
    /// sees each row as soon as its reply lands. Returns how many rows were
    /// processed; zero if a refresh was already running.
    pub async fn refresh_watchlist<F>(&self, mut on_row: F) -> usize
    where
        F: FnMut(&WatchEntry) + Send,
    {
        let Some(targets) = self.dashboard().begin_refresh() else {
            return 0;
        };
        info!("Refreshing {} watched assets", targets.len());

        let mut processed = 0;
        for (asset, category) in targets {
            let result = self.api.scan(&asset, &category).await;
            let row = self.dashboard().refresh_row(&asset, result).cloned();
            if let Some(row) = row {
                on_row(&row);
            }
            processed += 1;
        }

        self.dashboard().end_refresh();
        processed
    }
}

async fn tick_phases(state: Arc<Mutex<Dashboard>>, id: u64, period: Duration) {
    let mut interval = tokio::time::interval(period);
    // The first tick completes immediately.
    interval.tick().await;

    loop {
        interval.tick().await;
        let advanced = state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .advance_phase(id);
        if !advanced {
            debug!(id, "phase ticker stopping");
            break;
        }
    }
}
