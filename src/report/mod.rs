pub mod display;
pub mod history;
pub mod types;
pub mod watchlist;

pub use history::{HistoryEntry, ScanHistory, HISTORY_LIMIT};
pub use types::{CompareReport, Dimension, Report};
pub use watchlist::{WatchEntry, WatchHeat, Watchlist};
