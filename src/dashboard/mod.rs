pub mod catalog;
pub mod chart;
pub mod client;
pub mod query;
pub mod render;
pub mod session;
pub mod state;

pub use catalog::{Category, QuickPick, LAST_PHASE, PHASES, QUICK_PICKS};
pub use chart::{heat_chart, HeatChart};
pub use client::{ApiReply, ClientError, HttpReportApi, ReportApi};
pub use query::{parse_query, Query};
pub use render::{render, write_panels, Panel};
pub use session::{PhaseTiming, Session};
pub use state::{Dashboard, ScanRequest, ScanTicket, View};
