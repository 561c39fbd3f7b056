pub mod config;
pub mod dashboard;
pub mod proxy;
pub mod report;
