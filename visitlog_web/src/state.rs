//! Shared state handed to every request.

use std::sync::Arc;
use visitlog_core::{Config, VisitLog};

pub struct AppState {
    pub log: Arc<VisitLog>,
    pub top_companies: usize,
    pub latest_records: usize,
}

impl AppState {
    pub fn new(log: VisitLog, config: &Config) -> Self {
        Self {
            log: Arc::new(log),
            top_companies: config.visits.top_companies,
            latest_records: config.visits.latest_records,
        }
    }
}
