#![forbid(unsafe_code)]

//! Core domain model and business logic for the facility visitor log.
//!
//! This crate provides:
//! - Domain types (visit records, events, outcomes)
//! - Persistence (CSV record store with file locking)
//! - Entry/exit reconciliation
//! - Aggregate statistics and report payloads
//! - A serialized access handle shared by the front ends

pub mod types;
pub mod error;
pub mod clock;
pub mod config;
pub mod logging;
pub mod store;
pub mod reconcile;
pub mod stats;
pub mod report;
pub mod visit_log;

// Re-export commonly used types
pub use error::{Error, Result};
pub use types::*;
pub use clock::{Clock, FixedClock, SystemClock};
pub use config::Config;
pub use store::CsvStore;
pub use reconcile::apply_event;
pub use report::{feed_json, ChartSeries, DataFeed, FeedRow, Summary};
pub use visit_log::VisitLog;
