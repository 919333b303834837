#![forbid(unsafe_code)]

//! Core domain model and business logic for fitlog.
//!
//! This crate provides:
//! - Domain types (workout entries, stored records, dashboard summaries)
//! - The workout log parser and calorie estimator
//! - Dashboard aggregation over half-open day windows
//! - Persistence (journal store, CSV archive, user registry)

pub mod types;
pub mod error;
pub mod config;
pub mod logging;
pub mod window;
pub mod parser;
pub mod estimator;
mod lock;
pub mod store;
pub mod rollup;
pub mod users;
pub mod dashboard;
pub mod workouts;

// Re-export commonly used types
pub use error::{Error, ParseError, ParseErrorKind, Result};
pub use types::*;
pub use config::Config;
pub use parser::{parse, LogParser};
pub use estimator::estimate;
pub use store::{JournalStore, MemoryStore, RecordStore};
pub use users::{UserDirectory, UserRegistry};
pub use window::TimeWindow;
pub use dashboard::{summarize, DashboardResponse};
pub use workouts::{log_workouts, price_entries, workouts_on};
