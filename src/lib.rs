//! Visitor statistics for nginx access logs.
//!
//! A scan reads a log line by line, classifies each visitor line as a bot,
//! a user or a client error and keeps the first record per client address,
//! optionally split around a day, month or year filter.

pub mod classify;
pub mod cli;
pub mod compare;
pub mod date;
pub mod error;
pub mod extract;
pub mod filter;
pub mod logging;
pub mod report;
pub mod scan;
pub mod store;

pub use classify::{Category, Classifier, LogRecord, UserSignal};
pub use cli::Cli;
pub use compare::ComparisonMode;
pub use date::{parse_log_date, parse_log_digits, LogDate};
pub use error::LogError;
pub use extract::DateExtractor;
pub use filter::FilterSpec;
pub use report::{ReportOptions, Reporter, Summary};
pub use scan::{scan_file, ScanConfig, ScanOutcome, Scanner};
pub use store::{Bucket, RecordStore};
