use regex::Regex;

use crate::error::Result;

/// A bracketed block that ends in a UTC offset, e.g. `[17/May/2015:08:05:32 +0000]`.
const TIMESTAMP_PATTERN: &str = r"\[[^\[\]]* [+-][0-9]+\]";

/// Shortest match that can hold a full `[DD/Mon/YYYY:HH:MM:SS +ZZZZ]`.
pub const MIN_TIMESTAMP_LEN: usize = 23;

/// Finds the bracketed timestamp in the tail of an access log line.
///
/// The pattern is compiled once and shared by every line of a scan.
#[derive(Debug, Clone)]
pub struct DateExtractor {
    re: Regex,
}

impl DateExtractor {
    pub fn new() -> Result<Self> {
        Ok(Self {
            re: Regex::new(TIMESTAMP_PATTERN)?,
        })
    }

    /// Returns the first bracketed timestamp in `tail`, brackets included.
    pub fn extract<'a>(&self, tail: &'a str) -> Option<&'a str> {
        self.re.find(tail).map(|m| m.as_str())
    }
}
