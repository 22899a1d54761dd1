use std::cmp::Ordering;

use crate::{
    date::{parse_log_date, parse_log_digits, LogDate},
    error::Result,
};

/// How a record's date is weighed against a filter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum ComparisonMode {
    /// Numeric calendar ordering of the parsed date.
    #[default]
    Calendar,
    /// Lexicographic ordering of the digit characters as written.
    Bytewise,
}

/// Orders two digit strings character by character.
pub fn compare_digits(a: &[u8], b: &[u8]) -> Ordering {
    a.cmp(b)
}

/// Zero-padded decimal digits of `n`, most significant first.
pub fn digit_bytes<const N: usize>(mut n: u32) -> [u8; N] {
    let mut out = [b'0'; N];
    for slot in out.iter_mut().rev() {
        *slot = b'0' + (n % 10) as u8;
        n /= 10;
    }
    out
}

impl ComparisonMode {
    /// Reads a raw timestamp the way this mode needs it. Only calendar
    /// ordering requires a real calendar date.
    pub fn parse_date(self, raw: &str) -> Result<LogDate> {
        match self {
            ComparisonMode::Calendar => parse_log_date(raw),
            ComparisonMode::Bytewise => parse_log_digits(raw),
        }
    }

    pub fn compare_day(self, date: &LogDate, day: u32) -> Ordering {
        match self {
            ComparisonMode::Calendar => date.day().cmp(&day),
            ComparisonMode::Bytewise => {
                compare_digits(&date.digits().day, &digit_bytes::<2>(day))
            }
        }
    }

    pub fn compare_month(self, date: &LogDate, month: u32) -> Ordering {
        match self {
            ComparisonMode::Calendar => date.month().cmp(&month),
            ComparisonMode::Bytewise => {
                compare_digits(&date.digits().month, &digit_bytes::<2>(month))
            }
        }
    }

    pub fn compare_year(self, date: &LogDate, year: i32) -> Ordering {
        match self {
            ComparisonMode::Calendar => date.year().cmp(&year),
            ComparisonMode::Bytewise => compare_digits(
                &date.digits().year,
                &digit_bytes::<4>(year.unsigned_abs()),
            ),
        }
    }
}
