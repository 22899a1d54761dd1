use std::{cmp::Ordering, fmt, str::FromStr};

use chrono::NaiveDate;
use pest::Parser;
use pest_derive::Parser;
use serde::{Serialize, Serializer};

use crate::{
    compare::ComparisonMode,
    date::LogDate,
    error::{LogError, Result},
    store::Bucket,
};

#[derive(Parser)]
#[grammar = "filter.pest"]
struct FilterParser;

/// Restricts a scan to one calendar day, month or year.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterSpec {
    Day { day: u32, month: u32, year: i32 },
    Month { month: u32, year: i32 },
    Year { year: i32 },
}

/// Fields captured by one filter rule. Each rule always captures its own
/// fields, so a missing one means a rule was asked for the wrong parts.
#[derive(Default)]
struct Parts {
    day: Option<u32>,
    month: Option<u32>,
    year: Option<i32>,
}

impl FilterSpec {
    /// Parses `DD/MM/YYYY`.
    pub fn parse_day(s: &str) -> Result<Self> {
        let parts = parse_parts(Rule::day_filter, s, "<dd/mm/yyyy>")?;
        let (day, month, year) = (
            required(parts.day, s)?,
            required(parts.month, s)?,
            required(parts.year, s)?,
        );
        if NaiveDate::from_ymd_opt(year, month, day).is_none() {
            return Err(LogError::InvalidArgument(format!("{s} is not a calendar day")));
        }
        Ok(FilterSpec::Day { day, month, year })
    }

    /// Parses `MM/YYYY`.
    pub fn parse_month(s: &str) -> Result<Self> {
        let parts = parse_parts(Rule::month_filter, s, "<mm/yyyy>")?;
        let (month, year) = (required(parts.month, s)?, required(parts.year, s)?);
        if !(1..=12).contains(&month) {
            return Err(LogError::InvalidArgument(format!("{s} is not a calendar month")));
        }
        Ok(FilterSpec::Month { month, year })
    }

    /// Parses `YYYY`.
    pub fn parse_year(s: &str) -> Result<Self> {
        let parts = parse_parts(Rule::year_filter, s, "<yyyy>")?;
        Ok(FilterSpec::Year {
            year: required(parts.year, s)?,
        })
    }

    /// Picks the bucket a record dated `date` belongs to, if any.
    ///
    /// Records strictly before the filter go to [`Bucket::Prior`], records
    /// inside it to [`Bucket::Matched`]; later records are dropped.
    pub fn bucket_for(&self, date: &LogDate, mode: ComparisonMode) -> Option<Bucket> {
        match mode {
            ComparisonMode::Calendar => match self.calendar_order(date, mode) {
                Ordering::Less => Some(Bucket::Prior),
                Ordering::Equal => Some(Bucket::Matched),
                Ordering::Greater => None,
            },
            ComparisonMode::Bytewise => self.component_chain(date, mode),
        }
    }

    fn calendar_order(&self, date: &LogDate, mode: ComparisonMode) -> Ordering {
        match *self {
            FilterSpec::Day { day, month, year } => mode
                .compare_year(date, year)
                .then(mode.compare_month(date, month))
                .then(mode.compare_day(date, day)),
            FilterSpec::Month { month, year } => mode
                .compare_year(date, year)
                .then(mode.compare_month(date, month)),
            FilterSpec::Year { year } => mode.compare_year(date, year),
        }
    }

    // Each component is weighed on its own: a record from 10/06 is neither
    // before nor on a 09/07 filter.
    fn component_chain(&self, date: &LogDate, mode: ComparisonMode) -> Option<Bucket> {
        let (earlier, equal) = match *self {
            FilterSpec::Day { day, month, year } => {
                let d = mode.compare_day(date, day);
                let m = mode.compare_month(date, month);
                let y = mode.compare_year(date, year);
                (
                    d.is_lt() && m.is_le() && y.is_le(),
                    d.is_eq() && m.is_eq() && y.is_eq(),
                )
            }
            FilterSpec::Month { month, year } => {
                let m = mode.compare_month(date, month);
                let y = mode.compare_year(date, year);
                (m.is_lt() && y.is_le(), m.is_eq() && y.is_eq())
            }
            FilterSpec::Year { year } => {
                let y = mode.compare_year(date, year);
                (y.is_lt(), y.is_eq())
            }
        };

        if earlier {
            Some(Bucket::Prior)
        } else if equal {
            Some(Bucket::Matched)
        } else {
            None
        }
    }
}

fn parse_parts(rule: Rule, input: &str, usage: &str) -> Result<Parts> {
    let invalid = || {
        LogError::InvalidArgument(format!("insert a valid date {usage}, got {input:?}"))
    };
    let pair = FilterParser::parse(rule, input)
        .map_err(|_| invalid())?
        .next()
        .ok_or_else(invalid)?;

    let mut parts = Parts::default();
    for inner in pair.into_inner() {
        match inner.as_rule() {
            Rule::day => parts.day = Some(number(inner.as_str(), input)?),
            Rule::month => parts.month = Some(number(inner.as_str(), input)?),
            Rule::year => parts.year = Some(number(inner.as_str(), input)?),
            _ => {}
        }
    }
    Ok(parts)
}

fn number<T>(digits: &str, input: &str) -> Result<T>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    digits
        .parse()
        .map_err(|e| LogError::InvalidArgument(format!("{digits:?} in {input:?}: {e}")))
}

fn required<T>(part: Option<T>, input: &str) -> Result<T> {
    part.ok_or_else(|| LogError::InvalidArgument(format!("incomplete date {input:?}")))
}

impl fmt::Display for FilterSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilterSpec::Day { day, month, year } => write!(f, "{day:02}/{month:02}/{year:04}"),
            FilterSpec::Month { month, year } => write!(f, "{month:02}/{year:04}"),
            FilterSpec::Year { year } => write!(f, "{year:04}"),
        }
    }
}

impl Serialize for FilterSpec {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
