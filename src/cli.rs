use std::{ffi::OsString, path::PathBuf};

use clap::Parser;

use crate::{
    classify::UserSignal,
    compare::ComparisonMode,
    error::LogError,
    filter::FilterSpec,
    report::ReportOptions,
    scan::ScanConfig,
};

/// Long flags that are also accepted with a single dash, e.g. `-day`.
const LEGACY_FLAGS: [&str; 8] = [
    "day", "month", "year", "bots", "new", "old", "detailed", "verbose",
];

/// Long flags followed by a separate value.
const VALUE_FLAGS: [&str; 5] = ["day", "month", "year", "user-signal", "compare"];

const EXAMPLES: &str = "\
EXAMPLES:
  nginx-log-parser access.log
      Display the total number of users that accessed the website
  nginx-log-parser -day 09/07/2020 access.log
      Display the number of users that accessed the website on that day
  nginx-log-parser -month 07/2020 -detailed -verbose access.log
      Display every category for July 2020, one line per visitor";

/// Reads information from an nginx access log.
#[derive(Parser, Debug)]
#[command(name = "nginx-log-parser", version, after_help = EXAMPLES)]
pub struct Cli {
    /// Path to the access log; its name must contain ".log"
    #[arg(value_name = "LOGPATH", value_parser = parse_log_path)]
    pub path: PathBuf,

    /// Only count visits on one day
    #[arg(long, value_name = "DD/MM/YYYY", value_parser = FilterSpec::parse_day, conflicts_with_all = ["month", "year"])]
    pub day: Option<FilterSpec>,

    /// Only count visits in one month
    #[arg(long, value_name = "MM/YYYY", value_parser = FilterSpec::parse_month, conflicts_with = "year")]
    pub month: Option<FilterSpec>,

    /// Only count visits in one year
    #[arg(long, value_name = "YYYY", value_parser = FilterSpec::parse_year)]
    pub year: Option<FilterSpec>,

    /// Display the number of bots who accessed the website
    #[arg(long)]
    pub bots: bool,

    /// Display the number of new users who accessed the website
    #[arg(long)]
    pub new: bool,

    /// Display the number of users who had already accessed the website
    #[arg(long)]
    pub old: bool,

    /// Display every category
    #[arg(long)]
    pub detailed: bool,

    /// Display one line per counted visitor
    #[arg(long)]
    pub verbose: bool,

    /// Print the summary as JSON
    #[arg(long)]
    pub json: bool,

    /// Marker that identifies a user request
    #[arg(long, value_enum, default_value_t = UserSignal::AssetsPath)]
    pub user_signal: UserSignal,

    /// How dates are compared against the filter
    #[arg(long = "compare", value_enum, default_value_t = ComparisonMode::Calendar)]
    pub comparison: ComparisonMode,
}

impl Cli {
    /// Parses arguments, accepting the single-dash spellings as well.
    pub fn parse_args<I, T>(args: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString>,
    {
        Self::parse_from(normalize_legacy_args(args))
    }

    pub fn try_parse_args<I, T>(args: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString>,
    {
        Self::try_parse_from(normalize_legacy_args(args))
    }

    pub fn filter(&self) -> Option<FilterSpec> {
        self.day.or(self.month).or(self.year)
    }

    pub fn scan_config(&self) -> ScanConfig {
        ScanConfig {
            filter: self.filter(),
            user_signal: self.user_signal,
            comparison: self.comparison,
        }
    }

    pub fn report_options(&self) -> ReportOptions {
        ReportOptions {
            bots: self.bots,
            new_users: self.new,
            returning_users: self.old,
            detailed: self.detailed,
            verbose: self.verbose,
            json: self.json,
        }
    }
}

/// Rewrites `-day` style flags to `--day`.
///
/// Values of flags and everything after `--` are passed through untouched.
pub fn normalize_legacy_args<I, T>(args: I) -> Vec<OsString>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString>,
{
    let mut out = Vec::new();
    let mut verbatim = false;
    let mut value_next = false;

    for arg in args.into_iter().map(Into::into) {
        if verbatim || std::mem::take(&mut value_next) {
            out.push(arg);
            continue;
        }
        let Some(s) = arg.to_str() else {
            out.push(arg);
            continue;
        };
        if s == "--" {
            verbatim = true;
            out.push(arg);
            continue;
        }

        let (name, rewrite) = match s.strip_prefix("--") {
            Some(name) => (name, false),
            None => match s.strip_prefix('-') {
                Some(name) if LEGACY_FLAGS.contains(&name) => (name, true),
                _ => ("", false),
            },
        };
        value_next = VALUE_FLAGS.contains(&name);
        let rewritten = rewrite.then(|| OsString::from(format!("--{name}")));
        out.push(rewritten.unwrap_or(arg));
    }
    out
}

fn parse_log_path(s: &str) -> Result<PathBuf, LogError> {
    if s.contains(".log") {
        Ok(PathBuf::from(s))
    } else {
        Err(LogError::InvalidArgument(format!("{s:?} is not a .log file")))
    }
}
