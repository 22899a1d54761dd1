use std::fmt;

use serde::Serialize;

use crate::{
    classify::{Category, LogRecord},
    error::Result,
    filter::FilterSpec,
    scan::ScanOutcome,
    store::{Bucket, RecordStore},
};

/// Which parts of the summary to print.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReportOptions {
    pub bots: bool,
    pub new_users: bool,
    pub returning_users: bool,
    pub detailed: bool,
    pub verbose: bool,
    pub json: bool,
}

impl ReportOptions {
    fn any_category(&self) -> bool {
        self.bots || self.new_users || self.returning_users || self.detailed
    }
}

/// How a counted record was tallied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Visit {
    Bot,
    NewUser,
    ReturningUser,
    ClientError,
}

impl Visit {
    /// A user already seen before the filter window is a returning one.
    pub fn of(record: &LogRecord, store: &RecordStore) -> Self {
        match record.category {
            Category::Bot => Visit::Bot,
            Category::User if store.contains(Bucket::Prior, &record.identifier) => {
                Visit::ReturningUser
            }
            Category::User => Visit::NewUser,
            Category::ClientError => Visit::ClientError,
        }
    }

    fn describe(self) -> &'static str {
        match self {
            Visit::Bot => "a bot",
            Visit::NewUser => "a user",
            Visit::ReturningUser => "a returning user",
            Visit::ClientError => "a client error request",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Tally {
    pub bots: usize,
    pub new_users: usize,
    pub returning_users: usize,
    pub client_errors: usize,
}

impl Tally {
    fn add(&mut self, visit: Visit) {
        match visit {
            Visit::Bot => self.bots += 1,
            Visit::NewUser => self.new_users += 1,
            Visit::ReturningUser => self.returning_users += 1,
            Visit::ClientError => self.client_errors += 1,
        }
    }

    /// Every non-bot request.
    pub fn total_views(&self) -> usize {
        self.new_users + self.returning_users + self.client_errors
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VisitLine {
    pub date: String,
    pub identifier: String,
    pub visit: Visit,
}

impl fmt::Display for VisitLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: Found {} -> {}",
            self.date,
            self.visit.describe(),
            self.identifier
        )
    }
}

/// Counts the matched bucket, one visit per identifier.
pub fn aggregate(store: &RecordStore) -> (Tally, Vec<VisitLine>) {
    let mut tally = Tally::default();
    let mut lines = Vec::new();
    for record in store.iter(Bucket::Matched) {
        let visit = Visit::of(record, store);
        tally.add(visit);
        lines.push(VisitLine {
            date: record.date.display_text().to_string(),
            identifier: record.identifier.clone(),
            visit,
        });
    }
    (tally, lines)
}

#[derive(Debug, Clone, Serialize)]
pub struct Summary {
    pub filter: Option<FilterSpec>,
    #[serde(flatten)]
    pub tally: Tally,
    pub total_views: usize,
    pub skipped_lines: usize,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub visits: Vec<VisitLine>,
}

#[derive(Debug, Clone, Copy)]
pub struct Reporter {
    options: ReportOptions,
    filter: Option<FilterSpec>,
}

impl Reporter {
    pub fn new(options: ReportOptions, filter: Option<FilterSpec>) -> Self {
        Self { options, filter }
    }

    /// Neither a category flag nor a filter was given.
    fn unflagged(&self) -> bool {
        !self.options.any_category() && self.filter.is_none()
    }

    /// Whether verbose output prints a line for `visit`.
    fn shows(&self, visit: Visit) -> bool {
        let o = &self.options;
        let filtered = self.filter.is_some();
        match visit {
            Visit::Bot => o.bots || o.detailed,
            Visit::NewUser => o.new_users || o.detailed || filtered || self.unflagged(),
            Visit::ReturningUser => {
                o.returning_users || o.detailed || filtered || self.unflagged()
            }
            Visit::ClientError => self.unflagged(),
        }
    }

    pub fn summarize(&self, outcome: &ScanOutcome) -> Summary {
        let (tally, lines) = aggregate(&outcome.store);
        let visits = if self.options.verbose {
            lines.into_iter().filter(|l| self.shows(l.visit)).collect()
        } else {
            Vec::new()
        };
        Summary {
            filter: self.filter,
            tally,
            total_views: tally.total_views(),
            skipped_lines: outcome.stats.skipped,
            visits,
        }
    }

    pub fn render(&self, outcome: &ScanOutcome) -> Result<String> {
        let summary = self.summarize(outcome);
        if self.options.json {
            let mut out = serde_json::to_string_pretty(&summary)?;
            out.push('\n');
            return Ok(out);
        }
        Ok(self.render_text(&summary))
    }

    fn render_text(&self, summary: &Summary) -> String {
        let o = &self.options;
        let on = self
            .filter
            .map(|f| format!(" on {f}"))
            .unwrap_or_default();
        let tally = &summary.tally;
        let mut lines: Vec<String> = Vec::new();

        if o.verbose {
            lines.extend(summary.visits.iter().map(|v| v.to_string()));
            lines.push(String::new());
        }

        if o.detailed {
            lines.push(format!("Detailed Information{on}"));
            lines.push(format!("Number of bots: {}", tally.bots));
            lines.push(format!(
                "Number of new users who accessed the site: {}",
                tally.new_users
            ));
            lines.push(format!(
                "Number of users who already had accessed the site: {}",
                tally.returning_users
            ));
            lines.push(format!(
                "Number of user error requests: {}",
                tally.client_errors
            ));
            lines.push(format!("Total number of user views: {}", summary.total_views));
        } else {
            if o.bots {
                lines.push(format!(
                    "Found {} bots who accessed the site{on}",
                    tally.bots
                ));
            }
            if o.new_users {
                lines.push(format!(
                    "Found {} new users who accessed the site{on}",
                    tally.new_users
                ));
            }
            if o.returning_users {
                lines.push(format!(
                    "Found {} users who already had accessed the site{on}",
                    tally.returning_users
                ));
            }
            if self.unflagged() || self.filter.is_some() {
                lines.push(format!(
                    "Found {} users who accessed the site{on}",
                    summary.total_views
                ));
            }
        }

        let mut out = lines.join("\n");
        out.push('\n');
        out
    }
}
