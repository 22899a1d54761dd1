use std::fmt;

use crate::date::LogDate;

const BOT_MARKER: &str = "wp-admin";
const ASSETS_MARKER: &str = "assets";
const STATUS_200_MARKER: &str = "HTTP/1.1\" 200";
const CLIENT_ERROR_MARKER: &str = "HTTP/1.1\" 4";

/// What a log line says about its visitor.
///
/// Signals are checked in declaration order and the first hit wins, so a
/// `wp-admin` request answered with a 404 counts as a bot only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Bot,
    User,
    ClientError,
}

/// Which marker identifies a tracked user request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum UserSignal {
    /// The request path mentions `assets`.
    #[default]
    #[value(name = "assets")]
    AssetsPath,
    /// The request was answered with `HTTP/1.1" 200`.
    #[value(name = "status200")]
    Status200,
}

impl UserSignal {
    fn marker(self) -> &'static str {
        match self {
            UserSignal::AssetsPath => ASSETS_MARKER,
            UserSignal::Status200 => STATUS_200_MARKER,
        }
    }
}

/// One classified visitor line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogRecord {
    pub identifier: String,
    pub date: LogDate,
    pub category: Category,
}

impl fmt::Display for LogRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let what = match self.category {
            Category::Bot => "a bot",
            Category::User => "a user",
            Category::ClientError => "a client error request",
        };
        write!(f, "{}: Found {} -> {}", self.date, what, self.identifier)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Classifier {
    user_signal: UserSignal,
}

impl Classifier {
    pub fn new(user_signal: UserSignal) -> Self {
        Self { user_signal }
    }

    /// The first signal found in `tail`, if any.
    pub fn categorize(&self, tail: &str) -> Option<Category> {
        if tail.contains(BOT_MARKER) {
            Some(Category::Bot)
        } else if tail.contains(self.user_signal.marker()) {
            Some(Category::User)
        } else if tail.contains(CLIENT_ERROR_MARKER) {
            Some(Category::ClientError)
        } else {
            None
        }
    }

    /// Builds a record for the line, or `None` when no signal fired.
    pub fn classify(&self, identifier: &str, tail: &str, date: LogDate) -> Option<LogRecord> {
        let category = self.categorize(tail)?;
        Some(LogRecord {
            identifier: identifier.to_string(),
            date,
            category,
        })
    }
}

/// Whether the first token of a line looks like an address or host.
pub fn is_valid_identifier(token: &str) -> bool {
    token.contains('.') || token.contains(':')
}
