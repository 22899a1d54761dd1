use std::path::PathBuf;

/// Errors produced while reading and classifying an access log.
#[derive(Debug, thiserror::Error)]
pub enum LogError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("couldn't open file {}: {source}", path.display())]
    FileOpen {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid date {input:?}: {reason}")]
    DateParse { input: String, reason: String },

    #[error("invalid log fields: no line produced a classified record")]
    NoData,

    #[error("failed to read log: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid timestamp pattern: {0}")]
    Pattern(#[from] regex::Error),

    #[error("failed to serialize summary: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl LogError {
    pub(crate) fn date_parse(input: &str, reason: impl Into<String>) -> Self {
        LogError::DateParse {
            input: input.to_string(),
            reason: reason.into(),
        }
    }

    /// Per-line failures the scanner skips over instead of aborting.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, LogError::DateParse { .. })
    }
}

pub type Result<T, E = LogError> = std::result::Result<T, E>;
