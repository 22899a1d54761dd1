use std::{
    borrow::Cow,
    fs::File,
    io::{BufRead, BufReader},
    path::Path,
};

use tracing::{debug, info, warn};

use crate::{
    classify::{is_valid_identifier, Classifier, UserSignal},
    compare::ComparisonMode,
    error::{LogError, Result},
    extract::DateExtractor,
    filter::FilterSpec,
    store::{Bucket, RecordStore},
};

/// Settings for one pass over a log.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScanConfig {
    pub filter: Option<FilterSpec>,
    pub user_signal: UserSignal,
    pub comparison: ComparisonMode,
}

/// What happened to a single line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineOutcome {
    Stored(Bucket),
    Duplicate(Bucket),
    /// Classified, but dated after the filter window.
    OutOfRange,
    Unclassified,
    /// Blank line or a first token that is not an address.
    Ignored,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanStats {
    pub lines: usize,
    /// Lines tied to a classified visitor, repeats and out-of-range dates included.
    pub classified: usize,
    pub skipped: usize,
}

#[derive(Debug)]
pub struct ScanOutcome {
    pub store: RecordStore,
    pub stats: ScanStats,
}

#[derive(Debug)]
pub struct Scanner {
    extractor: DateExtractor,
    classifier: Classifier,
    config: ScanConfig,
}

impl Scanner {
    pub fn new(config: ScanConfig) -> Result<Self> {
        Ok(Self {
            extractor: DateExtractor::new()?,
            classifier: Classifier::new(config.user_signal),
            config,
        })
    }

    /// Classifies one line and files it into `store`.
    pub fn process_line(&self, store: &mut RecordStore, line: &str) -> Result<LineOutcome> {
        let Some((identifier, tail)) = line.split_once(' ') else {
            return Ok(LineOutcome::Ignored);
        };
        if !is_valid_identifier(identifier) {
            return Ok(LineOutcome::Ignored);
        }

        // without a filter only the first line per identifier matters
        if self.config.filter.is_none() && store.contains(Bucket::Matched, identifier) {
            return Ok(LineOutcome::Duplicate(Bucket::Matched));
        }

        let raw = self
            .extractor
            .extract(tail)
            .ok_or_else(|| LogError::date_parse(tail, "no timestamp found"))?;
        let date = self.config.comparison.parse_date(raw)?;

        let Some(record) = self.classifier.classify(identifier, tail, date) else {
            return Ok(LineOutcome::Unclassified);
        };

        let bucket = match self.config.filter {
            Some(filter) => match filter.bucket_for(&record.date, self.config.comparison) {
                Some(bucket) => bucket,
                None => return Ok(LineOutcome::OutOfRange),
            },
            None => Bucket::Matched,
        };

        if store.insert(bucket, record) {
            Ok(LineOutcome::Stored(bucket))
        } else {
            Ok(LineOutcome::Duplicate(bucket))
        }
    }

    /// Reads `reader` to the end.
    ///
    /// Bytes that are not UTF-8 are replaced, lines with a broken timestamp
    /// are logged and skipped; read errors abort the scan. Fails with
    /// [`LogError::NoData`] when no line produced a record.
    pub fn scan<R: BufRead>(&self, mut reader: R) -> Result<ScanOutcome> {
        let mut store = RecordStore::new();
        let mut stats = ScanStats::default();
        let mut buf = Vec::new();

        loop {
            buf.clear();
            if reader.read_until(b'\n', &mut buf)? == 0 {
                break;
            }
            stats.lines += 1;
            let n = stats.lines;

            let text = String::from_utf8_lossy(&buf);
            if matches!(text, Cow::Owned(_)) {
                debug!(line = n, "replaced invalid UTF-8");
            }
            let line: &str = &text;
            let line = line.strip_suffix('\n').unwrap_or(line);
            let line = line.strip_suffix('\r').unwrap_or(line);

            match self.process_line(&mut store, line) {
                Ok(outcome) => {
                    debug!(line = n, ?outcome, "processed line");
                    if matches!(
                        outcome,
                        LineOutcome::Stored(_) | LineOutcome::Duplicate(_) | LineOutcome::OutOfRange
                    ) {
                        stats.classified += 1;
                    }
                }
                Err(e) if e.is_recoverable() => {
                    warn!(line = n, error = %e, "skipping line");
                    stats.skipped += 1;
                }
                Err(e) => return Err(e),
            }
        }

        info!(
            lines = stats.lines,
            classified = stats.classified,
            skipped = stats.skipped,
            prior = store.len(Bucket::Prior),
            matched = store.len(Bucket::Matched),
            "scan finished"
        );

        if stats.classified == 0 {
            return Err(LogError::NoData);
        }
        Ok(ScanOutcome { store, stats })
    }
}

/// Opens `path` and scans it with `config`.
pub fn scan_file(path: impl AsRef<Path>, config: ScanConfig) -> Result<ScanOutcome> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| LogError::FileOpen {
        path: path.to_path_buf(),
        source,
    })?;
    debug!(path = %path.display(), "reading log");
    Scanner::new(config)?.scan(BufReader::new(file))
}
