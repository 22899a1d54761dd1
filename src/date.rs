use std::fmt;

use chrono::{DateTime, FixedOffset, NaiveDate};
use winnow::{
    error::ContextError,
    token::{one_of, take_while},
    PResult, Parser,
};

use crate::{
    error::{LogError, Result},
    extract::MIN_TIMESTAMP_LEN,
};

const MONTHS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Raw digit characters of a timestamp, as written in the log.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateDigits {
    pub day: [u8; 2],
    pub month: [u8; 2],
    pub year: [u8; 4],
}

/// A parsed access log timestamp.
///
/// Calendar fields are those of the line's own offset; nothing is
/// normalized to UTC.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogDate {
    datetime: Option<DateTime<FixedOffset>>,
    digits: DateDigits,
    text: String,
}

impl LogDate {
    /// `None` only for dates read by [`parse_log_digits`] that name no
    /// real calendar day.
    pub fn datetime(&self) -> Option<DateTime<FixedOffset>> {
        self.datetime
    }

    pub fn year(&self) -> i32 {
        number(&self.digits.year) as i32
    }

    /// `0` for an unknown month name.
    pub fn month(&self) -> u32 {
        number(&self.digits.month)
    }

    pub fn day(&self) -> u32 {
        number(&self.digits.day)
    }

    pub fn digits(&self) -> &DateDigits {
        &self.digits
    }

    /// `DD/Mon/YYYY:HH:MM:SS`, without brackets or offset.
    pub fn display_text(&self) -> &str {
        &self.text
    }
}

impl fmt::Display for LogDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

fn number(digits: &[u8]) -> u32 {
    digits
        .iter()
        .fold(0, |n, d| n * 10 + u32::from(d.wrapping_sub(b'0')))
}

pub fn month_number(abbrev: &str) -> Option<u32> {
    MONTHS
        .iter()
        .position(|m| *m == abbrev)
        .map(|i| i as u32 + 1)
}

/// Two-digit form of a month abbreviation; unknown names map to `00`.
pub fn month_digits(abbrev: &str) -> [u8; 2] {
    match month_number(abbrev) {
        Some(n) => [b'0' + (n / 10) as u8, b'0' + (n % 10) as u8],
        None => *b"00",
    }
}

/// Parses `[DD/Mon/YYYY:HH:MM:SS +ZZZZ]` as found by the extractor.
///
/// The month must be known and the date must exist on the calendar.
pub fn parse_log_date(raw: &str) -> Result<LogDate> {
    let (fields, mut date) = parse_layout(raw)?;
    let month = month_number(fields.month)
        .ok_or_else(|| LogError::date_parse(raw, format!("unknown month {:?}", fields.month)))?;
    let datetime = fields
        .datetime(month)
        .ok_or_else(|| LogError::date_parse(raw, "no such calendar date"))?;
    date.datetime = Some(datetime);
    Ok(date)
}

/// Parses the same layout as [`parse_log_date`] but keeps dates the
/// calendar rejects. An unknown month name reads as `00`.
pub fn parse_log_digits(raw: &str) -> Result<LogDate> {
    let (fields, mut date) = parse_layout(raw)?;
    date.datetime = month_number(fields.month).and_then(|month| fields.datetime(month));
    Ok(date)
}

fn parse_layout(raw: &str) -> Result<(Fields<'_>, LogDate)> {
    if raw.len() < MIN_TIMESTAMP_LEN {
        return Err(LogError::date_parse(raw, "timestamp too short"));
    }

    let fields = parse_fields
        .parse(raw)
        .map_err(|e| LogError::date_parse(raw, e.to_string()))?;

    // every field is ASCII, so the byte positions are fixed
    let bytes = raw.as_bytes();
    let date = LogDate {
        datetime: None,
        digits: DateDigits {
            day: [bytes[1], bytes[2]],
            month: month_digits(fields.month),
            year: [bytes[8], bytes[9], bytes[10], bytes[11]],
        },
        text: raw[1..21].to_string(),
    };
    Ok((fields, date))
}

struct Fields<'s> {
    day: u32,
    month: &'s str,
    year: i32,
    hour: u32,
    minute: u32,
    second: u32,
    offset: i32,
}

impl Fields<'_> {
    fn datetime(&self, month: u32) -> Option<DateTime<FixedOffset>> {
        let offset = FixedOffset::east_opt(self.offset)?;
        NaiveDate::from_ymd_opt(self.year, month, self.day)?
            .and_hms_opt(self.hour, self.minute, self.second)?
            .and_local_timezone(offset)
            .single()
    }
}

fn parse_fields<'s>(s: &mut &'s str) -> PResult<Fields<'s>> {
    '['.parse_next(s)?;
    let day: u32 = digits(2).parse_to().parse_next(s)?;
    '/'.parse_next(s)?;
    let month = take_while(3, |c: char| c.is_ascii_alphabetic()).parse_next(s)?;
    '/'.parse_next(s)?;
    let year: i32 = digits(4).parse_to().parse_next(s)?;
    ':'.parse_next(s)?;
    let hour: u32 = digits(2).parse_to().parse_next(s)?;
    ':'.parse_next(s)?;
    let minute: u32 = digits(2).parse_to().parse_next(s)?;
    ':'.parse_next(s)?;
    let second: u32 = digits(2).parse_to().parse_next(s)?;
    ' '.parse_next(s)?;
    let offset = parse_offset(s)?;
    ']'.parse_next(s)?;
    Ok(Fields {
        day,
        month,
        year,
        hour,
        minute,
        second,
        offset,
    })
}

fn digits<'s>(count: usize) -> impl Parser<&'s str, &'s str, ContextError> {
    take_while(count, '0'..='9')
}

/// Offset in seconds east of UTC.
fn parse_offset(s: &mut &str) -> PResult<i32> {
    let sign = one_of(['+', '-']).parse_next(s)?;
    let hours: i32 = digits(2).parse_to().parse_next(s)?;
    let minutes: i32 = digits(2).parse_to().parse_next(s)?;
    let secs = hours * 3600 + minutes * 60;
    Ok(if sign == '-' { -secs } else { secs })
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;

    #[test]
    fn parse_log_date_should_work() -> anyhow::Result<()> {
        let date = parse_log_date("[25/Dec/2020:10:00:00 +0000]")?;
        assert_eq!(date.year(), 2020);
        assert_eq!(date.month(), 12);
        assert_eq!(date.day(), 25);
        assert_eq!(date.display_text(), "25/Dec/2020:10:00:00");
        assert_eq!(
            date.datetime().unwrap(),
            Utc.with_ymd_and_hms(2020, 12, 25, 10, 0, 0).unwrap()
        );
        assert_eq!(
            *date.digits(),
            DateDigits {
                day: *b"25",
                month: *b"12",
                year: *b"2020",
            }
        );
        Ok(())
    }

    #[test]
    fn parse_log_date_should_keep_local_calendar_fields() -> anyhow::Result<()> {
        let date = parse_log_date("[17/May/2015:23:30:00 -0700]")?;
        let datetime = date.datetime().unwrap();
        assert_eq!(datetime.date_naive(), NaiveDate::from_ymd_opt(2015, 5, 17).unwrap());
        assert_eq!(datetime.offset().local_minus_utc(), -7 * 3600);
        assert_eq!(
            datetime,
            Utc.with_ymd_and_hms(2015, 5, 18, 6, 30, 0).unwrap()
        );
        Ok(())
    }

    #[test]
    fn parse_log_date_should_reject_bad_layouts() {
        for raw in [
            "[25/Dec/2020]",
            "[25/Xyz/2020:10:00:00 +0000]",
            "[25-Dec-2020:10:00:00 +0000]",
            "[2X/Dec/2020:10:00:00 +0000]",
            "[25/Dec/2020:10:00:00 +0000] trailing",
            "[31/Feb/2020:10:00:00 +0000]",
        ] {
            let err = parse_log_date(raw).unwrap_err();
            assert!(err.is_recoverable(), "{raw}: {err}");
        }
    }

    #[test]
    fn parse_log_digits_should_keep_unknown_months() -> anyhow::Result<()> {
        let date = parse_log_digits("[09/Foo/2020:10:00:00 +0000]")?;
        assert_eq!(date.datetime(), None);
        assert_eq!(
            *date.digits(),
            DateDigits {
                day: *b"09",
                month: *b"00",
                year: *b"2020",
            }
        );
        assert_eq!((date.day(), date.month(), date.year()), (9, 0, 2020));
        assert_eq!(date.display_text(), "09/Foo/2020:10:00:00");

        let date = parse_log_digits("[31/Feb/2020:10:00:00 +0000]")?;
        assert_eq!(date.datetime(), None);
        assert_eq!(date.digits().month, *b"02");

        let date = parse_log_digits("[09/Jul/2020:10:00:00 +0200]")?;
        assert_eq!(date, parse_log_date("[09/Jul/2020:10:00:00 +0200]")?);
        Ok(())
    }

    #[test]
    fn parse_log_digits_should_still_check_the_layout() {
        for raw in [
            "[25/Dec/2020]",
            "[25-Dec-2020:10:00:00 +0000]",
            "[25/D3c/2020:10:00:00 +0000]",
            "[25/Déc/2020:10:00:00 +0000]",
        ] {
            let err = parse_log_digits(raw).unwrap_err();
            assert!(err.is_recoverable(), "{raw}: {err}");
        }
    }

    #[test]
    fn month_digits_should_work() {
        assert_eq!(month_digits("Jan"), *b"01");
        assert_eq!(month_digits("Sep"), *b"09");
        assert_eq!(month_digits("Dec"), *b"12");
        assert_eq!(month_digits("dec"), *b"00");
        assert_eq!(month_number("Oct"), Some(10));
        assert_eq!(month_number("Foo"), None);
    }
}
