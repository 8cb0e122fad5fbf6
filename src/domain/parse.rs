use crate::domain::LineRecord;
use thiserror::Error;
use time::format_description::BorrowedFormatItem;
use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use time::{Date, OffsetDateTime, PrimitiveDateTime, Time, UtcOffset};

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("missing column: {0}")]
    MissingColumn(&'static str),

    #[error("row {row}: expected {expected} fields, found {found}")]
    FieldCount {
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("row {row}: invalid integer in '{column}': {value}")]
    BadInteger {
        row: usize,
        column: &'static str,
        value: String,
    },

    #[error("row {row}: invalid date: {value}")]
    BadDate { row: usize, value: String },

    #[error("row {row}: invalid timezone offset: {value}")]
    BadTimezone { row: usize, value: String },

    #[error("row {row}: invalid timestamp: {value}")]
    BadTimestamp { row: usize, value: String },
}

const COLUMNS: [&str; 11] = [
    "file", "line", "depth", "length", "date", "author", "time", "timezone", "type", "commit",
    "datetime",
];

/// Parses the loc table: header-indexed CSV, one row per changed line.
/// Any malformed row fails the whole load; there is no partial recovery.
pub fn parse_loc_table(text: &str) -> Result<Vec<LineRecord>, ParseError> {
    let mut lines = text.lines().filter(|line| !line.trim().is_empty());
    let Some(header) = lines.next() else {
        return Ok(Vec::new());
    };

    let header_fields = split_csv_line(header);
    let mut indices = [0usize; COLUMNS.len()];
    for (slot, name) in indices.iter_mut().zip(COLUMNS) {
        *slot = header_fields
            .iter()
            .position(|field| field == name)
            .ok_or(ParseError::MissingColumn(name))?;
    }
    let width = header_fields.len();

    let mut records = Vec::new();
    for (offset, line) in lines.enumerate() {
        let row = offset + 2;
        let fields = split_csv_line(line);
        if fields.len() != width {
            return Err(ParseError::FieldCount {
                row,
                expected: width,
                found: fields.len(),
            });
        }

        let [
            file_at,
            line_at,
            depth_at,
            length_at,
            date_at,
            author_at,
            time_at,
            timezone_at,
            type_at,
            commit_at,
            datetime_at,
        ] = indices;

        let timezone = fields[timezone_at].clone();
        let offset = parse_utc_offset(&timezone).ok_or_else(|| ParseError::BadTimezone {
            row,
            value: timezone.clone(),
        })?;

        let date = fields[date_at].clone();
        let day_start = parse_local_midnight(&date, offset).ok_or_else(|| ParseError::BadDate {
            row,
            value: date.clone(),
        })?;

        let datetime_text = fields[datetime_at].as_str();
        let datetime =
            parse_datetime(datetime_text, offset).ok_or_else(|| ParseError::BadTimestamp {
                row,
                value: datetime_text.to_string(),
            })?;

        records.push(LineRecord {
            file: fields[file_at].clone(),
            line: parse_u32(&fields[line_at], row, "line")?,
            depth: parse_u32(&fields[depth_at], row, "depth")?,
            length: parse_u32(&fields[length_at], row, "length")?,
            date,
            author: fields[author_at].clone(),
            time: fields[time_at].clone(),
            timezone,
            language: fields[type_at].clone(),
            commit: fields[commit_at].clone(),
            datetime,
            day_start,
        });
    }

    Ok(records)
}

fn parse_u32(value: &str, row: usize, column: &'static str) -> Result<u32, ParseError> {
    value
        .trim()
        .parse::<u32>()
        .map_err(|_| ParseError::BadInteger {
            row,
            column,
            value: value.to_string(),
        })
}

/// Splits one CSV line honoring double-quoted fields; `""` inside quotes
/// escapes a literal quote.
pub fn split_csv_line(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(ch) = chars.next() {
        match ch {
            '"' if in_quotes => {
                if chars.peek() == Some(&'"') {
                    let _ = chars.next();
                    current.push('"');
                } else {
                    in_quotes = false;
                }
            }
            '"' => in_quotes = true,
            ',' if !in_quotes => {
                fields.push(std::mem::take(&mut current));
            }
            other => current.push(other),
        }
    }
    fields.push(current);
    fields
}

/// Accepts `-0700`, `-07:00`, `+05:30`, and `Z`.
pub fn parse_utc_offset(value: &str) -> Option<UtcOffset> {
    let trimmed = value.trim();
    if trimmed.eq_ignore_ascii_case("z") {
        return Some(UtcOffset::UTC);
    }

    let (sign, digits) = match trimmed.strip_prefix('-') {
        Some(rest) => (-1i8, rest),
        None => (1i8, trimmed.strip_prefix('+').unwrap_or(trimmed)),
    };

    let compact: String = digits.chars().filter(|ch| *ch != ':').collect();
    if compact.len() != 4 || !compact.chars().all(|ch| ch.is_ascii_digit()) {
        return None;
    }
    let hours: i8 = compact[0..2].parse().ok()?;
    let minutes: i8 = compact[2..4].parse().ok()?;
    UtcOffset::from_hms(sign * hours, sign * minutes, 0).ok()
}

const DATE_FORMAT: &[BorrowedFormatItem<'_>] = format_description!("[year]-[month]-[day]");
const DATETIME_SECONDS: &[BorrowedFormatItem<'_>] =
    format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]");
const DATETIME_MINUTES: &[BorrowedFormatItem<'_>] =
    format_description!("[year]-[month]-[day]T[hour]:[minute]");

fn parse_local_midnight(date: &str, offset: UtcOffset) -> Option<OffsetDateTime> {
    let date = Date::parse(date.trim(), DATE_FORMAT).ok()?;
    Some(date.with_time(Time::MIDNIGHT).assume_offset(offset))
}

/// The datetime column usually carries its own offset (RFC 3339); stamps
/// without one are interpreted in the row's timezone column.
fn parse_datetime(value: &str, fallback_offset: UtcOffset) -> Option<OffsetDateTime> {
    let trimmed = value.trim();
    if let Ok(datetime) = OffsetDateTime::parse(trimmed, &Rfc3339) {
        return Some(datetime);
    }
    // RFC 3339 requires seconds and a colon in the offset; retry with the
    // offset split off manually before falling back to naive stamps.
    if let Some((naive, offset)) = split_trailing_offset(trimmed) {
        let parsed = PrimitiveDateTime::parse(naive, DATETIME_SECONDS)
            .or_else(|_| PrimitiveDateTime::parse(naive, DATETIME_MINUTES))
            .ok()?;
        return Some(parsed.assume_offset(offset));
    }
    let parsed = PrimitiveDateTime::parse(trimmed, DATETIME_SECONDS)
        .or_else(|_| PrimitiveDateTime::parse(trimmed, DATETIME_MINUTES))
        .ok()?;
    Some(parsed.assume_offset(fallback_offset))
}

fn split_trailing_offset(value: &str) -> Option<(&str, UtcOffset)> {
    if let Some(naive) = value.strip_suffix('Z').or_else(|| value.strip_suffix('z')) {
        return Some((naive, UtcOffset::UTC));
    }
    // Look for +HHMM / +HH:MM after the time portion (past the date dashes).
    let tail = &value[10.min(value.len())..];
    let position = tail.rfind(['+', '-'])?;
    let split_at = 10.min(value.len()) + position;
    let (naive, offset_text) = value.split_at(split_at);
    let offset = parse_utc_offset(offset_text)?;
    Some((naive, offset))
}
