//! Calendar date parsing and normalization
//!
//! APOD records are keyed by `YYYY-MM-DD`. Callers hand us dates in whatever
//! shape they have (zero-padded or not, full timestamps with offsets, US
//! month-first order); everything is reduced to a UTC calendar day before it
//! is used as a cache key or an upstream query parameter.

use chrono::{DateTime, Days, NaiveDate, NaiveDateTime, Utc};
use rand::Rng;
use thiserror::Error;

/// First day APOD published a picture
pub const FIRST_APOD_DATE: &str = "1995-06-16";

/// Output format for normalized dates
const DATE_FORMAT: &str = "%Y-%m-%d";

/// Errors that can occur while validating a requested date
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DateError {
    /// The raw value could not be read as a calendar date
    #[error("Invalid date \"{0}\". Expected YYYY-MM-DD.")]
    Unparsable(String),

    /// The date precedes the first published record
    #[error("Date too early. APOD images start on {}.", FIRST_APOD_DATE)]
    TooEarly,
}

/// First day APOD published a picture, as a calendar date
pub fn first_apod_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(1995, 6, 16).unwrap_or(NaiveDate::MIN)
}

/// Parses a raw date string into a calendar date
///
/// Accepted shapes:
/// * `YYYY-M-D` / `YYYY/M/D` with one- or two-digit month and day
/// * `M/D/YYYY`
/// * RFC 3339 timestamps (converted to UTC before taking the day)
/// * RFC 2822 timestamps
/// * `YYYY-MM-DDTHH:MM:SS` without an offset
/// * long form such as `June 16, 1995`
pub fn parse_date(raw: &str) -> Result<NaiveDate, DateError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(DateError::Unparsable(raw.to_string()));
    }

    parse_numeric_date(trimmed)
        .or_else(|| {
            DateTime::parse_from_rfc3339(trimmed)
                .ok()
                .map(|dt| dt.with_timezone(&Utc).date_naive())
        })
        .or_else(|| {
            DateTime::parse_from_rfc2822(trimmed)
                .ok()
                .map(|dt| dt.with_timezone(&Utc).date_naive())
        })
        .or_else(|| {
            NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M:%S")
                .ok()
                .map(|dt| dt.date())
        })
        .or_else(|| NaiveDate::parse_from_str(trimmed, "%B %d, %Y").ok())
        .ok_or_else(|| DateError::Unparsable(raw.to_string()))
}

/// Formats a calendar date as `YYYY-MM-DD`
pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Parses and re-formats a raw date as `YYYY-MM-DD`
pub fn normalize_date(raw: &str) -> Result<String, DateError> {
    parse_date(raw).map(format_date)
}

/// Parses a raw date and rejects anything before the first APOD record
///
/// No upper bound is enforced; future dates are left for upstream to judge.
pub fn validate_date(raw: &str) -> Result<NaiveDate, DateError> {
    let date = parse_date(raw)?;
    if date < first_apod_date() {
        return Err(DateError::TooEarly);
    }
    Ok(date)
}

/// Picks a uniformly random day in `[start, end]`
///
/// Returns `start` when the range is empty.
pub fn random_date_between<R: Rng + ?Sized>(rng: &mut R, start: NaiveDate, end: NaiveDate) -> NaiveDate {
    let span = u64::try_from((end - start).num_days()).unwrap_or(0);
    let offset = rng.gen_range(0..=span);
    start.checked_add_days(Days::new(offset)).unwrap_or(start)
}

/// Picks a random published day between the first APOD and today (UTC)
pub fn random_date() -> NaiveDate {
    random_date_between(&mut rand::thread_rng(), first_apod_date(), Utc::now().date_naive())
}

/// Handles purely numeric dates split by a single kind of separator
fn parse_numeric_date(s: &str) -> Option<NaiveDate> {
    let separator = s.chars().find(|c| *c == '-' || *c == '/')?;
    let parts: Vec<&str> = s.split(separator).collect();
    if parts.len() != 3 {
        return None;
    }
    if parts
        .iter()
        .any(|p| p.is_empty() || p.len() > 4 || !p.bytes().all(|b| b.is_ascii_digit()))
    {
        return None;
    }

    let a: u32 = parts[0].parse().ok()?;
    let b: u32 = parts[1].parse().ok()?;
    let c: u32 = parts[2].parse().ok()?;

    if parts[0].len() == 4 && parts[1].len() <= 2 && parts[2].len() <= 2 {
        NaiveDate::from_ymd_opt(a as i32, b, c)
    } else if separator == '/' && parts[2].len() == 4 && parts[0].len() <= 2 && parts[1].len() <= 2 {
        NaiveDate::from_ymd_opt(c as i32, a, b)
    } else {
        None
    }
}
