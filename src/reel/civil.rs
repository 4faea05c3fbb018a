//! Civil-date normalization in a single fixed timezone.
//!
//! Every instant in the pipeline is bucketed by the calendar day it falls on
//! in [`REFERENCE_ZONE`], never the host zone, so snapshots and calendars are
//! identical across machines. The `YYYY-MM-DD` string produced here is the
//! canonical bucketing key used by every other stage.

use crate::error::ReelError;
use anyhow::{Context, Result};
use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;

pub const REFERENCE_ZONE: Tz = chrono_tz::America::Chicago;

const DATE_FMT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CivilDate {
    pub year: i32,
    /// 0-based month, matching the calendar grid's month numbering.
    pub month0: u32,
    pub day: u32,
    pub date_string: String,
}

/// Parse a source-provided watch instant.
///
/// Accepts RFC 3339 instants as well as the offset-less forms the export
/// sources emit (`YYYY-MM-DDTHH:MM[:SS]` and bare `YYYY-MM-DD`). Offset-less
/// values are wall-clock times in the reference zone; bare dates anchor at
/// noon so that a one-hour zone skew can never move them across midnight.
pub fn parse_instant(raw: &str) -> Result<DateTime<Utc>> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ReelError::InvalidInstant("empty".to_string()).into());
    }

    if let Ok(parsed) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(parsed.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M:%S") {
        return anchor_in_zone(naive);
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M") {
        return anchor_in_zone(naive);
    }
    if let Ok(date) = NaiveDate::parse_from_str(trimmed, DATE_FMT) {
        return anchor_in_zone(noon(date)?);
    }

    Err(ReelError::InvalidInstant(trimmed.to_string()).into())
}

/// Calendar-day components of `instant` in the reference zone.
pub fn civil_date(instant: &DateTime<Utc>) -> CivilDate {
    let local = instant.with_timezone(&REFERENCE_ZONE);
    CivilDate {
        year: local.year(),
        month0: local.month0(),
        day: local.day(),
        date_string: local.format(DATE_FMT).to_string(),
    }
}

/// Components of an already-normalized `YYYY-MM-DD` key.
pub fn split_civil(date_string: &str) -> Result<CivilDate> {
    let date = parse_date_string(date_string)?;
    Ok(CivilDate {
        year: date.year(),
        month0: date.month0(),
        day: date.day(),
        date_string: date_string.to_string(),
    })
}

/// Shift a civil-date key by `days`, going through the zone machinery rather
/// than naive date arithmetic: the date is anchored at noon in the reference
/// zone, shifted as an instant, and re-normalized. Noon anchoring keeps the
/// result stable across the 23- and 25-hour days at DST transitions.
pub fn add_days(date_string: &str, days: i64) -> Result<String> {
    let date = parse_date_string(date_string)?;
    let anchored = anchor_in_zone(noon(date)?)?;
    let shifted = anchored + Duration::days(days);
    Ok(civil_date(&shifted).date_string)
}

/// Signed whole-day distance between the civil dates of two instants.
pub fn day_distance(from: &DateTime<Utc>, to: &DateTime<Utc>) -> i64 {
    let from_day = from.with_timezone(&REFERENCE_ZONE).date_naive();
    let to_day = to.with_timezone(&REFERENCE_ZONE).date_naive();
    to_day.signed_duration_since(from_day).num_days()
}

fn parse_date_string(date_string: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(date_string.trim(), DATE_FMT)
        .with_context(|| format!("invalid civil date key: {date_string}"))
}

fn noon(date: NaiveDate) -> Result<NaiveDateTime> {
    date.and_hms_opt(12, 0, 0)
        .with_context(|| format!("could not anchor {date} at noon"))
}

fn anchor_in_zone(naive: NaiveDateTime) -> Result<DateTime<Utc>> {
    if let Some(resolved) = REFERENCE_ZONE.from_local_datetime(&naive).earliest() {
        return Ok(resolved.with_timezone(&Utc));
    }
    // Wall-clock time inside the spring-forward gap; the hour after the jump
    // is the same instant the source meant.
    REFERENCE_ZONE
        .from_local_datetime(&(naive + Duration::hours(1)))
        .earliest()
        .map(|resolved| resolved.with_timezone(&Utc))
        .ok_or_else(|| ReelError::InvalidInstant(naive.to_string()).into())
}
