use std::fmt::Display;

use anyhow::{bail, Result};
use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};

/// Offset-less layouts accepted after RFC 3339 fails (fraction optional).
const NAIVE_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// Parse wire timestamps like "2024-06-01T10:00:00Z", "2024-06-01T12:00:00+02:00"
/// or "2024-06-01T10:00:00.123456".
///
/// Offset-less values are read as wall-clock time in `tz`.
pub fn parse_timestamp<Tz: TimeZone>(s: &str, tz: &Tz) -> Result<DateTime<Utc>> {
    let s = s.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }

    for format in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, format) {
            return match tz.from_local_datetime(&naive).earliest() {
                Some(local) => Ok(local.with_timezone(&Utc)),
                None => bail!("Nonexistent local time: {}", s),
            };
        }
    }

    bail!("Unknown timestamp format: {}", s)
}

/// Long month and day, e.g. "June 1".
pub fn format_long_date<Tz>(at: &DateTime<Utc>, tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    at.with_timezone(tz).format("%B %-d").to_string()
}

/// Two-digit 12-hour clock, e.g. "09:05 AM".
pub fn format_clock<Tz>(at: &DateTime<Utc>, tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    at.with_timezone(tz).format("%I:%M %p").to_string()
}

/// First and last millisecond of a calendar day in `tz`.
pub fn day_bounds<Tz: TimeZone>(date: NaiveDate, tz: &Tz) -> (DateTime<Utc>, DateTime<Utc>) {
    let start = local_midnight(date, tz);
    let next = date
        .succ_opt()
        .map_or(start + Duration::days(1), |d| local_midnight(d, tz));
    (start, next - Duration::milliseconds(1))
}

fn local_midnight<Tz: TimeZone>(date: NaiveDate, tz: &Tz) -> DateTime<Utc> {
    let midnight = date.and_time(NaiveTime::MIN);
    // A DST gap can swallow midnight; the day then starts an hour later.
    tz.from_local_datetime(&midnight)
        .earliest()
        .or_else(|| tz.from_local_datetime(&(midnight + Duration::hours(1))).earliest())
        .map_or_else(|| Utc.from_utc_datetime(&midnight), |dt| dt.with_timezone(&Utc))
}
